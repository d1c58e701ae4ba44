//! Playback controller
//!
//! Owns the engine handle and exposes the player's operations. Commands
//! are fire-and-forget; the state snapshot changes only when the engine
//! confirms through its event stream, so the UI always reflects what the
//! engine actually did.

use crossbeam_channel::Receiver;
use lantern_core::{Channel, Value};
use lantern_engine::{Engine, EngineEvent};
use tracing::{debug, info};

use crate::events::PlaybackEvent;
use crate::state::PlaybackState;

/// URL schemes treated as network streams for cache configuration
const NETWORK_SCHEMES: &[&str] = &["http://", "https://", "rtmp://", "rtsp://", "mms://", "rtp://"];

const DEFAULT_CACHE_SECONDS: i64 = 10;

/// Player-facing control surface over one engine instance
pub struct PlaybackController {
    engine: Engine,
    events: Receiver<EngineEvent>,
    state: PlaybackState,
    requested_media: Option<String>,
    cache_seconds: i64,
}

impl PlaybackController {
    /// Wrap an initialized engine
    ///
    /// Reads the engine's current volume and mute so the first snapshot
    /// matches reality; anything unavailable keeps its default.
    pub fn new(engine: Engine) -> Self {
        let events = engine.subscribe();
        let mut state = PlaybackState::default();
        if let Some(volume) = engine.get_property("volume").and_then(|v| v.as_i64()) {
            state.volume = clamp_volume(volume);
        }
        if let Some(muted) = engine.get_property("mute") {
            state.muted = muted.is_truthy();
        }
        Self {
            engine,
            events,
            state,
            requested_media: None,
            cache_seconds: DEFAULT_CACHE_SECONDS,
        }
    }

    /// Current state snapshot
    pub fn state(&self) -> &PlaybackState {
        &self.state
    }

    /// The underlying engine (for renderer creation)
    pub fn engine(&self) -> &Engine {
        &self.engine
    }

    /// Receiver signaled when [`PlaybackController::pump`] has work to do
    pub fn wake_receiver(&self) -> Receiver<()> {
        self.engine.wake_receiver()
    }

    /// How many seconds of network stream to buffer ahead
    pub fn set_cache_seconds(&mut self, seconds: i64) {
        self.cache_seconds = seconds.max(0);
    }

    /// Load a file or stream; completion surfaces as `MediaLoaded`
    ///
    /// Network URLs get read-ahead caching, local files play uncached.
    pub fn load_media(&mut self, url: &str) {
        let network = is_network_url(url);
        if network {
            self.engine
                .set_property_async("cache", &Value::Text("yes".to_owned()));
            self.engine
                .set_property_async("cache-secs", &Value::Integer(self.cache_seconds));
        } else {
            self.engine
                .set_property_async("cache", &Value::Text("no".to_owned()));
        }
        info!(%url, network, "loading media");
        self.requested_media = Some(url.to_owned());
        self.engine.load_file(url);
    }

    /// Load a channel's stream
    pub fn load_channel(&mut self, channel: &Channel) {
        info!(name = %channel.name, "loading channel");
        self.load_media(&channel.url);
    }

    /// Resume playback
    pub fn play(&self) {
        self.engine.set_property_async("pause", &Value::Bool(false));
    }

    /// Pause playback
    pub fn pause(&self) {
        self.engine.set_property_async("pause", &Value::Bool(true));
    }

    /// Pause if playing, resume if paused
    ///
    /// Asks the engine rather than trusting the snapshot, so a toggle
    /// issued between a change and its event still lands right.
    pub fn toggle_play_pause(&self) {
        let paused = self
            .engine
            .get_property("pause")
            .map(|v| v.is_truthy())
            .unwrap_or(false);
        self.engine.set_property_async("pause", &Value::Bool(!paused));
    }

    /// Stop playback and unload the current file
    pub fn stop(&self) {
        self.engine.command(&["stop"]);
    }

    /// Seek to an absolute position in seconds
    pub fn seek(&self, position: f64) {
        self.engine
            .set_property_async("time-pos", &Value::Double(position.max(0.0)));
    }

    /// Seek forward by `seconds` from the last known position
    pub fn seek_forward(&self, seconds: f64) {
        let target = self.state.position + seconds;
        let target = if self.state.duration > 0.0 {
            target.min(self.state.duration)
        } else {
            target
        };
        self.seek(target);
    }

    /// Seek backward by `seconds` from the last known position
    pub fn seek_backward(&self, seconds: f64) {
        self.seek(self.state.position - seconds);
    }

    /// Set volume in percent, clamped to 0..=100
    ///
    /// Setting an audible volume while muted also unmutes, matching what
    /// a user turning the dial expects.
    pub fn set_volume(&self, volume: i64) {
        let volume = clamp_volume(volume);
        if volume == self.state.volume {
            return;
        }
        self.engine
            .set_property_async("volume", &Value::Integer(i64::from(volume)));
        if volume > 0 && self.state.muted {
            self.set_mute(false);
        }
    }

    /// Mute or unmute audio
    pub fn set_mute(&self, muted: bool) {
        self.engine.set_property_async("mute", &Value::Bool(muted));
    }

    /// Flip the mute state
    pub fn toggle_mute(&self) {
        self.set_mute(!self.state.muted);
    }

    /// Apply runtime engine properties, e.g. from the settings store
    pub fn apply_properties(&self, properties: &[(String, Value)]) {
        for (name, value) in properties {
            debug!(property = %name, "applying engine property");
            self.engine.set_property_async(name, value);
        }
    }

    /// Drain pending engine events and fold them into the snapshot
    ///
    /// Called from the owner thread whenever the wake receiver fires.
    /// Returns the resulting player events in engine order.
    pub fn pump(&mut self) -> Vec<PlaybackEvent> {
        self.engine.drain_events();
        let mut out = Vec::new();
        while let Ok(event) = self.events.try_recv() {
            self.fold(event, &mut out);
        }
        out
    }

    fn fold(&mut self, event: EngineEvent, out: &mut Vec<PlaybackEvent>) {
        match event {
            EngineEvent::PropertyChanged { name, value } => {
                self.fold_property(&name, &value, out);
            }
            EngineEvent::FileLoaded => {
                self.state.media = self.requested_media.clone();
                let url = self.state.media.clone().unwrap_or_default();
                out.push(PlaybackEvent::MediaLoaded(url));
            }
            EngineEvent::PlaybackFinished => {
                if self.state.playing {
                    self.state.playing = false;
                    out.push(PlaybackEvent::PlayingChanged(false));
                }
                out.push(PlaybackEvent::Finished);
            }
            EngineEvent::Error { message } => {
                out.push(PlaybackEvent::Error(message));
            }
            // Log lines are emitted by the engine layer; replies carry no
            // state of their own.
            EngineEvent::LogMessage { .. } | EngineEvent::CommandReply { .. } => {}
        }
    }

    fn fold_property(&mut self, name: &str, value: &Value, out: &mut Vec<PlaybackEvent>) {
        match name {
            "time-pos" => {
                if let Some(position) = value.as_f64() {
                    self.state.position = position;
                    out.push(PlaybackEvent::PositionChanged(position));
                }
            }
            "duration" => {
                if let Some(duration) = value.as_f64() {
                    self.state.duration = duration;
                    out.push(PlaybackEvent::DurationChanged(duration));
                }
            }
            "pause" => {
                let playing = !value.is_truthy();
                if playing != self.state.playing {
                    self.state.playing = playing;
                    out.push(PlaybackEvent::PlayingChanged(playing));
                }
            }
            "volume" => {
                if let Some(volume) = value.as_i64() {
                    let volume = clamp_volume(volume);
                    if volume != self.state.volume {
                        self.state.volume = volume;
                        out.push(PlaybackEvent::VolumeChanged(volume));
                    }
                }
            }
            "mute" => {
                let muted = value.is_truthy();
                if muted != self.state.muted {
                    self.state.muted = muted;
                    out.push(PlaybackEvent::MuteChanged(muted));
                }
            }
            // End-of-file arrives as its own event.
            _ => {}
        }
    }
}

fn clamp_volume(volume: i64) -> u8 {
    volume.clamp(0, 100) as u8
}

fn is_network_url(url: &str) -> bool {
    let lowered = url.to_ascii_lowercase();
    NETWORK_SCHEMES
        .iter()
        .any(|scheme| lowered.starts_with(scheme))
}
