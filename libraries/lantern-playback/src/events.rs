//! Player-facing playback events

use serde::{Deserialize, Serialize};

/// A change in playback state, in the order the engine reported it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PlaybackEvent {
    /// Playback position moved (seconds)
    PositionChanged(f64),
    /// Duration of the current file became known or changed (seconds)
    DurationChanged(f64),
    /// Playback started or paused/stopped
    PlayingChanged(bool),
    /// Volume changed (percent, 0..=100)
    VolumeChanged(u8),
    /// Mute was toggled
    MuteChanged(bool),
    /// A file finished loading and playback is starting
    MediaLoaded(String),
    /// The current file played to its end
    Finished,
    /// A non-fatal error worth showing to the user
    Error(String),
}
