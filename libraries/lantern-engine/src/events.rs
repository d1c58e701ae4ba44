//! Typed engine events and the owner-thread dispatcher
//!
//! The engine signals pending events by invoking a wakeup callback from an
//! arbitrary internal thread. The only thing that ever happens on that
//! thread is a fire-and-forget send on a bounded(1) channel; the owner
//! thread notices the signal and drains the engine's queue itself,
//! republishing one typed event at a time in exactly the order the engine
//! produced them.

use crossbeam_channel::{bounded, unbounded, Receiver, Sender};
use lantern_core::Value;
use tracing::debug;

use crate::backend::EngineBackend;

/// A typed event decoded from the engine's queue
#[derive(Debug, Clone, PartialEq)]
pub enum EngineEvent {
    /// An observed property changed value
    PropertyChanged {
        /// Property name
        name: String,
        /// New value; `Absent` when the engine reports no payload
        value: Value,
    },

    /// A file finished loading and playback is starting
    FileLoaded,

    /// Playback reached the end of the current file
    ///
    /// Synthesized from the `eof-reached` property, once per false→true
    /// transition.
    PlaybackFinished,

    /// A log line forwarded from the engine
    LogMessage {
        /// Severity as reported by the engine ("error", "warn", ...)
        level: String,
        /// Message text
        text: String,
    },

    /// The engine replied to an asynchronous command
    CommandReply {
        /// Zero or positive on success, negative on failure
        error_code: i64,
    },

    /// A user-visible error surfaced by the bridge
    ///
    /// Synthesized from error-severity log messages and failed command
    /// replies; never terminates playback.
    Error {
        /// Human-readable description
        message: String,
    },
}

/// Drains the engine queue on the owner thread and republishes in order
pub(crate) struct EventDispatcher {
    wake_tx: Sender<()>,
    wake_rx: Receiver<()>,
    event_tx: Sender<EngineEvent>,
    event_rx: Receiver<EngineEvent>,
    eof_latch: bool,
}

impl EventDispatcher {
    pub(crate) fn new() -> Self {
        // One pending wake is enough; extra signals coalesce.
        let (wake_tx, wake_rx) = bounded(1);
        let (event_tx, event_rx) = unbounded();
        Self {
            wake_tx,
            wake_rx,
            event_tx,
            event_rx,
            eof_latch: false,
        }
    }

    /// Sender handed to the engine's wakeup callback
    pub(crate) fn wake_sender(&self) -> Sender<()> {
        self.wake_tx.clone()
    }

    /// Receiver the owner thread's run loop can park on
    pub(crate) fn wake_receiver(&self) -> Receiver<()> {
        self.wake_rx.clone()
    }

    /// Receiver of the republished typed event stream
    pub(crate) fn subscribe(&self) -> Receiver<EngineEvent> {
        self.event_rx.clone()
    }

    pub(crate) fn publish(&self, event: EngineEvent) {
        let _ = self.event_tx.send(event);
    }

    /// Pull from the engine until its queue reports empty
    ///
    /// Returns the number of events republished, synthesized ones
    /// included.
    pub(crate) fn drain(&mut self, backend: &dyn EngineBackend) -> usize {
        // Consume the pending wake so a signal arriving mid-drain still
        // re-triggers afterwards.
        while self.wake_rx.try_recv().is_ok() {}

        let mut published = 0;
        while let Some(event) = backend.next_event() {
            published += self.republish(backend, event);
        }
        published
    }

    fn republish(&mut self, backend: &dyn EngineBackend, event: EngineEvent) -> usize {
        let follow_up = match &event {
            EngineEvent::PropertyChanged { name, value } if name == "eof-reached" => {
                let reached = value.is_truthy();
                let fire = reached && !self.eof_latch;
                self.eof_latch = reached;
                fire.then_some(EngineEvent::PlaybackFinished)
            }
            EngineEvent::LogMessage { level, text } => {
                debug!(%level, %text, "engine log");
                (level == "error").then(|| EngineEvent::Error {
                    message: text.clone(),
                })
            }
            EngineEvent::CommandReply { error_code } if *error_code < 0 => {
                Some(EngineEvent::Error {
                    message: backend.error_message(*error_code as i32),
                })
            }
            _ => None,
        };

        let _ = self.event_tx.send(event);
        match follow_up {
            Some(event) => {
                let _ = self.event_tx.send(event);
                2
            }
            None => 1,
        }
    }
}
