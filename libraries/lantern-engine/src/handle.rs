//! Engine handle: lifecycle, commands, and property traffic
//!
//! One [`Engine`] wraps one native instance. All command/property/event
//! operations belong to the thread that owns the `Engine`; the only thing
//! that ever runs elsewhere is the wakeup signal (see [`crate::events`])
//! and render calls on their own context (see [`crate::render`]).

use std::collections::HashSet;
use std::sync::Arc;

use crossbeam_channel::Receiver;
use lantern_core::Value;
use tracing::{debug, warn};

use crate::backend::EngineBackend;
use crate::error::{EngineError, Result};
use crate::events::{EngineEvent, EventDispatcher};
use crate::ffi;
use crate::marshal;

/// Baseline options applied before the engine's own initialization
const BASELINE_OPTIONS: &[(&str, &str)] = &[
    ("video-sync", "display-resample"),
    ("hwdec", "auto"),
    ("vo", "gpu"),
    ("gpu-api", "auto"),
    ("keep-open", "yes"),
];

/// Properties observed for every handle; the playback state projection
/// relies on all of these being registered before it can see a change.
const BASELINE_OBSERVATIONS: &[&str] = &[
    "pause",
    "time-pos",
    "duration",
    "volume",
    "mute",
    "eof-reached",
];

/// Handle to one native engine instance
///
/// Created once at startup and shut down once at exit; every operation
/// after shutdown is a logged no-op.
pub struct Engine {
    backend: Option<Arc<dyn EngineBackend>>,
    dispatcher: EventDispatcher,
    observed: HashSet<String>,
}

impl Engine {
    /// Create a handle over the real engine ABI
    #[cfg(feature = "libmpv")]
    pub fn new() -> Result<Self> {
        let backend =
            crate::backend::libmpv::LibmpvBackend::create().ok_or(EngineError::CreationFailed)?;
        Ok(Self::with_backend(Arc::new(backend)))
    }

    /// Create a handle over an explicit backend (tests use the fake)
    pub fn with_backend(backend: Arc<dyn EngineBackend>) -> Self {
        Self {
            backend: Some(backend),
            dispatcher: EventDispatcher::new(),
            observed: HashSet::new(),
        }
    }

    /// Initialize the engine
    ///
    /// Applies the baseline options, forwards `options` verbatim (the
    /// engine decides validity of unknown keys), enables log forwarding,
    /// registers the wakeup callback, runs the engine's own init, and
    /// observes the baseline property set. A failed init tears the
    /// partially-created instance down before returning.
    pub fn initialize(&mut self, options: &[(String, String)]) -> Result<()> {
        let Some(backend) = self.backend.clone() else {
            return Err(EngineError::CreationFailed);
        };

        for (name, value) in BASELINE_OPTIONS {
            backend.set_option(name, value);
        }
        for (name, value) in options {
            backend.set_option(name, value);
        }

        let code = backend.request_log_messages("warn");
        if code < 0 {
            warn!(code, "failed to enable engine log forwarding");
        }

        // Registered before init so no early event can be missed.
        let wake_tx = self.dispatcher.wake_sender();
        backend.set_wakeup_callback(Box::new(move || {
            let _ = wake_tx.try_send(());
        }));

        let code = backend.initialize();
        if code < 0 {
            // Dropping the backend destroys the half-created instance.
            self.backend = None;
            return Err(EngineError::InitFailed(code));
        }

        for name in BASELINE_OBSERVATIONS {
            self.observe(name);
        }

        Ok(())
    }

    /// Issue a `loadfile` command; completion surfaces as events
    pub fn load_file(&self, path: &str) {
        self.command(&["loadfile", path]);
    }

    /// Build and submit an engine command from an argument list
    ///
    /// Arguments containing whitespace are quoted so they survive the
    /// string command form as a single argument.
    pub fn command(&self, args: &[&str]) {
        let Some(backend) = self.backend() else {
            return;
        };
        if args.is_empty() {
            return;
        }
        let command = serialize_command(args);
        let code = backend.command_string(&command);
        if code < 0 {
            warn!(%command, error = %backend.error_message(code), "engine command failed");
        }
    }

    /// Convert `value` to native form and submit without waiting
    ///
    /// Conversion failure drops the set with a warning; it never leaves a
    /// partial native allocation behind.
    pub fn set_property_async(&self, name: &str, value: &Value) {
        let Some(backend) = self.backend() else {
            return;
        };
        let node = match marshal::encode(value) {
            Ok(node) => node,
            Err(err) => {
                warn!(property = name, %err, "failed to convert value for property");
                return;
            }
        };
        let code = backend.set_property_node(name, node.raw());
        if code < 0 {
            warn!(property = name, error = %backend.error_message(code), "failed to set property");
        }
    }

    /// Read a property synchronously
    ///
    /// Returns `None` when the property is unavailable. `duration` and
    /// `time-pos` are expected to be absent before a file is loaded, so
    /// their unavailability is not worth a warning.
    pub fn get_property(&self, name: &str) -> Option<Value> {
        let backend = self.backend()?;
        match backend.get_property(name) {
            Ok(value) => Some(value),
            Err(code) => {
                if code == ffi::ERROR_PROPERTY_UNAVAILABLE
                    && (name == "duration" || name == "time-pos")
                {
                    debug!(property = name, "property not yet available");
                } else {
                    warn!(property = name, error = %backend.error_message(code), "failed to get property");
                }
                None
            }
        }
    }

    /// Observe a property for change notifications
    ///
    /// Idempotent: the engine delivers one notification per registration,
    /// so repeat registrations are swallowed here.
    pub fn observe(&mut self, name: &str) {
        let Some(backend) = self.backend.clone() else {
            return;
        };
        if self.observed.insert(name.to_owned()) {
            let code = backend.observe_property(name);
            if code < 0 {
                warn!(property = name, error = %backend.error_message(code), "failed to observe property");
            }
        }
    }

    /// Receiver of the typed event stream (single consumer expected)
    pub fn subscribe(&self) -> Receiver<EngineEvent> {
        self.dispatcher.subscribe()
    }

    /// Receiver signaled when the engine has unread events
    ///
    /// The owner thread's run loop parks on this and calls
    /// [`Engine::drain_events`] when it fires.
    pub fn wake_receiver(&self) -> Receiver<()> {
        self.dispatcher.wake_receiver()
    }

    /// Drain the engine's event queue on the owner thread
    ///
    /// Returns the number of events republished.
    pub fn drain_events(&mut self) -> usize {
        let Some(backend) = self.backend.clone() else {
            return 0;
        };
        self.dispatcher.drain(backend.as_ref())
    }

    /// Tear the engine down
    ///
    /// Safe to call more than once. The instance itself is destroyed when
    /// the last reference drops; a live [`crate::render::VideoRenderer`]
    /// holds one, so its context is always freed first.
    pub fn shutdown(&mut self) {
        if self.backend.take().is_some() {
            debug!("engine handle shut down");
        }
    }

    /// Whether the handle is still usable
    pub fn is_shut_down(&self) -> bool {
        self.backend.is_none()
    }

    pub(crate) fn backend(&self) -> Option<&Arc<dyn EngineBackend>> {
        if self.backend.is_none() {
            warn!("engine used after shutdown");
        }
        self.backend.as_ref()
    }

    pub(crate) fn publish_error(&self, message: String) {
        self.dispatcher.publish(EngineEvent::Error { message });
    }
}

impl Drop for Engine {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// Serialize an argument list into the engine's string command form
fn serialize_command(args: &[&str]) -> String {
    let mut command = String::new();
    for (i, arg) in args.iter().enumerate() {
        if i > 0 {
            command.push(' ');
        }
        if arg.contains(char::is_whitespace) {
            command.push('"');
            command.push_str(arg);
            command.push('"');
        } else {
            command.push_str(arg);
        }
    }
    command
}
