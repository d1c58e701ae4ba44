//! In-process engine double for unit and integration tests
//!
//! `FakeEngine` implements the backend seam with scripted behavior:
//! property sets are decoded from their native node form and stored, and
//! every stored change notifies each registered observation — one event
//! per registration, matching the real engine, so the handle's observation
//! dedupe is observable from tests. Failures (init, render-context
//! creation) can be injected.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

use lantern_core::Value;

use crate::backend::{
    EngineBackend, ProcAddressLoader, RenderContext, UpdateCallback, WakeupCallback,
};
use crate::events::EngineEvent;
use crate::ffi::{self, RawNode};
use crate::marshal;

#[derive(Default)]
struct FakeState {
    options: Vec<(String, String)>,
    log_level: Option<String>,
    initialized: bool,
    init_code: i32,
    properties: HashMap<String, Value>,
    observations: Vec<String>,
    commands: Vec<String>,
    queue: VecDeque<EngineEvent>,
    render_failure: Option<i32>,
    echo_property_sets: bool,
}

/// Scripted engine double implementing [`EngineBackend`]
pub struct FakeEngine {
    state: Mutex<FakeState>,
    wakeup: Mutex<Option<WakeupCallback>>,
    render_calls: Arc<Mutex<Vec<(u32, i32, i32)>>>,
    render_update: Arc<Mutex<Option<UpdateCallback>>>,
}

impl Default for FakeEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl FakeEngine {
    /// A fresh double that echoes property sets synchronously
    pub fn new() -> Self {
        Self {
            state: Mutex::new(FakeState {
                echo_property_sets: true,
                ..FakeState::default()
            }),
            wakeup: Mutex::new(None),
            render_calls: Arc::new(Mutex::new(Vec::new())),
            render_update: Arc::new(Mutex::new(None)),
        }
    }

    /// Make the engine's own initialization step fail with `code`
    pub fn fail_init(&self, code: i32) {
        self.lock().init_code = code;
    }

    /// Make render-context creation fail with `code`
    pub fn fail_render_context(&self, code: i32) {
        self.lock().render_failure = Some(code);
    }

    /// Store a property without notifying observers
    pub fn seed_property(&self, name: &str, value: Value) {
        self.lock().properties.insert(name.to_owned(), value);
    }

    /// Store a property and notify observers, as the engine would
    pub fn push_property_change(&self, name: &str, value: Value) {
        {
            let mut state = self.lock();
            state.properties.insert(name.to_owned(), value.clone());
            let registrations = state
                .observations
                .iter()
                .filter(|observed| observed.as_str() == name)
                .count();
            for _ in 0..registrations {
                state.queue.push_back(EngineEvent::PropertyChanged {
                    name: name.to_owned(),
                    value: value.clone(),
                });
            }
        }
        self.wake();
    }

    /// Queue an arbitrary event and fire the wakeup callback
    pub fn push_event(&self, event: EngineEvent) {
        self.lock().queue.push_back(event);
        self.wake();
    }

    /// Current stored value of a property
    pub fn property(&self, name: &str) -> Option<Value> {
        self.lock().properties.get(name).cloned()
    }

    /// Every observation registration, in call order (duplicates included)
    pub fn observations(&self) -> Vec<String> {
        self.lock().observations.clone()
    }

    /// Every serialized command string, in call order
    pub fn commands(&self) -> Vec<String> {
        self.lock().commands.clone()
    }

    /// Every startup option set, in call order
    pub fn options(&self) -> Vec<(String, String)> {
        self.lock().options.clone()
    }

    /// Requested log forwarding level, if any
    pub fn log_level(&self) -> Option<String> {
        self.lock().log_level.clone()
    }

    /// Whether the engine's initialization step ran
    pub fn initialized(&self) -> bool {
        self.lock().initialized
    }

    /// Recorded render calls as (fbo, width, height)
    pub fn render_calls(&self) -> Vec<(u32, i32, i32)> {
        self.render_calls.lock().unwrap().clone()
    }

    /// Fire the render-update callback, as the engine would on new frames
    pub fn request_redraw(&self) {
        if let Some(callback) = self.render_update.lock().unwrap().as_ref() {
            callback();
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, FakeState> {
        self.state.lock().unwrap()
    }

    fn wake(&self) {
        if let Some(callback) = self.wakeup.lock().unwrap().as_ref() {
            callback();
        }
    }
}

impl EngineBackend for FakeEngine {
    fn set_option(&self, name: &str, value: &str) -> i32 {
        self.lock().options.push((name.to_owned(), value.to_owned()));
        0
    }

    fn request_log_messages(&self, min_level: &str) -> i32 {
        self.lock().log_level = Some(min_level.to_owned());
        0
    }

    fn initialize(&self) -> i32 {
        let mut state = self.lock();
        state.initialized = state.init_code >= 0;
        state.init_code
    }

    fn set_wakeup_callback(&self, callback: WakeupCallback) {
        *self.wakeup.lock().unwrap() = Some(callback);
    }

    fn command_string(&self, command: &str) -> i32 {
        self.lock().commands.push(command.to_owned());
        0
    }

    fn set_property_node(&self, name: &str, node: &RawNode) -> i32 {
        // Safety: the handle submits nodes built by the marshaler.
        let value = unsafe { marshal::decode(node) };
        let echo = self.lock().echo_property_sets;
        if echo {
            self.push_property_change(name, value);
        } else {
            self.lock().properties.insert(name.to_owned(), value);
        }
        0
    }

    fn get_property(&self, name: &str) -> std::result::Result<Value, i32> {
        self.lock()
            .properties
            .get(name)
            .cloned()
            .ok_or(ffi::ERROR_PROPERTY_UNAVAILABLE)
    }

    fn observe_property(&self, name: &str) -> i32 {
        self.lock().observations.push(name.to_owned());
        0
    }

    fn next_event(&self) -> Option<EngineEvent> {
        self.lock().queue.pop_front()
    }

    fn error_message(&self, code: i32) -> String {
        ffi::error_name(code).to_owned()
    }

    fn create_render_context(
        &self,
        _loader: ProcAddressLoader,
    ) -> std::result::Result<Box<dyn RenderContext>, i32> {
        if let Some(code) = self.lock().render_failure {
            return Err(code);
        }
        Ok(Box::new(FakeRenderContext {
            calls: Arc::clone(&self.render_calls),
            update: Arc::clone(&self.render_update),
            fail_render: None,
        }))
    }
}

/// Render-context double recording every render call
pub struct FakeRenderContext {
    calls: Arc<Mutex<Vec<(u32, i32, i32)>>>,
    update: Arc<Mutex<Option<UpdateCallback>>>,
    fail_render: Option<i32>,
}

impl RenderContext for FakeRenderContext {
    fn set_update_callback(&self, callback: UpdateCallback) {
        *self.update.lock().unwrap() = Some(callback);
    }

    fn render(&self, fbo: u32, width: i32, height: i32) -> i32 {
        self.calls.lock().unwrap().push((fbo, width, height));
        self.fail_render.unwrap_or(0)
    }
}
