//! Backend seam over the native engine ABI
//!
//! The handle, dispatcher, and renderer are written against these traits
//! rather than the raw ABI so the whole bridge can be exercised in-process
//! against [`crate::testing::FakeEngine`]. The real implementation lives in
//! [`libmpv`] behind the `libmpv` cargo feature.

#[cfg(feature = "libmpv")]
pub mod libmpv;

use std::os::raw::c_void;

use lantern_core::Value;

use crate::events::EngineEvent;
use crate::ffi::RawNode;

/// Callback invoked by the engine when unread events are pending
///
/// May fire on any engine-internal thread; implementations must only
/// signal, never touch engine state.
pub type WakeupCallback = Box<dyn Fn() + Send + Sync + 'static>;

/// Callback invoked by the engine when a redraw is wanted
pub type UpdateCallback = Box<dyn Fn() + Send + Sync + 'static>;

/// Loader resolving GPU symbols during render-context creation
///
/// Must be called with the graphics context current on the calling thread.
pub type ProcAddressLoader = Box<dyn FnMut(&str) -> *mut c_void + Send>;

/// The narrow C-style ABI the bridge talks through
///
/// One instance wraps one native engine; dropping the implementation
/// destroys the instance.
pub trait EngineBackend: Send + Sync {
    /// Set a startup option before initialization
    fn set_option(&self, name: &str, value: &str) -> i32;

    /// Enable log message forwarding at `min_level` and above
    fn request_log_messages(&self, min_level: &str) -> i32;

    /// Run the engine's own initialization step
    fn initialize(&self) -> i32;

    /// Register the wakeup callback fired when events are queued
    fn set_wakeup_callback(&self, callback: WakeupCallback);

    /// Submit a serialized command string
    fn command_string(&self, command: &str) -> i32;

    /// Submit a property value in native node form, without waiting
    fn set_property_node(&self, name: &str, node: &RawNode) -> i32;

    /// Read a property synchronously; `Err` carries the engine error code
    fn get_property(&self, name: &str) -> std::result::Result<Value, i32>;

    /// Subscribe to change notifications for a property
    fn observe_property(&self, name: &str) -> i32;

    /// Pop the next queued event, or `None` when the queue is empty
    fn next_event(&self) -> Option<EngineEvent>;

    /// Stringify an engine error code
    fn error_message(&self, code: i32) -> String;

    /// Create a GPU render context bound to this engine instance
    ///
    /// Must be called with a graphics context current on the calling
    /// (render) thread; `Err` carries the engine error code.
    fn create_render_context(
        &self,
        loader: ProcAddressLoader,
    ) -> std::result::Result<Box<dyn RenderContext>, i32>;
}

/// GPU-bound render resources tied to one engine instance
///
/// Render calls are safe to issue concurrently with owner-thread property
/// and command traffic, but the context must be dropped before the engine
/// instance and never while a render call is in flight.
pub trait RenderContext: Send {
    /// Register the redraw-request callback
    fn set_update_callback(&self, callback: UpdateCallback);

    /// Render one frame into the given offscreen target
    fn render(&self, fbo: u32, width: i32, height: i32) -> i32;
}
