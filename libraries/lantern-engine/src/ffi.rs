//! Native ABI surface of the media engine
//!
//! Layout-compatible definitions of the engine's tagged-union node format
//! plus the constants the bridge needs. The `extern` declarations are only
//! compiled with the `libmpv` feature; the node types themselves are used
//! unconditionally because the marshaler builds and frees them on the Rust
//! side of the boundary.

#![allow(clippy::pub_underscore_fields)]

use std::os::raw::{c_char, c_int, c_void};

// Value format tags
pub const FORMAT_NONE: c_int = 0;
pub const FORMAT_STRING: c_int = 1;
pub const FORMAT_OSD_STRING: c_int = 2;
pub const FORMAT_FLAG: c_int = 3;
pub const FORMAT_INT64: c_int = 4;
pub const FORMAT_DOUBLE: c_int = 5;
pub const FORMAT_NODE: c_int = 6;
pub const FORMAT_NODE_ARRAY: c_int = 7;
pub const FORMAT_NODE_MAP: c_int = 8;
pub const FORMAT_BYTE_ARRAY: c_int = 9;

// Error codes (success is >= 0)
pub const ERROR_SUCCESS: c_int = 0;
pub const ERROR_EVENT_QUEUE_FULL: c_int = -1;
pub const ERROR_NOMEM: c_int = -2;
pub const ERROR_UNINITIALIZED: c_int = -3;
pub const ERROR_INVALID_PARAMETER: c_int = -4;
pub const ERROR_OPTION_NOT_FOUND: c_int = -5;
pub const ERROR_OPTION_FORMAT: c_int = -6;
pub const ERROR_OPTION_ERROR: c_int = -7;
pub const ERROR_PROPERTY_NOT_FOUND: c_int = -8;
pub const ERROR_PROPERTY_FORMAT: c_int = -9;
pub const ERROR_PROPERTY_UNAVAILABLE: c_int = -10;
pub const ERROR_PROPERTY_ERROR: c_int = -11;
pub const ERROR_COMMAND: c_int = -12;
pub const ERROR_LOADING_FAILED: c_int = -13;
pub const ERROR_GENERIC: c_int = -20;

// Event identifiers
pub const EVENT_NONE: c_int = 0;
pub const EVENT_SHUTDOWN: c_int = 1;
pub const EVENT_LOG_MESSAGE: c_int = 2;
pub const EVENT_COMMAND_REPLY: c_int = 5;
pub const EVENT_END_FILE: c_int = 7;
pub const EVENT_FILE_LOADED: c_int = 8;
pub const EVENT_PROPERTY_CHANGE: c_int = 22;

// Render parameter kinds
pub const RENDER_PARAM_INVALID: c_int = 0;
pub const RENDER_PARAM_API_TYPE: c_int = 1;
pub const RENDER_PARAM_OPENGL_INIT_PARAMS: c_int = 2;
pub const RENDER_PARAM_OPENGL_FBO: c_int = 3;
pub const RENDER_PARAM_FLIP_Y: c_int = 4;
pub const RENDER_PARAM_ADVANCED_CONTROL: c_int = 10;

/// Render API identifier expected by the engine for the OpenGL backend
pub const RENDER_API_TYPE_OPENGL: &[u8] = b"opengl\0";

/// Tagged-union node: one value crossing the ABI
#[repr(C)]
#[derive(Clone, Copy)]
pub struct RawNode {
    pub u: RawNodeData,
    pub format: c_int,
}

/// Payload of a [`RawNode`]; which field is live is dictated by `format`
#[repr(C)]
#[derive(Clone, Copy)]
pub union RawNodeData {
    pub string: *mut c_char,
    pub flag: c_int,
    pub int64: i64,
    pub double_: f64,
    pub list: *mut RawNodeList,
    pub byte_array: *mut c_void,
}

/// Backing storage for array and map nodes
///
/// `keys` is null for arrays; for maps it holds one NUL-terminated key per
/// entry, parallel to `values`.
#[repr(C)]
pub struct RawNodeList {
    pub num: c_int,
    pub values: *mut RawNode,
    pub keys: *mut *mut c_char,
}

/// One entry of the engine's event queue
#[repr(C)]
pub struct RawEvent {
    pub event_id: c_int,
    pub error: c_int,
    pub reply_userdata: u64,
    pub data: *mut c_void,
}

/// Payload of an `EVENT_PROPERTY_CHANGE` event
#[repr(C)]
pub struct RawEventProperty {
    pub name: *const c_char,
    pub format: c_int,
    pub data: *mut c_void,
}

/// Payload of an `EVENT_LOG_MESSAGE` event
#[repr(C)]
pub struct RawEventLogMessage {
    pub prefix: *const c_char,
    pub level: *const c_char,
    pub text: *const c_char,
    pub log_level: c_int,
}

/// OpenGL bootstrap parameters for render-context creation
#[repr(C)]
pub struct RawOpenGlInitParams {
    pub get_proc_address:
        Option<unsafe extern "C" fn(ctx: *mut c_void, name: *const c_char) -> *mut c_void>,
    pub get_proc_address_ctx: *mut c_void,
}

/// Offscreen render target description
#[repr(C)]
pub struct RawOpenGlFbo {
    pub fbo: c_int,
    pub w: c_int,
    pub h: c_int,
    pub internal_format: c_int,
}

/// One (kind, data) pair in a render parameter list
#[repr(C)]
pub struct RawRenderParam {
    pub kind: c_int,
    pub data: *mut c_void,
}

/// Opaque engine instance
#[repr(C)]
pub struct RawHandle {
    _private: [u8; 0],
}

/// Opaque render context
#[repr(C)]
pub struct RawRenderContext {
    _private: [u8; 0],
}

/// Human-readable name for an engine error code
///
/// Mirrors the engine's own stringification for the codes the bridge
/// surfaces; used by the test double and for log messages when the native
/// library is not linked.
pub fn error_name(code: c_int) -> &'static str {
    match code {
        c if c >= 0 => "success",
        ERROR_EVENT_QUEUE_FULL => "event queue full",
        ERROR_NOMEM => "memory allocation failed",
        ERROR_UNINITIALIZED => "core not initialized",
        ERROR_INVALID_PARAMETER => "invalid parameter",
        ERROR_OPTION_NOT_FOUND => "option not found",
        ERROR_OPTION_FORMAT => "unsupported format for accessing option",
        ERROR_OPTION_ERROR => "error setting option",
        ERROR_PROPERTY_NOT_FOUND => "property not found",
        ERROR_PROPERTY_FORMAT => "unsupported format for accessing property",
        ERROR_PROPERTY_UNAVAILABLE => "property unavailable",
        ERROR_PROPERTY_ERROR => "error accessing property",
        ERROR_COMMAND => "error running command",
        ERROR_LOADING_FAILED => "loading failed",
        _ => "unspecified error",
    }
}

#[cfg(feature = "libmpv")]
#[link(name = "mpv")]
extern "C" {
    pub fn mpv_create() -> *mut RawHandle;
    pub fn mpv_initialize(handle: *mut RawHandle) -> c_int;
    pub fn mpv_terminate_destroy(handle: *mut RawHandle);
    pub fn mpv_set_option_string(
        handle: *mut RawHandle,
        name: *const c_char,
        value: *const c_char,
    ) -> c_int;
    pub fn mpv_request_log_messages(handle: *mut RawHandle, min_level: *const c_char) -> c_int;
    pub fn mpv_set_wakeup_callback(
        handle: *mut RawHandle,
        callback: Option<unsafe extern "C" fn(ctx: *mut c_void)>,
        ctx: *mut c_void,
    );
    pub fn mpv_command_string(handle: *mut RawHandle, command: *const c_char) -> c_int;
    pub fn mpv_get_property(
        handle: *mut RawHandle,
        name: *const c_char,
        format: c_int,
        data: *mut c_void,
    ) -> c_int;
    pub fn mpv_set_property_async(
        handle: *mut RawHandle,
        reply_userdata: u64,
        name: *const c_char,
        format: c_int,
        data: *mut c_void,
    ) -> c_int;
    pub fn mpv_observe_property(
        handle: *mut RawHandle,
        reply_userdata: u64,
        name: *const c_char,
        format: c_int,
    ) -> c_int;
    pub fn mpv_wait_event(handle: *mut RawHandle, timeout: f64) -> *mut RawEvent;
    pub fn mpv_free_node_contents(node: *mut RawNode);
    pub fn mpv_error_string(code: c_int) -> *const c_char;
    pub fn mpv_render_context_create(
        context: *mut *mut RawRenderContext,
        handle: *mut RawHandle,
        params: *mut RawRenderParam,
    ) -> c_int;
    pub fn mpv_render_context_free(context: *mut RawRenderContext);
    pub fn mpv_render_context_set_update_callback(
        context: *mut RawRenderContext,
        callback: Option<unsafe extern "C" fn(ctx: *mut c_void)>,
        ctx: *mut c_void,
    );
    pub fn mpv_render_context_render(
        context: *mut RawRenderContext,
        params: *mut RawRenderParam,
    ) -> c_int;
}
