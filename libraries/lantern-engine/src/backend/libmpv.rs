//! Real engine backend over the libmpv C ABI
//!
//! Compiled only with the `libmpv` feature so the rest of the workspace
//! builds and tests without the native library installed.

use std::ffi::{CStr, CString};
use std::os::raw::{c_char, c_int, c_void};
use std::ptr;
use std::sync::Mutex;

use lantern_core::Value;
use tracing::warn;

use crate::backend::{EngineBackend, ProcAddressLoader, RenderContext, UpdateCallback, WakeupCallback};
use crate::events::EngineEvent;
use crate::ffi::{self, RawNode};
use crate::marshal;

/// Engine backend linked against the native library
pub struct LibmpvBackend {
    handle: *mut ffi::RawHandle,
    // Callback box handed to the C side; freed on drop, after the engine
    // can no longer invoke it.
    wakeup: Mutex<Option<*mut WakeupCallback>>,
}

// Safety: the engine handle is documented thread-safe by the ABI; the
// wakeup slot is mutex-guarded.
unsafe impl Send for LibmpvBackend {}
unsafe impl Sync for LibmpvBackend {}

unsafe extern "C" fn wakeup_trampoline(ctx: *mut c_void) {
    let callback = &*ctx.cast::<WakeupCallback>();
    callback();
}

unsafe extern "C" fn update_trampoline(ctx: *mut c_void) {
    let callback = &*ctx.cast::<UpdateCallback>();
    callback();
}

unsafe extern "C" fn proc_address_trampoline(ctx: *mut c_void, name: *const c_char) -> *mut c_void {
    let loader = &mut *ctx.cast::<ProcAddressLoader>();
    let name = CStr::from_ptr(name).to_string_lossy();
    loader(&name)
}

fn to_cstring(text: &str) -> CString {
    // Engine names/commands never carry interior NULs; strip rather than
    // panic if one ever shows up.
    CString::new(text.replace('\0', "")).unwrap_or_default()
}

impl LibmpvBackend {
    /// Create a native engine instance
    pub fn create() -> Option<Self> {
        let handle = unsafe { ffi::mpv_create() };
        if handle.is_null() {
            return None;
        }
        Some(Self {
            handle,
            wakeup: Mutex::new(None),
        })
    }
}

impl Drop for LibmpvBackend {
    fn drop(&mut self) {
        unsafe {
            ffi::mpv_set_wakeup_callback(self.handle, None, ptr::null_mut());
            ffi::mpv_terminate_destroy(self.handle);
        }
        if let Ok(mut slot) = self.wakeup.lock() {
            if let Some(boxed) = slot.take() {
                drop(unsafe { Box::from_raw(boxed) });
            }
        }
    }
}

impl EngineBackend for LibmpvBackend {
    fn set_option(&self, name: &str, value: &str) -> i32 {
        let name = to_cstring(name);
        let value = to_cstring(value);
        unsafe { ffi::mpv_set_option_string(self.handle, name.as_ptr(), value.as_ptr()) }
    }

    fn request_log_messages(&self, min_level: &str) -> i32 {
        let level = to_cstring(min_level);
        unsafe { ffi::mpv_request_log_messages(self.handle, level.as_ptr()) }
    }

    fn initialize(&self) -> i32 {
        unsafe { ffi::mpv_initialize(self.handle) }
    }

    fn set_wakeup_callback(&self, callback: WakeupCallback) {
        let boxed = Box::into_raw(Box::new(callback));
        unsafe {
            ffi::mpv_set_wakeup_callback(self.handle, Some(wakeup_trampoline), boxed.cast());
        }
        if let Ok(mut slot) = self.wakeup.lock() {
            // The engine is single-handle; registration happens once during
            // initialize, so a previous box should not exist.
            if let Some(previous) = slot.replace(boxed) {
                drop(unsafe { Box::from_raw(previous) });
            }
        }
    }

    fn command_string(&self, command: &str) -> i32 {
        let command = to_cstring(command);
        unsafe { ffi::mpv_command_string(self.handle, command.as_ptr()) }
    }

    fn set_property_node(&self, name: &str, node: &RawNode) -> i32 {
        let name = to_cstring(name);
        unsafe {
            ffi::mpv_set_property_async(
                self.handle,
                0,
                name.as_ptr(),
                ffi::FORMAT_NODE,
                (node as *const RawNode).cast_mut().cast(),
            )
        }
    }

    fn get_property(&self, name: &str) -> std::result::Result<Value, i32> {
        let name = to_cstring(name);
        let mut node = std::mem::MaybeUninit::<RawNode>::uninit();
        let code = unsafe {
            ffi::mpv_get_property(
                self.handle,
                name.as_ptr(),
                ffi::FORMAT_NODE,
                node.as_mut_ptr().cast(),
            )
        };
        if code < 0 {
            return Err(code);
        }
        let mut node = unsafe { node.assume_init() };
        let value = unsafe { marshal::decode(&node) };
        unsafe { ffi::mpv_free_node_contents(&mut node) };
        Ok(value)
    }

    fn observe_property(&self, name: &str) -> i32 {
        let name = to_cstring(name);
        unsafe { ffi::mpv_observe_property(self.handle, 0, name.as_ptr(), ffi::FORMAT_NODE) }
    }

    fn next_event(&self) -> Option<EngineEvent> {
        loop {
            let event = unsafe { ffi::mpv_wait_event(self.handle, 0.0) };
            if event.is_null() {
                return None;
            }
            let event = unsafe { &*event };
            match event.event_id {
                ffi::EVENT_NONE => return None,
                ffi::EVENT_PROPERTY_CHANGE => {
                    let prop = unsafe { &*event.data.cast::<ffi::RawEventProperty>() };
                    let name = unsafe { CStr::from_ptr(prop.name) }
                        .to_string_lossy()
                        .into_owned();
                    let value = if prop.format == ffi::FORMAT_NODE && !prop.data.is_null() {
                        unsafe { marshal::decode(&*prop.data.cast::<RawNode>()) }
                    } else {
                        Value::Absent
                    };
                    return Some(EngineEvent::PropertyChanged { name, value });
                }
                ffi::EVENT_FILE_LOADED => return Some(EngineEvent::FileLoaded),
                ffi::EVENT_LOG_MESSAGE => {
                    let msg = unsafe { &*event.data.cast::<ffi::RawEventLogMessage>() };
                    let level = unsafe { CStr::from_ptr(msg.level) }
                        .to_string_lossy()
                        .into_owned();
                    let text = unsafe { CStr::from_ptr(msg.text) }
                        .to_string_lossy()
                        .trim_end()
                        .to_owned();
                    return Some(EngineEvent::LogMessage { level, text });
                }
                ffi::EVENT_COMMAND_REPLY => {
                    return Some(EngineEvent::CommandReply {
                        error_code: i64::from(event.error),
                    });
                }
                // Events the bridge does not surface; keep draining.
                _ => {}
            }
        }
    }

    fn error_message(&self, code: i32) -> String {
        let text = unsafe { ffi::mpv_error_string(code) };
        if text.is_null() {
            ffi::error_name(code).to_owned()
        } else {
            unsafe { CStr::from_ptr(text) }.to_string_lossy().into_owned()
        }
    }

    fn create_render_context(
        &self,
        loader: ProcAddressLoader,
    ) -> std::result::Result<Box<dyn RenderContext>, i32> {
        let loader = Box::into_raw(Box::new(loader));
        let mut init_params = ffi::RawOpenGlInitParams {
            get_proc_address: Some(proc_address_trampoline),
            get_proc_address_ctx: loader.cast(),
        };
        let mut advanced_control: c_int = 1;
        let mut params = [
            ffi::RawRenderParam {
                kind: ffi::RENDER_PARAM_API_TYPE,
                data: ffi::RENDER_API_TYPE_OPENGL.as_ptr().cast_mut().cast(),
            },
            ffi::RawRenderParam {
                kind: ffi::RENDER_PARAM_OPENGL_INIT_PARAMS,
                data: (&mut init_params as *mut ffi::RawOpenGlInitParams).cast(),
            },
            ffi::RawRenderParam {
                kind: ffi::RENDER_PARAM_ADVANCED_CONTROL,
                data: (&mut advanced_control as *mut c_int).cast(),
            },
            ffi::RawRenderParam {
                kind: ffi::RENDER_PARAM_INVALID,
                data: ptr::null_mut(),
            },
        ];

        let mut context: *mut ffi::RawRenderContext = ptr::null_mut();
        let code = unsafe {
            ffi::mpv_render_context_create(&mut context, self.handle, params.as_mut_ptr())
        };
        if code < 0 {
            drop(unsafe { Box::from_raw(loader) });
            return Err(code);
        }
        Ok(Box::new(LibmpvRenderContext {
            context,
            loader,
            update: Mutex::new(None),
        }))
    }
}

/// GPU render context over the native ABI
struct LibmpvRenderContext {
    context: *mut ffi::RawRenderContext,
    // Kept alive for the life of the context; the engine may resolve GPU
    // symbols lazily.
    loader: *mut ProcAddressLoader,
    update: Mutex<Option<*mut UpdateCallback>>,
}

// Safety: the render context handle is documented safe to use from the
// render thread while owner-thread traffic continues.
unsafe impl Send for LibmpvRenderContext {}

impl RenderContext for LibmpvRenderContext {
    fn set_update_callback(&self, callback: UpdateCallback) {
        let boxed = Box::into_raw(Box::new(callback));
        unsafe {
            ffi::mpv_render_context_set_update_callback(
                self.context,
                Some(update_trampoline),
                boxed.cast(),
            );
        }
        if let Ok(mut slot) = self.update.lock() {
            if let Some(previous) = slot.replace(boxed) {
                drop(unsafe { Box::from_raw(previous) });
            }
        }
    }

    fn render(&self, fbo: u32, width: i32, height: i32) -> i32 {
        let mut target = ffi::RawOpenGlFbo {
            fbo: fbo as c_int,
            w: width,
            h: height,
            internal_format: 0,
        };
        let mut flip_y: c_int = 1;
        let mut params = [
            ffi::RawRenderParam {
                kind: ffi::RENDER_PARAM_OPENGL_FBO,
                data: (&mut target as *mut ffi::RawOpenGlFbo).cast(),
            },
            ffi::RawRenderParam {
                kind: ffi::RENDER_PARAM_FLIP_Y,
                data: (&mut flip_y as *mut c_int).cast(),
            },
            ffi::RawRenderParam {
                kind: ffi::RENDER_PARAM_INVALID,
                data: ptr::null_mut(),
            },
        ];
        unsafe { ffi::mpv_render_context_render(self.context, params.as_mut_ptr()) }
    }
}

impl Drop for LibmpvRenderContext {
    fn drop(&mut self) {
        unsafe {
            ffi::mpv_render_context_set_update_callback(self.context, None, ptr::null_mut());
            ffi::mpv_render_context_free(self.context);
            drop(Box::from_raw(self.loader));
        }
        if let Ok(mut slot) = self.update.lock() {
            if let Some(boxed) = slot.take() {
                drop(unsafe { Box::from_raw(boxed) });
            }
        } else {
            warn!("render update callback slot poisoned during teardown");
        }
    }
}
