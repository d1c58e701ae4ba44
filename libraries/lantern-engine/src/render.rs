//! GPU render bridge
//!
//! Video frames are produced by a render context tied to the windowing
//! layer's GL context. Creating one is optional: when it fails the player
//! keeps running audio-only and the failure is reported once through the
//! event stream.

use std::sync::Arc;

use crossbeam_channel::{bounded, Receiver};
use tracing::warn;

use crate::backend::{EngineBackend, ProcAddressLoader, RenderContext};
use crate::handle::Engine;

impl Engine {
    /// Create the video renderer for this engine
    ///
    /// `loader` resolves GL symbols within the caller's current context.
    /// On failure an inactive renderer is returned and an `Error` event
    /// is published; playback continues audio-only.
    pub fn create_renderer(&self, loader: ProcAddressLoader) -> VideoRenderer {
        let Some(backend) = self.backend() else {
            return VideoRenderer::inactive();
        };
        let backend = Arc::clone(backend);
        match backend.create_render_context(loader) {
            Ok(context) => {
                // Coalescing channel: many update signals between frames
                // collapse into one redraw.
                let (redraw_tx, redraw_rx) = bounded(1);
                context.set_update_callback(Box::new(move || {
                    let _ = redraw_tx.try_send(());
                }));
                VideoRenderer {
                    context: Some(context),
                    redraw_rx,
                    _backend: Some(backend),
                }
            }
            Err(code) => {
                let reason = backend.error_message(code);
                warn!(error = %reason, "video rendering unavailable, continuing audio-only");
                self.publish_error(format!("video rendering unavailable: {reason}"));
                VideoRenderer::inactive()
            }
        }
    }
}

/// Renderer for one engine's video output
///
/// `render_frame` is called from the GUI thread with the target GL
/// context current. An inactive renderer accepts every call as a no-op.
pub struct VideoRenderer {
    // Declared before the backend keepalive: the context must be freed
    // before the engine instance it belongs to can be destroyed.
    context: Option<Box<dyn RenderContext>>,
    redraw_rx: Receiver<()>,
    _backend: Option<Arc<dyn EngineBackend>>,
}

impl VideoRenderer {
    fn inactive() -> Self {
        let (_tx, redraw_rx) = bounded(1);
        Self {
            context: None,
            redraw_rx,
            _backend: None,
        }
    }

    /// Whether a render context was successfully created
    pub fn is_active(&self) -> bool {
        self.context.is_some()
    }

    /// Render the current frame into `fbo` at the given size
    pub fn render_frame(&self, fbo: u32, width: i32, height: i32) {
        let Some(context) = &self.context else {
            return;
        };
        let code = context.render(fbo, width, height);
        if code < 0 {
            warn!(code, "frame render failed");
        }
    }

    /// Receiver signaled when a new frame should be drawn
    ///
    /// The GUI layer schedules a repaint when this fires; an inactive
    /// renderer's receiver never fires.
    pub fn redraw_requests(&self) -> Receiver<()> {
        self.redraw_rx.clone()
    }
}
