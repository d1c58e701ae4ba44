//! Bridge to the native media engine
//!
//! This crate owns every unsafe ABI detail of the player: converting
//! values to and from the engine's tagged-node representation
//! ([`marshal`]), running one engine instance ([`handle::Engine`]),
//! turning its raw event queue into a typed stream ([`events`]), and
//! driving GPU video output ([`render::VideoRenderer`]).
//!
//! The real engine is linked only with the `libmpv` feature; everything
//! else runs against the [`backend::EngineBackend`] seam, which is how
//! the tests exercise the full bridge without a native library.

pub mod backend;
pub mod error;
pub mod events;
pub mod ffi;
pub mod handle;
pub mod marshal;
pub mod render;
pub mod testing;

pub use error::{EngineError, Result};
pub use events::EngineEvent;
pub use handle::Engine;
pub use marshal::{outstanding_allocations, MarshalError, OwnedNode};
pub use render::VideoRenderer;
