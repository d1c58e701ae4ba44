//! Error types for the engine bridge

use thiserror::Error;

/// Fatal engine bridge errors
///
/// Only the two initialization failures are fatal; everything downstream
/// (a failed property access, a failed render call, a render context that
/// would not create) degrades with a logged warning instead.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum EngineError {
    /// The native engine instance could not be created
    #[error("failed to create engine instance")]
    CreationFailed,

    /// The engine's own initialization step failed
    #[error("engine initialization failed: {}", crate::ffi::error_name(*.0))]
    InitFailed(i32),
}

/// Result type for engine bridge operations
pub type Result<T> = std::result::Result<T, EngineError>;
