//! Lantern Player Core
//!
//! Engine-agnostic core types shared across the Lantern Player workspace.
//!
//! This crate defines:
//! - **`Value`**: the dynamic tagged-union representation used for every
//!   value that crosses the media-engine boundary
//! - **`Channel`**: a named playable URL, the unit of the channel list
//!
//! Nothing in here touches the engine ABI, does I/O, or spawns threads;
//! the bridge itself lives in `lantern-engine`.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod types;

pub use types::{Channel, Value};
