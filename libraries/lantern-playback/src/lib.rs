//! Playback control and state projection
//!
//! [`PlaybackController`] wraps an [`lantern_engine::Engine`] with the
//! player-facing operations (load, play/pause, seek, volume) and folds the
//! engine's event stream into a [`state::PlaybackState`] snapshot plus a
//! stream of [`events::PlaybackEvent`] deltas for the UI.

pub mod controller;
pub mod events;
pub mod state;

pub use controller::PlaybackController;
pub use events::PlaybackEvent;
pub use state::PlaybackState;
