//! Snapshot of playback as last reported by the engine

use serde::{Deserialize, Serialize};

/// Current playback state
///
/// Updated only from engine events, never optimistically on user intent:
/// a `play()` call that the engine rejects leaves `playing` false.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaybackState {
    /// Whether playback is running (not paused, not idle)
    pub playing: bool,
    /// Position in the current file, in seconds
    pub position: f64,
    /// Duration of the current file, in seconds; 0.0 until known
    pub duration: f64,
    /// Volume in percent, 0..=100
    pub volume: u8,
    /// Whether audio is muted
    pub muted: bool,
    /// URL or path of the currently loaded media, if any
    pub media: Option<String>,
}

impl Default for PlaybackState {
    fn default() -> Self {
        Self {
            playing: false,
            position: 0.0,
            duration: 0.0,
            volume: 100,
            muted: false,
            media: None,
        }
    }
}
