//! Channel record type

use serde::{Deserialize, Serialize};

/// A named playable URL
///
/// Channels are loaded from and saved to the channel list in
/// `lantern-storage`; both fields are required text there, and records
/// violating that are skipped at load time rather than failing the list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Channel {
    /// Display name
    pub name: String,

    /// Media URL or local path handed to the engine verbatim
    pub url: String,
}

impl Channel {
    /// Create a channel record
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
        }
    }
}
