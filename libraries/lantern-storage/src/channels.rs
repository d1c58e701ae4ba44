//! Channel list persistence and selection
//!
//! The channel file is a JSON array of `{ "name": ..., "url": ... }`
//! records. Users edit it by hand, so the loader is forgiving: a record
//! missing either field, or with a non-string value, is skipped with a
//! warning instead of failing the whole list.

use std::fs;
use std::path::Path;

use lantern_core::Channel;
use serde_json::Value as Json;
use tracing::{info, warn};

use crate::error::{Result, StorageError};

/// Load channels from `path`, skipping malformed records
pub fn load_channels(path: &Path) -> Result<Vec<Channel>> {
    let contents = fs::read_to_string(path)?;
    let document: Json = serde_json::from_str(&contents)?;
    let Json::Array(records) = document else {
        return Err(StorageError::InvalidFormat(
            "channel file must be a JSON array".to_owned(),
        ));
    };

    let mut channels = Vec::with_capacity(records.len());
    for (index, record) in records.iter().enumerate() {
        let name = record.get("name").and_then(Json::as_str);
        let url = record.get("url").and_then(Json::as_str);
        match (name, url) {
            (Some(name), Some(url)) => channels.push(Channel::new(name, url)),
            _ => warn!(index, "skipping malformed channel record"),
        }
    }
    info!(count = channels.len(), path = %path.display(), "loaded channels");
    Ok(channels)
}

/// Write channels to `path` in their current order
pub fn save_channels(path: &Path, channels: &[Channel]) -> Result<()> {
    let records: Vec<Json> = channels
        .iter()
        .map(|channel| {
            serde_json::json!({
                "name": channel.name,
                "url": channel.url,
            })
        })
        .collect();
    let contents = serde_json::to_string_pretty(&Json::Array(records))?;
    fs::write(path, contents)?;
    Ok(())
}

/// An ordered channel list with one current selection
///
/// Selection survives edits where possible: removing past the current
/// index leaves it alone, removing the tail clamps it, emptying the list
/// clears it.
#[derive(Debug, Default)]
pub struct ChannelManager {
    channels: Vec<Channel>,
    current: Option<usize>,
}

impl ChannelManager {
    /// An empty manager with no selection
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the list; selects the first channel when non-empty
    pub fn set_channels(&mut self, channels: Vec<Channel>) {
        self.current = if channels.is_empty() { None } else { Some(0) };
        self.channels = channels;
    }

    /// Load the list from `path`
    pub fn load(&mut self, path: &Path) -> Result<()> {
        let channels = load_channels(path)?;
        self.set_channels(channels);
        Ok(())
    }

    /// Save the list to `path`
    pub fn save(&self, path: &Path) -> Result<()> {
        save_channels(path, &self.channels)
    }

    /// All channels in order
    pub fn channels(&self) -> &[Channel] {
        &self.channels
    }

    /// Index of the current selection
    pub fn current_index(&self) -> Option<usize> {
        self.current
    }

    /// The selected channel
    pub fn current(&self) -> Option<&Channel> {
        self.current.and_then(|index| self.channels.get(index))
    }

    /// Select by index; out-of-range indices are ignored
    pub fn select(&mut self, index: usize) -> Option<&Channel> {
        if index < self.channels.len() {
            self.current = Some(index);
        }
        self.current()
    }

    /// Move the selection forward, wrapping at the end
    pub fn next(&mut self) -> Option<&Channel> {
        if self.channels.is_empty() {
            return None;
        }
        let index = match self.current {
            Some(index) => (index + 1) % self.channels.len(),
            None => 0,
        };
        self.current = Some(index);
        self.current()
    }

    /// Move the selection backward, wrapping at the start
    pub fn previous(&mut self) -> Option<&Channel> {
        if self.channels.is_empty() {
            return None;
        }
        let index = match self.current {
            Some(0) | None => self.channels.len() - 1,
            Some(index) => index - 1,
        };
        self.current = Some(index);
        self.current()
    }

    /// Append a channel; becomes the selection if there was none
    pub fn add(&mut self, channel: Channel) {
        self.channels.push(channel);
        if self.current.is_none() {
            self.current = Some(0);
        }
    }

    /// Replace the channel at `index`; out-of-range indices are ignored
    pub fn update(&mut self, index: usize, channel: Channel) {
        if let Some(slot) = self.channels.get_mut(index) {
            *slot = channel;
        }
    }

    /// Remove the channel at `index`, fixing up the selection
    pub fn remove(&mut self, index: usize) {
        if index >= self.channels.len() {
            return;
        }
        self.channels.remove(index);
        self.current = match self.current {
            _ if self.channels.is_empty() => None,
            Some(current) if current >= self.channels.len() => Some(self.channels.len() - 1),
            Some(current) if current > index => Some(current - 1),
            other => other,
        };
    }
}
