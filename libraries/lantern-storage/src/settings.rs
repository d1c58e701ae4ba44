//! Persistent player settings
//!
//! One JSON document with two sections: `player` holds the player's own
//! keys, `engine` holds options forwarded verbatim to the media engine at
//! startup. Unknown keys in either section are preserved, so a newer
//! build never destroys what an older or hand-edited file contains.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use lantern_core::Value;
use serde::{Deserialize, Serialize};
use serde_json::Value as Json;
use tracing::{debug, info};

use crate::error::Result;

/// Player setting keys
pub mod keys {
    /// Volume in percent, 0..=100
    pub const VOLUME: &str = "volume";
    /// Index of the channel selected when the player last exited
    pub const LAST_CHANNEL_INDEX: &str = "last-channel-index";
    /// Override path of the channel list file
    pub const CHANNELS_FILE: &str = "channels-file";
}

/// The player's persisted settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// Player-level settings
    #[serde(default)]
    player: BTreeMap<String, Json>,
    /// Engine options applied at startup
    #[serde(default)]
    engine: BTreeMap<String, Json>,
}

impl Default for Settings {
    fn default() -> Self {
        let mut player = BTreeMap::new();
        player.insert(keys::VOLUME.to_owned(), Json::from(100));
        player.insert(keys::LAST_CHANNEL_INDEX.to_owned(), Json::from(0));

        let mut engine = BTreeMap::new();
        engine.insert("vo".to_owned(), Json::from("gpu"));
        engine.insert("hwdec".to_owned(), Json::from("auto"));
        engine.insert("audio-channels".to_owned(), Json::from("auto"));
        engine.insert("audio-device".to_owned(), Json::from("auto"));
        engine.insert("cache-secs".to_owned(), Json::from(10));

        Self { player, engine }
    }
}

impl Settings {
    /// Load settings from `path`
    ///
    /// A missing file yields the defaults; keys missing from an existing
    /// file are filled in from the defaults.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!(path = %path.display(), "no settings file, using defaults");
            return Ok(Self::default());
        }
        let contents = fs::read_to_string(path)?;
        let mut settings: Self = serde_json::from_str(&contents)?;

        let defaults = Self::default();
        for (key, value) in defaults.player {
            settings.player.entry(key).or_insert(value);
        }
        for (key, value) in defaults.engine {
            settings.engine.entry(key).or_insert(value);
        }
        info!(path = %path.display(), "loaded settings");
        Ok(settings)
    }

    /// Write settings to `path`
    pub fn save(&self, path: &Path) -> Result<()> {
        let contents = serde_json::to_string_pretty(self)?;
        fs::write(path, contents)?;
        Ok(())
    }

    /// Discard everything and return to the defaults
    pub fn reset_to_defaults(&mut self) {
        *self = Self::default();
    }

    /// A player setting by key
    pub fn value(&self, key: &str) -> Option<&Json> {
        self.player.get(key)
    }

    /// Set a player setting
    pub fn set_value(&mut self, key: &str, value: Json) {
        self.player.insert(key.to_owned(), value);
    }

    /// An engine option by name
    pub fn engine_value(&self, name: &str) -> Option<&Json> {
        self.engine.get(name)
    }

    /// Set an engine option
    pub fn set_engine_value(&mut self, name: &str, value: Json) {
        self.engine.insert(name.to_owned(), value);
    }

    /// Saved volume, clamped to 0..=100
    pub fn volume(&self) -> u8 {
        self.value(keys::VOLUME)
            .and_then(Json::as_i64)
            .unwrap_or(100)
            .clamp(0, 100) as u8
    }

    /// Persist the volume
    pub fn set_volume(&mut self, volume: u8) {
        self.set_value(keys::VOLUME, Json::from(volume.min(100)));
    }

    /// Channel index to restore on startup
    pub fn last_channel_index(&self) -> usize {
        self.value(keys::LAST_CHANNEL_INDEX)
            .and_then(Json::as_u64)
            .unwrap_or(0) as usize
    }

    /// Persist the channel index
    pub fn set_last_channel_index(&mut self, index: usize) {
        self.set_value(keys::LAST_CHANNEL_INDEX, Json::from(index as u64));
    }

    /// Override path of the channel list, if the user set one
    pub fn channels_file(&self) -> Option<&str> {
        self.value(keys::CHANNELS_FILE).and_then(Json::as_str)
    }

    /// Engine options as marshalable values, ready to apply at startup
    pub fn engine_options(&self) -> Vec<(String, Value)> {
        self.engine
            .iter()
            .map(|(name, value)| (name.clone(), json_to_value(value)))
            .collect()
    }
}

/// Convert a JSON value to the engine's value model
fn json_to_value(json: &Json) -> Value {
    match json {
        Json::Null => Value::Absent,
        Json::Bool(b) => Value::Bool(*b),
        Json::Number(n) => match n.as_i64() {
            Some(i) => Value::Integer(i),
            None => Value::Double(n.as_f64().unwrap_or(0.0)),
        },
        Json::String(s) => Value::Text(s.clone()),
        Json::Array(items) => Value::Sequence(items.iter().map(json_to_value).collect()),
        Json::Object(entries) => Value::Mapping(
            entries
                .iter()
                .map(|(key, value)| (key.clone(), json_to_value(value)))
                .collect(),
        ),
    }
}
