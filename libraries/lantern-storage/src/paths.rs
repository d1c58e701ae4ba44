//! Platform paths for persisted files

use std::path::PathBuf;

use crate::error::{Result, StorageError};

const APP_DIR: &str = "lantern";

/// The player's configuration directory, created if missing
pub fn config_dir() -> Result<PathBuf> {
    let base = dirs_next::config_dir().ok_or(StorageError::NoConfigDir)?;
    let dir = base.join(APP_DIR);
    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}

/// Default path of the settings document
pub fn settings_file() -> Result<PathBuf> {
    Ok(config_dir()?.join("settings.json"))
}

/// Default path of the channel list
pub fn channels_file() -> Result<PathBuf> {
    Ok(config_dir()?.join("channels.json"))
}
