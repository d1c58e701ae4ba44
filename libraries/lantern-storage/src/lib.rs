//! Persistence for the player: channel lists and settings
//!
//! Channels live in a user-editable JSON file ([`channels`]); settings in
//! a JSON document under the platform config directory ([`settings`]).
//! Both are tolerant readers: malformed channel records are skipped, a
//! missing settings file yields defaults.

pub mod channels;
pub mod error;
pub mod paths;
pub mod settings;

pub use channels::{load_channels, save_channels, ChannelManager};
pub use error::{Result, StorageError};
pub use settings::Settings;
