//! Round trips through real files

use lantern_core::Channel;
use lantern_storage::{load_channels, save_channels, ChannelManager, Settings, StorageError};
use serde_json::json;
use tempfile::tempdir;

#[test]
fn malformed_channel_records_are_skipped() {
    let dir = tempdir().expect("temp dir");
    let path = dir.path().join("channels.json");
    let document = json!([
        { "name": "One", "url": "http://host/one" },
        { "name": "Broken" },
        { "name": 7, "url": "http://host/seven" },
        { "url": "http://host/nameless" },
        { "name": "Two", "url": "http://host/two" },
    ]);
    std::fs::write(&path, document.to_string()).expect("write channels");

    let channels = load_channels(&path).expect("load succeeds");
    assert_eq!(
        channels,
        vec![
            Channel::new("One", "http://host/one"),
            Channel::new("Two", "http://host/two"),
        ]
    );
}

#[test]
fn a_non_array_document_is_rejected() {
    let dir = tempdir().expect("temp dir");
    let path = dir.path().join("channels.json");
    std::fs::write(&path, "{\"channels\": []}").expect("write channels");

    match load_channels(&path) {
        Err(StorageError::InvalidFormat(_)) => {}
        other => panic!("expected invalid format, got {other:?}"),
    }
}

#[test]
fn channels_round_trip_in_order() {
    let dir = tempdir().expect("temp dir");
    let path = dir.path().join("channels.json");
    let channels = vec![
        Channel::new("B", "http://host/b"),
        Channel::new("A", "http://host/a"),
    ];

    save_channels(&path, &channels).expect("save succeeds");
    assert_eq!(load_channels(&path).expect("load succeeds"), channels);
}

#[test]
fn manager_loads_and_saves_through_files() {
    let dir = tempdir().expect("temp dir");
    let path = dir.path().join("channels.json");
    save_channels(&path, &[Channel::new("One", "http://host/one")]).expect("save");

    let mut manager = ChannelManager::new();
    manager.load(&path).expect("load");
    assert_eq!(manager.current().map(|c| c.name.as_str()), Some("One"));

    manager.add(Channel::new("Two", "http://host/two"));
    manager.save(&path).expect("save");
    assert_eq!(load_channels(&path).expect("reload").len(), 2);
}

#[test]
fn settings_round_trip_preserves_unknown_keys() {
    let dir = tempdir().expect("temp dir");
    let path = dir.path().join("settings.json");

    let mut settings = Settings::default();
    settings.set_volume(42);
    settings.set_last_channel_index(3);
    settings.set_value("theme", json!("dark"));
    settings.set_engine_value("hwdec", json!("no"));
    settings.save(&path).expect("save succeeds");

    let loaded = Settings::load(&path).expect("load succeeds");
    assert_eq!(loaded.volume(), 42);
    assert_eq!(loaded.last_channel_index(), 3);
    assert_eq!(loaded.value("theme"), Some(&json!("dark")));
    assert_eq!(loaded.engine_value("hwdec"), Some(&json!("no")));
}

#[test]
fn missing_settings_file_yields_defaults() {
    let dir = tempdir().expect("temp dir");
    let path = dir.path().join("does-not-exist.json");
    let settings = Settings::load(&path).expect("defaults");
    assert_eq!(settings, Settings::default());
}

#[test]
fn partial_settings_files_fill_missing_keys_from_defaults() {
    let dir = tempdir().expect("temp dir");
    let path = dir.path().join("settings.json");
    std::fs::write(&path, "{\"player\": {\"volume\": 25}}").expect("write settings");

    let settings = Settings::load(&path).expect("load succeeds");
    assert_eq!(settings.volume(), 25);
    assert_eq!(settings.last_channel_index(), 0);
    assert_eq!(
        settings.engine_value("vo").and_then(serde_json::Value::as_str),
        Some("gpu")
    );
}
