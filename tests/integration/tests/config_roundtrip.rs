//! Config save/load roundtrip integration tests.

use promptforge_core::config::{Config, LogLevel};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

#[test]
fn test_config_save_and_load() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("promptforge.json5");

    let config = Config::default();
    config.save(&path).unwrap();

    let loaded = Config::load(&path).unwrap();
    assert_eq!(loaded.logging.level, config.logging.level);
    assert_eq!(loaded.logging.json, config.logging.json);
    assert!(loaded.storage.path.is_none());
    assert!(loaded.storage.quota_bytes.is_none());
}

#[test]
fn test_config_modify_and_reload() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("promptforge.json5");

    let mut config = Config::default();
    config.storage.path = Some(dir.path().join("store.json"));
    config.storage.quota_bytes = Some(5 * 1024 * 1024);
    config.logging.level = LogLevel::Debug;
    config.save(&path).unwrap();

    let loaded = Config::load(&path).unwrap();
    assert_eq!(loaded.storage.path, Some(dir.path().join("store.json")));
    assert_eq!(loaded.storage.quota_bytes, Some(5 * 1024 * 1024));
    assert_eq!(loaded.logging.level, LogLevel::Debug);
}

#[test]
fn test_config_parse_json5_comments() {
    let config = Config::parse(
        r#"{
            // storage namespace
            storage: { path: "/tmp/pf-store.json", quota_bytes: 1024 },
            logging: { level: "warn" },
        }"#,
    )
    .unwrap();
    assert_eq!(config.storage.path, Some(PathBuf::from("/tmp/pf-store.json")));
    assert_eq!(config.storage.quota_bytes, Some(1024));
    assert_eq!(config.logging.level, LogLevel::Warn);
}

#[test]
fn test_config_load_nonexistent() {
    let result = Config::load(Path::new("/nonexistent/promptforge.json5"));
    assert!(result.is_err());
}

#[test]
fn test_config_load_or_default_missing_file() {
    let dir = TempDir::new().unwrap();
    let config = Config::load_or_default(Some(&dir.path().join("missing.json5"))).unwrap();
    assert_eq!(config.logging.level, LogLevel::Info);
}

#[test]
fn test_config_parse_invalid() {
    assert!(Config::parse("not valid json").is_err());
}

#[test]
fn test_config_zero_quota_rejected() {
    let mut config = Config::default();
    config.storage.quota_bytes = Some(0);
    assert!(config.validate().is_err());
}
