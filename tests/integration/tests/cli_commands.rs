//! CLI command integration tests.
//!
//! Commands are parsed with clap and dispatched through `run` against a
//! storage file in a temp directory.

use clap::Parser;
use promptforge_cli::{run, Cli};
use promptforge_core::Config;
use promptforge_secrets::{
    DefaultSecretStore, KeyValueStorage, SecretStore, API_KEY_SECRET, API_URL_SECRET,
    DEVICE_KEY_SLOT,
};
use std::path::PathBuf;
use tempfile::TempDir;

fn storage_path(dir: &TempDir) -> PathBuf {
    dir.path().join("local-storage.json")
}

async fn promptforge(dir: &TempDir, args: &[&str]) -> anyhow::Result<()> {
    let storage = storage_path(dir);
    let config_path = dir.path().join("promptforge.json5");
    let mut argv = vec![
        "promptforge".to_string(),
        "--config".to_string(),
        config_path.display().to_string(),
        "--storage".to_string(),
        storage.display().to_string(),
    ];
    argv.extend(args.iter().map(|a| a.to_string()));

    let cli = Cli::try_parse_from(argv)?;
    run(cli, Config::default()).await
}

fn open_store(dir: &TempDir) -> DefaultSecretStore {
    let mut config = Config::default();
    config.storage.path = Some(storage_path(dir));
    DefaultSecretStore::open(&config).unwrap()
}

#[tokio::test]
async fn test_secrets_set_then_delete() {
    let dir = TempDir::new().unwrap();

    promptforge(&dir, &["secrets", "set", API_KEY_SECRET, "--value", "sk-test-123"])
        .await
        .unwrap();
    let loaded = open_store(&dir).load_secret(API_KEY_SECRET).await.unwrap();
    assert_eq!(loaded.expose(), "sk-test-123");

    promptforge(&dir, &["secrets", "list"]).await.unwrap();
    promptforge(&dir, &["secrets", "get", API_KEY_SECRET]).await.unwrap();

    promptforge(&dir, &["secrets", "delete", API_KEY_SECRET])
        .await
        .unwrap();
    assert!(open_store(&dir).load_secret(API_KEY_SECRET).await.is_none());
}

#[tokio::test]
async fn test_secrets_set_reserved_name_fails() {
    let dir = TempDir::new().unwrap();
    let result = promptforge(&dir, &["secrets", "set", DEVICE_KEY_SLOT, "--value", "x"]).await;
    assert!(result.is_err());
}

#[tokio::test]
async fn test_api_set_show_clear() {
    let dir = TempDir::new().unwrap();

    promptforge(
        &dir,
        &["api", "set", "--url", "https://api.example.com/", "--key", "sk-test-123"],
    )
    .await
    .unwrap();

    let store = open_store(&dir);
    assert_eq!(
        store.load_secret(API_URL_SECRET).await.unwrap().expose(),
        "https://api.example.com"
    );
    assert_eq!(
        store.load_secret(API_KEY_SECRET).await.unwrap().expose(),
        "sk-test-123"
    );

    promptforge(&dir, &["api", "show"]).await.unwrap();
    promptforge(&dir, &["api", "clear"]).await.unwrap();

    let store = open_store(&dir);
    assert!(store.load_secret(API_URL_SECRET).await.is_none());
    assert!(store.load_secret(API_KEY_SECRET).await.is_none());
}

#[tokio::test]
async fn test_api_set_blank_values_fails() {
    let dir = TempDir::new().unwrap();
    let result = promptforge(&dir, &["api", "set", "--url", "  ", "--key", " "]).await;
    assert!(result.is_err());
}

#[tokio::test]
async fn test_device_key_reset_requires_confirmation() {
    let dir = TempDir::new().unwrap();
    promptforge(&dir, &["device-key", "show"]).await.unwrap();
    let before = open_store(&dir).storage().get(DEVICE_KEY_SLOT).unwrap();
    assert!(before.is_some());

    assert!(promptforge(&dir, &["device-key", "reset"]).await.is_err());
    assert_eq!(open_store(&dir).storage().get(DEVICE_KEY_SLOT).unwrap(), before);
}

#[tokio::test]
async fn test_device_key_reset_purge() {
    let dir = TempDir::new().unwrap();
    promptforge(&dir, &["secrets", "set", API_KEY_SECRET, "--value", "sk-test-123"])
        .await
        .unwrap();

    promptforge(&dir, &["device-key", "reset", "--yes", "--purge"])
        .await
        .unwrap();

    let store = open_store(&dir);
    assert!(store.storage().get(DEVICE_KEY_SLOT).unwrap().is_none());
    assert!(store.storage().get(API_KEY_SECRET).unwrap().is_none());
}

#[tokio::test]
async fn test_config_init_and_validate() {
    let dir = TempDir::new().unwrap();

    promptforge(&dir, &["config", "init"]).await.unwrap();
    assert!(dir.path().join("promptforge.json5").exists());

    // A second init without --force refuses to overwrite.
    assert!(promptforge(&dir, &["config", "init"]).await.is_err());
    promptforge(&dir, &["config", "init", "--force"]).await.unwrap();

    promptforge(&dir, &["config", "validate"]).await.unwrap();
    promptforge(&dir, &["config", "path"]).await.unwrap();
}

#[tokio::test]
async fn test_doctor_runs_on_fresh_storage() {
    let dir = TempDir::new().unwrap();
    promptforge(&dir, &["doctor"]).await.unwrap();
    assert!(!storage_path(&dir).exists());
}
