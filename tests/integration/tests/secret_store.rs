//! End-to-end tests of the file-backed secret store.

use std::sync::Arc;

use promptforge_core::Config;
use promptforge_secrets::{
    ApiConfigManager, DefaultSecretStore, KeyValueStorage, SecretError, SecretStore,
    StorageError, API_KEY_SECRET, API_URL_SECRET, DEVICE_KEY_SLOT,
};
use tempfile::TempDir;

fn config_in(dir: &TempDir) -> Config {
    let mut config = Config::default();
    config.storage.path = Some(dir.path().join("local-storage.json"));
    config
}

fn read_namespace(dir: &TempDir) -> serde_json::Map<String, serde_json::Value> {
    let raw = std::fs::read_to_string(dir.path().join("local-storage.json")).unwrap();
    serde_json::from_str(&raw).unwrap()
}

#[tokio::test]
async fn test_api_key_round_trip() {
    let dir = TempDir::new().unwrap();
    let store = DefaultSecretStore::open(&config_in(&dir)).unwrap();

    store.save_secret(API_KEY_SECRET, "sk-test-123").await.unwrap();

    let loaded = store.load_secret(API_KEY_SECRET).await.unwrap();
    assert_eq!(loaded.expose(), "sk-test-123");

    let namespace = read_namespace(&dir);
    let record = namespace[API_KEY_SECRET].as_str().unwrap();
    assert!(!record.contains("sk-test-123"));
    assert_eq!(namespace[DEVICE_KEY_SLOT].as_str().unwrap().len(), 64);
}

#[tokio::test]
async fn test_secrets_survive_reopen() {
    let dir = TempDir::new().unwrap();
    let config = config_in(&dir);

    {
        let store = DefaultSecretStore::open(&config).unwrap();
        store
            .save_secret(API_URL_SECRET, "https://api.example.com")
            .await
            .unwrap();
    }

    let store = DefaultSecretStore::open(&config).unwrap();
    let loaded = store.load_secret(API_URL_SECRET).await.unwrap();
    assert_eq!(loaded.expose(), "https://api.example.com");
}

#[tokio::test]
async fn test_missing_secret_is_none() {
    let dir = TempDir::new().unwrap();
    let store = DefaultSecretStore::open(&config_in(&dir)).unwrap();
    assert!(store.load_secret(API_KEY_SECRET).await.is_none());
}

#[tokio::test]
async fn test_corrupted_record_is_none() {
    let dir = TempDir::new().unwrap();
    let store = DefaultSecretStore::open(&config_in(&dir)).unwrap();

    store.save_secret(API_KEY_SECRET, "sk-test-123").await.unwrap();
    store.storage().set(API_KEY_SECRET, "bm90IGEgcmVjb3Jk").unwrap();

    assert!(store.load_secret(API_KEY_SECRET).await.is_none());
}

#[tokio::test]
async fn test_remove_is_idempotent() {
    let dir = TempDir::new().unwrap();
    let store = DefaultSecretStore::open(&config_in(&dir)).unwrap();

    store.save_secret(API_KEY_SECRET, "sk-test-123").await.unwrap();
    store.remove_secret(API_KEY_SECRET).await;
    store.remove_secret(API_KEY_SECRET).await;

    assert!(store.load_secret(API_KEY_SECRET).await.is_none());
    assert!(!read_namespace(&dir).contains_key(API_KEY_SECRET));
}

#[tokio::test]
async fn test_records_do_not_move_between_devices() {
    let dir_a = TempDir::new().unwrap();
    let dir_b = TempDir::new().unwrap();
    let store_a = DefaultSecretStore::open(&config_in(&dir_a)).unwrap();
    let store_b = DefaultSecretStore::open(&config_in(&dir_b)).unwrap();

    store_a.save_secret(API_KEY_SECRET, "sk-test-123").await.unwrap();
    store_b.save_secret(API_URL_SECRET, "unrelated").await.unwrap();

    // Copy A's record into B's namespace; B's device key cannot open it.
    let record = store_a.storage().get(API_KEY_SECRET).unwrap().unwrap();
    store_b.storage().set(API_KEY_SECRET, &record).unwrap();

    assert!(store_b.load_secret(API_KEY_SECRET).await.is_none());
    assert_eq!(
        store_a.load_secret(API_KEY_SECRET).await.unwrap().expose(),
        "sk-test-123"
    );
}

#[tokio::test]
async fn test_quota_exceeded_surfaces_storage_error() {
    let dir = TempDir::new().unwrap();
    let mut config = config_in(&dir);
    config.storage.quota_bytes = Some(256);
    let store = DefaultSecretStore::open(&config).unwrap();

    let err = store
        .save_secret(API_KEY_SECRET, &"x".repeat(1024))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        SecretError::Storage(StorageError::QuotaExceeded { .. })
    ));
    assert!(store.load_secret(API_KEY_SECRET).await.is_none());
}

#[tokio::test]
async fn test_list_ignores_device_key_and_plain_entries() {
    let dir = TempDir::new().unwrap();
    let store = DefaultSecretStore::open(&config_in(&dir)).unwrap();

    store.save_secret(API_URL_SECRET, "https://api.example.com").await.unwrap();
    store.save_secret(API_KEY_SECRET, "sk-test-123").await.unwrap();
    store.storage().set("theme", "dark").unwrap();

    assert_eq!(
        store.list().await.unwrap(),
        vec![API_KEY_SECRET.to_string(), API_URL_SECRET.to_string()]
    );
}

#[tokio::test]
async fn test_api_settings_through_file_store() {
    let dir = TempDir::new().unwrap();
    let config = config_in(&dir);
    let manager = ApiConfigManager::new(Arc::new(DefaultSecretStore::open(&config).unwrap()));

    manager
        .save("https://api.example.com/", "sk-test-123")
        .await
        .unwrap();

    let reopened = ApiConfigManager::new(Arc::new(DefaultSecretStore::open(&config).unwrap()));
    let api = reopened.load().await;
    assert!(api.is_configured());
    assert_eq!(
        api.chat_completions_endpoint().as_deref(),
        Some("https://api.example.com/v1/chat/completions")
    );

    reopened.clear().await;
    let after_clear = ApiConfigManager::new(Arc::new(DefaultSecretStore::open(&config).unwrap()));
    assert!(!after_clear.load().await.is_configured());
}
