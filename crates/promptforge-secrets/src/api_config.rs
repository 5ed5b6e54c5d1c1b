//! Chat-completion API settings kept as encrypted secrets.
//!
//! The API base URL and API key are stored as two independent records,
//! [`API_URL_SECRET`] and [`API_KEY_SECRET`]. Either may be missing; a
//! record that fails to decrypt reads as missing.
//!
//! Subscribers are told about changes through [`ApiConfigEvent`] so views
//! holding a model list or a chat session can refresh or reset.

use std::sync::Arc;

use promptforge_core::SecretString;
use tokio::sync::broadcast;
use tracing::debug;

use crate::error::{Result, SecretError};
use crate::store::SecretStore;

/// Secret name holding the API base URL.
pub const API_URL_SECRET: &str = "encrypted_api_url";

/// Secret name holding the API key.
pub const API_KEY_SECRET: &str = "encrypted_api_key";

const EVENT_CAPACITY: usize = 16;

/// Change notifications for the stored API settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiConfigEvent {
    /// Settings were saved or cleared; reload them.
    Updated,
    /// Settings were cleared; drop state that depended on them.
    Deleted,
}

/// API settings as loaded from the store.
#[derive(Debug, Clone, Default)]
pub struct ApiConfig {
    /// Base URL without trailing slashes, e.g. `https://api.example.com`.
    pub base_url: Option<String>,
    /// Bearer token for the API.
    pub api_key: Option<SecretString>,
}

impl ApiConfig {
    /// Both the base URL and the key are present.
    pub fn is_configured(&self) -> bool {
        self.base_url.is_some() && self.api_key.is_some()
    }

    /// Model listing endpoint, used to check connectivity.
    pub fn models_endpoint(&self) -> Option<String> {
        self.endpoint("v1/models")
    }

    /// Chat completion endpoint.
    pub fn chat_completions_endpoint(&self) -> Option<String> {
        self.endpoint("v1/chat/completions")
    }

    /// `Authorization` header value.
    pub fn bearer_token(&self) -> Option<SecretString> {
        self.api_key
            .as_ref()
            .map(|key| SecretString::new(format!("Bearer {}", key.expose_secret())))
    }

    fn endpoint(&self, path: &str) -> Option<String> {
        self.base_url
            .as_deref()
            .map(|base| format!("{}/{path}", normalize_base_url(base)))
    }
}

/// Trim whitespace and strip every trailing `/`.
pub fn normalize_base_url(url: &str) -> String {
    url.trim().trim_end_matches('/').to_string()
}

/// Reads and writes [`ApiConfig`] through a [`SecretStore`].
pub struct ApiConfigManager<T: ?Sized> {
    store: Arc<T>,
    events: broadcast::Sender<ApiConfigEvent>,
}

impl<T> ApiConfigManager<T>
where
    T: SecretStore + ?Sized,
{
    /// Create a manager over `store`.
    pub fn new(store: Arc<T>) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self { store, events }
    }

    /// Subscribe to change notifications.
    pub fn subscribe(&self) -> broadcast::Receiver<ApiConfigEvent> {
        self.events.subscribe()
    }

    /// Load the stored settings. Missing or unreadable fields are `None`.
    pub async fn load(&self) -> ApiConfig {
        let base_url = self
            .store
            .load_secret(API_URL_SECRET)
            .await
            .map(|url| url.expose().to_string())
            .filter(|url| !url.is_empty());
        let api_key = self
            .store
            .load_secret(API_KEY_SECRET)
            .await
            .map(|key| key.into_secret_string())
            .filter(|key| !key.is_empty());

        ApiConfig { base_url, api_key }
    }

    /// Save the given settings.
    ///
    /// Both inputs are trimmed and the URL loses trailing slashes. A field
    /// that ends up empty is left as previously stored; if both are empty
    /// nothing is written and [`SecretError::EmptyApiConfig`] is returned.
    pub async fn save(&self, base_url: &str, api_key: &str) -> Result<ApiConfig> {
        let base_url = normalize_base_url(base_url);
        let api_key = SecretString::new(api_key.trim());

        if base_url.is_empty() && api_key.is_empty() {
            return Err(SecretError::EmptyApiConfig);
        }

        if !base_url.is_empty() {
            self.store.save_secret(API_URL_SECRET, &base_url).await?;
        }
        if !api_key.is_empty() {
            self.store
                .save_secret(API_KEY_SECRET, api_key.expose_secret())
                .await?;
        }

        debug!(
            url_saved = !base_url.is_empty(),
            key_saved = !api_key.is_empty(),
            "saved API settings"
        );
        self.notify(ApiConfigEvent::Updated);

        Ok(self.load().await)
    }

    /// Remove both settings.
    pub async fn clear(&self) {
        self.store.remove_secret(API_URL_SECRET).await;
        self.store.remove_secret(API_KEY_SECRET).await;

        debug!("cleared API settings");
        self.notify(ApiConfigEvent::Deleted);
        self.notify(ApiConfigEvent::Updated);
    }

    fn notify(&self, event: ApiConfigEvent) {
        // No subscribers is fine.
        let _ = self.events.send(event);
    }
}
