//! # promptforge-core
//!
//! Shared configuration, path resolution, and secure string handling for
//! PromptForge.
//!
//! - **Configuration**: Loading, validation, and persistence of the config file
//! - **Paths**: Resolution of the data directory and storage namespace file
//! - **Secrets**: A zero-on-drop string type for API keys and other credentials

pub mod config;
pub mod env;
pub mod error;
pub mod paths;
pub mod secret;

// Re-exports for convenience
pub use config::Config;
pub use error::ConfigError;
pub use secret::SecretString;
