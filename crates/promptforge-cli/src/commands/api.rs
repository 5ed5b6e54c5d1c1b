//! API settings commands.

use std::sync::Arc;

use clap::Args;
use promptforge_core::Config;
use promptforge_secrets::ApiConfigManager;

use super::open_store;

/// API command arguments.
#[derive(Args)]
pub struct ApiArgs {
    #[command(subcommand)]
    pub command: ApiCommand,
}

#[derive(clap::Subcommand)]
pub enum ApiCommand {
    /// Save the API base URL and/or key (prompts for the key if neither is given)
    Set {
        /// API base URL, e.g. https://api.openai.com
        #[arg(long)]
        url: Option<String>,

        /// API key
        #[arg(long)]
        key: Option<String>,
    },

    /// Show the stored settings with the key masked
    Show,

    /// Delete the stored settings
    Clear,
}

/// Run the api command.
pub async fn run(args: ApiArgs, config: &Config) -> anyhow::Result<()> {
    let manager = ApiConfigManager::new(Arc::new(open_store(config)?));

    match args.command {
        ApiCommand::Set { url, key } => {
            let key = match (&url, key) {
                (None, None) => rpassword::prompt_password("Enter API key: ")
                    .map_err(|e| anyhow::anyhow!("Failed to read API key: {}", e))?,
                (_, key) => key.unwrap_or_default(),
            };
            let url = url.unwrap_or_default();

            let saved = manager
                .save(&url, &key)
                .await
                .map_err(|e| anyhow::anyhow!("Failed to save API settings: {}", e))?;

            println!("API settings encrypted and saved.");
            if !saved.is_configured() {
                println!("  Note: both an API URL and an API key are needed for chat testing.");
            }
        }

        ApiCommand::Show => {
            let api = manager.load().await;

            println!(
                "{:<10} {}",
                "URL",
                api.base_url.as_deref().unwrap_or("(not configured)")
            );
            println!(
                "{:<10} {}",
                "KEY",
                api.api_key
                    .as_ref()
                    .map(|k| k.masked())
                    .unwrap_or_else(|| "(not configured)".to_string())
            );
            if let Some(endpoint) = api.models_endpoint() {
                println!("{:<10} {}", "MODELS", endpoint);
            }
            if let Some(endpoint) = api.chat_completions_endpoint() {
                println!("{:<10} {}", "CHAT", endpoint);
            }
        }

        ApiCommand::Clear => {
            manager.clear().await;
            println!("API settings deleted.");
        }
    }

    Ok(())
}
