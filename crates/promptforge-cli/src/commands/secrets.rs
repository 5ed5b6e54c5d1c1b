//! Secret management commands.
//!
//! Provides `promptforge secrets set|get|list|delete` subcommands over the
//! device-keyed store in `promptforge-secrets`.

use clap::Args;
use promptforge_core::Config;
use promptforge_secrets::SecretStore;

use super::open_store;

/// Secrets command arguments.
#[derive(Args)]
pub struct SecretsArgs {
    #[command(subcommand)]
    pub command: SecretsCommand,
}

#[derive(clap::Subcommand)]
pub enum SecretsCommand {
    /// Store a secret (prompts for value)
    Set {
        /// Secret name (any key except the device key slot)
        name: String,

        /// Secret value (if omitted, prompts for hidden input)
        #[arg(long)]
        value: Option<String>,
    },

    /// Retrieve and print a decrypted secret
    Get {
        /// Secret name
        name: String,
    },

    /// List stored secrets (names only)
    List,

    /// Delete a secret
    Delete {
        /// Secret name
        name: String,
    },
}

/// Run the secrets command.
pub async fn run(args: SecretsArgs, config: &Config) -> anyhow::Result<()> {
    let store = open_store(config)?;

    match args.command {
        SecretsCommand::Set { name, value } => {
            let secret_value = match value {
                Some(v) => v,
                None => {
                    let prompt = format!("Enter value for '{name}': ");
                    rpassword::prompt_password(prompt)
                        .map_err(|e| anyhow::anyhow!("Failed to read secret: {}", e))?
                }
            };

            store
                .save_secret(&name, &secret_value)
                .await
                .map_err(|e| anyhow::anyhow!("Failed to save secret '{}': {}", name, e))?;

            println!("Secret '{}' stored.", name);
        }

        SecretsCommand::Get { name } => match store.load_secret(&name).await {
            Some(secret) => println!("{}", secret.expose()),
            None => eprintln!("Secret '{}' is not configured.", name),
        },

        SecretsCommand::List => {
            let names = store.list().await?;

            if names.is_empty() {
                println!("No secrets stored.");
            } else {
                println!("{:<32} {}", "NAME", "READABLE");
                println!("{}", "-".repeat(42));
                for name in &names {
                    let readable = store.load_secret(name).await.is_some();
                    println!("{:<32} {}", name, if readable { "yes" } else { "no" });
                }
                println!("\n{} secret(s) total.", names.len());
            }
        }

        SecretsCommand::Delete { name } => {
            store.remove_secret(&name).await;
            println!("Secret '{}' deleted.", name);
        }
    }

    Ok(())
}
