//! Diagnostic commands.

use console::{style, Emoji};
use promptforge_core::{env, Config};
use promptforge_secrets::{ApiConfigManager, KeyValueStorage, SecretStore, DEVICE_KEY_SLOT};
use std::sync::Arc;

use super::open_store;

static CHECK: Emoji = Emoji("✓", "+");
static CROSS: Emoji = Emoji("✗", "x");
static WARN: Emoji = Emoji("⚠", "!");

/// Run the doctor command.
pub async fn run(config: &Config) -> anyhow::Result<()> {
    println!("PromptForge Doctor\n");

    let mut errors = 0;
    let mut warnings = 0;

    println!("Checking configuration...");
    match config.validate() {
        Ok(()) => println!("  {} Configuration valid", style(CHECK).green()),
        Err(e) => {
            println!("  {} Configuration invalid: {}", style(CROSS).red(), e);
            errors += 1;
        }
    }

    println!("\nChecking storage...");
    let storage_path = config.storage_path()?;
    if storage_path.exists() {
        println!("  {} Storage file: {}", style(CHECK).green(), storage_path.display());
    } else {
        println!(
            "  {} Storage file not created yet: {}",
            style(WARN).yellow(),
            storage_path.display()
        );
        warnings += 1;
    }

    let store = match open_store(config) {
        Ok(store) => store,
        Err(e) => {
            println!("  {} {}", style(CROSS).red(), e);
            println!("\n{} error(s), {} warning(s)", errors + 1, warnings);
            return Ok(());
        }
    };

    // Decrypting with a missing device key would provision a new one, so the
    // record checks below only run when a key is already available.
    println!("\nChecking device key...");
    let key_available = if env::get_var(env::vars::DEVICE_KEY).is_some() {
        println!(
            "  {} Device key pinned by {}",
            style(CHECK).green(),
            env::vars::DEVICE_KEY
        );
        true
    } else {
        match store.storage().get(DEVICE_KEY_SLOT) {
            Ok(Some(key)) if !key.is_empty() => {
                println!("  {} Device key present", style(CHECK).green());
                true
            }
            Ok(_) => {
                println!(
                    "  {} No device key yet (created on first save)",
                    style(WARN).yellow()
                );
                warnings += 1;
                false
            }
            Err(e) => {
                println!("  {} Could not read device key: {}", style(CROSS).red(), e);
                errors += 1;
                false
            }
        }
    };

    println!("\nChecking secrets...");
    match store.list().await {
        Ok(names) if names.is_empty() => {
            println!("  {} No secrets stored", style(WARN).yellow());
            warnings += 1;
        }
        Ok(names) if !key_available => {
            println!(
                "  {} {} record(s) stored without a device key; they cannot be decrypted",
                style(CROSS).red(),
                names.len()
            );
            errors += 1;
        }
        Ok(names) => {
            for name in &names {
                if store.load_secret(name).await.is_some() {
                    println!("  {} {} decrypts", style(CHECK).green(), name);
                } else {
                    println!(
                        "  {} {} cannot be decrypted (treated as not configured)",
                        style(WARN).yellow(),
                        name
                    );
                    warnings += 1;
                }
            }
        }
        Err(e) => {
            println!("  {} Could not list secrets: {}", style(CROSS).red(), e);
            errors += 1;
        }
    }

    println!("\nChecking API settings...");
    let configured =
        key_available && ApiConfigManager::new(Arc::new(store)).load().await.is_configured();
    if configured {
        println!("  {} API URL and key configured", style(CHECK).green());
    } else {
        println!(
            "  {} API settings incomplete (run 'promptforge api set')",
            style(WARN).yellow()
        );
        warnings += 1;
    }

    println!("\n{} error(s), {} warning(s)", errors, warnings);
    Ok(())
}
