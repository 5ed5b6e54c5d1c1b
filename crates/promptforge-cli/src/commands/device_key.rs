//! Device key commands.

use clap::Args;
use promptforge_core::{env, Config};
use promptforge_secrets::{SecretStore, StorageDeviceKey};

use super::open_store;

/// Device key command arguments.
#[derive(Args)]
pub struct DeviceKeyArgs {
    #[command(subcommand)]
    pub command: DeviceKeyCommand,
}

#[derive(clap::Subcommand)]
pub enum DeviceKeyCommand {
    /// Print the device key, creating it if needed
    Show,

    /// Delete the device key; stored secrets become unreadable
    Reset {
        /// Confirm the reset
        #[arg(long)]
        yes: bool,

        /// Also delete every stored secret
        #[arg(long)]
        purge: bool,
    },
}

/// Run the device-key command.
pub async fn run(args: DeviceKeyArgs, config: &Config) -> anyhow::Result<()> {
    let store = open_store(config)?;

    match args.command {
        DeviceKeyCommand::Show => {
            let key = store.ensure_device_key().await?;
            println!("{}", key);
        }

        DeviceKeyCommand::Reset { yes, purge } => {
            if env::get_var(env::vars::DEVICE_KEY).is_some() {
                anyhow::bail!(
                    "The device key is pinned by {}; unset it to reset the stored key.",
                    env::vars::DEVICE_KEY
                );
            }
            if !yes {
                anyhow::bail!(
                    "Resetting the device key makes every stored secret unreadable. \
                     Re-run with --yes to continue."
                );
            }

            if purge {
                for name in store.list().await? {
                    store.remove_secret(&name).await;
                }
            }

            StorageDeviceKey::new(store.storage().clone()).reset()?;
            println!("Device key reset. A new key will be created on next use.");
        }
    }

    Ok(())
}
