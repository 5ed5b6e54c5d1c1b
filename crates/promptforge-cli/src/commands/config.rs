//! Configuration management commands.

use std::path::Path;

use clap::Args;
use promptforge_core::paths;
use promptforge_core::Config;

/// Config command arguments.
#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(clap::Subcommand)]
pub enum ConfigCommand {
    /// Show the effective configuration
    Show,

    /// Write the effective configuration to the config file
    Init {
        /// Force overwrite existing config
        #[arg(short, long)]
        force: bool,
    },

    /// Show configuration and storage file paths
    Path,

    /// Validate configuration
    Validate,
}

/// Run the config command.
pub async fn run(
    args: ConfigArgs,
    config: &Config,
    config_path: Option<&Path>,
) -> anyhow::Result<()> {
    let path = match config_path {
        Some(p) => p.to_path_buf(),
        None => paths::config_file()?,
    };

    match args.command {
        ConfigCommand::Show => {
            let json = serde_json::to_string_pretty(config)?;
            println!("{}", json);
        }

        ConfigCommand::Init { force } => {
            if path.exists() && !force {
                anyhow::bail!(
                    "Config file already exists: {:?}. Use --force to overwrite.",
                    path
                );
            }

            config.save(&path)?;
            println!("Created config file: {:?}", path);
        }

        ConfigCommand::Path => {
            println!("config:  {}", path.display());
            println!("storage: {}", config.storage_path()?.display());
        }

        ConfigCommand::Validate => {
            config.validate()?;
            println!("Configuration is valid.");
        }
    }

    Ok(())
}
