//! PromptForge command-line interface.

pub mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use promptforge_core::config::LoggingConfig;
use promptforge_core::Config;
use tracing::debug;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// PromptForge - local prompt workbench secrets
#[derive(Parser)]
#[command(name = "promptforge")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Increase logging verbosity
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Path to config file
    #[arg(short, long, env = "PROMPTFORGE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Path to the storage namespace file (overrides config)
    #[arg(long)]
    pub storage: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand)]
pub enum Commands {
    /// Manage encrypted secrets
    Secrets(commands::secrets::SecretsArgs),

    /// Inspect or reset the device key
    DeviceKey(commands::device_key::DeviceKeyArgs),

    /// Manage the chat-completion API settings
    Api(commands::api::ApiArgs),

    /// Configuration management
    Config(commands::config::ConfigArgs),

    /// Run diagnostics
    Doctor,

    /// Show version information
    Version,
}

/// Install the global tracing subscriber.
///
/// `RUST_LOG` wins when set. Otherwise the level comes from config, raised
/// to debug by `-v` and trace by `-vv`. Output goes to stderr so command
/// output on stdout stays scriptable.
pub fn init_logging(verbose: u8, logging: &LoggingConfig) {
    let level = match verbose {
        0 => logging.level.as_str(),
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| format!("promptforge={level}").into());

    let registry = tracing_subscriber::registry().with(filter);
    if logging.json {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr),
            )
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

/// Run the CLI with the given arguments.
pub async fn run(cli: Cli, mut config: Config) -> anyhow::Result<()> {
    if let Some(storage) = cli.storage {
        config.storage.path = Some(storage);
    }
    debug!(storage = ?config.storage.path, "resolved configuration");

    match cli.command {
        Commands::Secrets(args) => commands::secrets::run(args, &config).await,
        Commands::DeviceKey(args) => commands::device_key::run(args, &config).await,
        Commands::Api(args) => commands::api::run(args, &config).await,
        Commands::Config(args) => commands::config::run(args, &config, cli.config.as_deref()).await,
        Commands::Doctor => commands::doctor::run(&config).await,
        Commands::Version => {
            println!("promptforge {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}
