//! PromptForge CLI entry point.

use clap::Parser;
use promptforge_cli::{init_logging, run, Cli};
use promptforge_core::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Load configuration before logging so its level and format apply
    let config = Config::load_or_default(cli.config.as_deref())?;
    init_logging(cli.verbose, &config.logging);

    // Run the command
    run(cli, config).await
}
