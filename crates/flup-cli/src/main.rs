//! flup - Flutter SDK installer CLI

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use flup_cli::cmd;
use flup_cli::{Cli, Commands};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // RUST_LOG wins; --verbose only raises the default
    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let context = cmd::Context::new(&cli);

    match cli.command {
        Commands::Install { request, dry_run } => {
            cmd::install::install(&context, &request, dry_run).await
        }
        Commands::Resolve { request, json } => cmd::resolve::resolve(&context, &request, json).await,
    }
}
