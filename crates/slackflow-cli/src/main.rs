mod cli;
mod commands;
mod config;
mod error;
mod output;

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Commands};
use config::CliConfig;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(err) = run(cli).await {
        error::handle_error(err);
    }
}

/// Logs go to stderr; stdout is reserved for records and command output.
fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_level(true)
        .init();
}

async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Categories => commands::categories::run(cli.format),
        Commands::Check => {
            let config = CliConfig::load(cli.config.as_deref())?;
            commands::check::run(&config, cli.format)
        }
        Commands::Channels => {
            let config = CliConfig::load(cli.config.as_deref())?;
            commands::channels::run(&config, cli.format).await
        }
        Commands::Run(args) => {
            let config = CliConfig::load(cli.config.as_deref())?;
            commands::run::run(&config, args).await
        }
    }
}
