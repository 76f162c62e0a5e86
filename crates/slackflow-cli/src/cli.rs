use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::output::OutputFormat;

#[derive(Parser)]
#[command(name = "slackflow")]
#[command(version, about = "SlackFlow - Slack Socket Mode workflow trigger")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Config file (defaults to ~/.config/slackflow/config.toml)
    #[arg(long, global = true, env = "SLACKFLOW_CONFIG")]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output format
    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Activate the trigger and stream records as JSON lines
    Run(RunArgs),

    /// Validate credentials and filter settings
    Check,

    /// List selectable trigger categories
    Categories,

    /// List channels available for scope selection
    Channels,
}

#[derive(Args, Debug, Default)]
pub struct RunArgs {
    /// Stop after the first forwarded record
    #[arg(long)]
    pub manual: bool,
}
