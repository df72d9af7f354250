//! Colloquy operator CLI entry point.
//!
//! Binary name: `clq`
//!
//! Parses CLI arguments, loads gateway configuration, then dispatches to
//! the appropriate command handler. The CLI follows a verb-noun pattern
//! (e.g., `clq ask`, `clq kb status`).

mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use colloquy_client::{GatewayClient, load_config};

use commands::{AskArgs, ConversationsArgs, KbAction};

/// Talk to a Colloquy assistant gateway.
#[derive(Parser)]
#[command(name = "clq", version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output machine-readable JSON instead of styled text.
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress all output except errors.
    #[arg(long, global = true)]
    pub quiet: bool,

    /// Detailed output (-v for verbose, -vv for debug/trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to the gateway config file (default: ~/.colloquy/config.toml).
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Send a message to a connector and wait for the full reply.
    Ask(AskArgs),

    /// Send a message and print reply bytes as they arrive.
    Stream(AskArgs),

    /// Knowledge-base lifecycle.
    Kb {
        #[command(subcommand)]
        action: KbAction,
    },

    /// List conversations.
    #[command(alias = "convs")]
    Conversations(ConversationsArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Set up tracing based on verbosity
    let filter = match cli.verbose {
        0 if cli.quiet => "error",
        0 => "warn",
        1 => "info,colloquy_client=debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .with_target(false)
        .init();

    let config_path = match cli.config {
        Some(path) => path,
        None => dirs::home_dir()
            .unwrap_or_default()
            .join(".colloquy/config.toml"),
    };
    let config = load_config(&config_path).await;
    let client = GatewayClient::new(config);

    match cli.command {
        Commands::Ask(args) => commands::ask(&client, args, cli.json).await,

        Commands::Stream(args) => commands::stream(&client, args).await,

        Commands::Kb { action } => match action {
            KbAction::Status { resource } => {
                commands::kb_status(&client, resource.as_deref(), cli.json).await
            }
            KbAction::Setup { resource } => {
                commands::kb_setup(&client, resource.as_deref(), cli.json).await
            }
            KbAction::Teardown { resource } => {
                commands::kb_teardown(&client, resource.as_deref(), cli.json).await
            }
        },

        Commands::Conversations(args) => commands::conversations(&client, args, cli.json).await,
    }
}
