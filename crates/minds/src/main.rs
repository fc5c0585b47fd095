//! Minds - command-line client for the Minds platform
//!
//! Main entry point for the Minds CLI.

use anyhow::Result;
use clap::{Parser, Subcommand};

mod commands;

use commands::{ask, datasources, knowledge_bases, minds};

// ─────────────────────────────────────────────────────────────────────────────
// CLI Structure
// ─────────────────────────────────────────────────────────────────────────────

/// Minds - manage datasources, knowledge bases and minds, and ask them questions
#[derive(Parser)]
#[command(name = "minds")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output as JSON (for scripting)
    #[arg(long, global = true)]
    pub json: bool,

    /// API key for the Minds platform
    #[arg(long, global = true, env = "MINDS_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Control-plane URL (default: https://mdb.ai)
    #[arg(long, global = true, env = "MINDS_BASE_URL")]
    pub base_url: Option<String>,

    /// Project that minds live under (default: mindsdb)
    #[arg(long, global = true, env = "MINDS_PROJECT")]
    pub project: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Manage datasources
    Datasources(datasources::DatasourcesArgs),

    /// Manage knowledge bases and ingest content
    Kb(knowledge_bases::KbArgs),

    /// Manage minds and their attachments
    Minds(minds::MindsArgs),

    /// Ask a mind a one-shot question
    Ask(ask::AskArgs),
}

// ─────────────────────────────────────────────────────────────────────────────
// Main
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Console logging on stderr so stdout stays scriptable; RUST_LOG wins
    let default_filter = if cli.verbose {
        "minds=debug,minds_client=debug,info"
    } else {
        "minds=info,minds_client=info,warn"
    };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_filter));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(cli.verbose)
        .with_writer(std::io::stderr)
        .init();

    let ctx = commands::Context {
        api_key: cli.api_key,
        base_url: cli.base_url,
        project: cli.project,
        json_output: cli.json,
        verbose: cli.verbose,
    };

    // Dispatch to command handlers
    match cli.command {
        Commands::Datasources(args) => datasources::run(args, &ctx).await,
        Commands::Kb(args) => knowledge_bases::run(args, &ctx).await,
        Commands::Minds(args) => minds::run(args, &ctx).await,
        Commands::Ask(args) => ask::run(args, &ctx).await,
    }
}
