//! # BankCode CLI
//!
//! Command-line interface for the BankCode API.
//!
//! This CLI provides commands for:
//! - Looking up a bank or listing banks
//! - Looking up a branch or listing the branches of a bank
//! - Querying the API version

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

mod commands;

use anyhow::{Context, Result};
use bankcode_client::{BankCodeClient, ClientConfig, Plan};
use clap::{Parser, Subcommand};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};
use tracing_subscriber::EnvFilter;

use commands::{OutputFormat, Session, bank, branch};

/// bankcode - Japanese bank and branch code lookups
#[derive(Parser)]
#[command(name = "bankcode")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// API key
    #[arg(long, global = true, env = "BANKCODE_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// API endpoint
    #[arg(long, global = true, env = "BANKCODE_ENDPOINT")]
    endpoint: Option<String>,

    /// Subscription plan (free, standard, pro)
    #[arg(long, global = true, env = "BANKCODE_PLAN", default_value = "free")]
    plan: Plan,

    /// Send the API key as a header instead of a query parameter
    #[arg(long, global = true)]
    header_key: bool,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output format
    #[arg(short, long, global = true, value_enum, default_value_t = OutputFormat::Table)]
    output: OutputFormat,

    /// Subcommand to execute
    #[command(subcommand)]
    command: Commands,
}

/// Available CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// Bank lookups
    #[command(subcommand)]
    Bank(BankCommands),

    /// Branch lookups
    #[command(subcommand)]
    Branch(BranchCommands),

    /// Show the API version
    Version,
}

/// Bank subcommands
#[derive(Subcommand)]
pub enum BankCommands {
    /// Look up one bank by code
    Get(bank::GetArgs),

    /// List banks
    List(bank::ListArgs),
}

/// Branch subcommands
#[derive(Subcommand)]
pub enum BranchCommands {
    /// Look up a branch by bank and branch code
    Get(branch::GetArgs),

    /// List the branches of a bank
    List(branch::ListArgs),
}

impl Cli {
    fn client_config(&self) -> ClientConfig {
        let mut builder = ClientConfig::builder()
            .plan(self.plan)
            .key_in_header(self.header_key);
        if let Some(key) = &self.api_key {
            builder = builder.api_key(key);
        }
        if let Some(endpoint) = &self.endpoint {
            builder = builder.base_url(endpoint);
        }
        builder.build()
    }
}

fn setup_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn cancel_on_ctrl_c() -> CancellationToken {
    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                debug!("Interrupt received, cancelling");
                trigger.cancel();
            }
            Err(e) => warn!(error = %e, "Failed to listen for Ctrl+C"),
        }
    });
    cancel
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose);

    let client =
        BankCodeClient::new(cli.client_config()).context("Failed to create BankCode client")?;
    let session = Session {
        client,
        cancel: cancel_on_ctrl_c(),
        output: cli.output,
    };

    match cli.command {
        Commands::Bank(cmd) => match cmd {
            BankCommands::Get(args) => bank::get(&session, args).await?,
            BankCommands::List(args) => bank::list(&session, args).await?,
        },
        Commands::Branch(cmd) => match cmd {
            BranchCommands::Get(args) => branch::get(&session, args).await?,
            BranchCommands::List(args) => branch::list(&session, args).await?,
        },
        Commands::Version => commands::version(&session).await?,
    }

    Ok(())
}
