//! CLI for the resilink integration harness.

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use resilink_core::config;
use resilink_core::dlq::DeadLetterQueue;

use commands::{
    run_clear, run_list, run_remove, run_replay, run_request, run_show, RequestArgs,
};

/// Top-level CLI for resilink.
#[derive(Debug, Parser)]
#[command(name = "resilink")]
#[command(about = "resilink: retries, circuit breaking and dead-lettering for integration calls", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Send one request through a resilient client for an integration.
    Request {
        /// Integration name (selects `[integrations.<name>]` overrides).
        integration: String,
        /// Absolute HTTP/HTTPS URL.
        url: String,
        /// HTTP method.
        #[arg(short = 'X', long = "request", default_value = "GET", value_name = "METHOD")]
        method: String,
        /// Extra header, repeatable.
        #[arg(short = 'H', long = "header", value_name = "NAME: VALUE")]
        headers: Vec<String>,
        /// Request body.
        #[arg(short = 'd', long = "data", value_name = "BODY")]
        data: Option<String>,
    },

    /// Inspect, replay or clear the dead-letter queue.
    Dlq {
        #[command(subcommand)]
        command: DlqCommand,
    },
}

#[derive(Debug, Subcommand)]
pub enum DlqCommand {
    /// List entries, oldest first.
    List {
        /// Only entries for this integration.
        #[arg(long)]
        integration: Option<String>,
    },
    /// Print one entry as JSON.
    Show { id: String },
    /// Delete one entry.
    Remove { id: String },
    /// Delete every entry.
    Clear,
    /// Remove an entry and send its request again.
    Replay { id: String },
}

impl CliCommand {
    pub async fn run_from_args() -> Result<()> {
        let cli = Cli::parse();
        let cfg = config::load_or_init()?;
        tracing::debug!("loaded config: {:?}", cfg);
        let dlq = DeadLetterQueue::from_settings(&cfg.dlq).await?;

        match cli.command {
            CliCommand::Request {
                integration,
                url,
                method,
                headers,
                data,
            } => {
                let args = RequestArgs {
                    integration,
                    url,
                    method,
                    headers,
                    data,
                };
                run_request(&cfg, &dlq, args).await?;
            }
            CliCommand::Dlq { command } => match command {
                DlqCommand::List { integration } => run_list(&dlq, integration.as_deref()).await?,
                DlqCommand::Show { id } => run_show(&dlq, &id).await?,
                DlqCommand::Remove { id } => run_remove(&dlq, &id).await?,
                DlqCommand::Clear => run_clear(&dlq).await?,
                DlqCommand::Replay { id } => run_replay(&cfg, &dlq, &id).await?,
            },
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests;
