//! CLI for transdoc.

mod collab;
mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use transdoc_core::config;
use transdoc_core::model::Endpoint;

use commands::{run_config, run_health, run_progress, run_translate, TranslateArgs};

/// Top-level CLI for transdoc.
#[derive(Debug, Parser)]
#[command(name = "transdoc")]
#[command(about = "transdoc: batch PDF translation through a pdf2zh server", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Translate one or more PDFs, one after another.
    Translate {
        /// PDF files to translate, in order.
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Server operation: translate, crop, crop-compare or compare.
        #[arg(long, default_value = "translate")]
        endpoint: Endpoint,

        /// Where produced files go (default: next to each source PDF).
        #[arg(long, value_name = "DIR")]
        output_dir: Option<PathBuf>,

        /// Do not try to start the server if it is not reachable.
        #[arg(long)]
        no_autostart: bool,
    },

    /// Check that the server is reachable and show its version.
    Health,

    /// Query the progress of a server task once.
    Progress {
        /// Task id returned by the server on submit.
        task_id: String,
    },

    /// Show the config file location and the effective configuration.
    Config,
}

impl CliCommand {
    /// Returns the process exit code.
    pub async fn run_from_args() -> Result<i32> {
        let cli = Cli::parse();
        let cfg = config::load_or_init()?;
        tracing::debug!("loaded config: {:?}", cfg);

        match cli.command {
            CliCommand::Translate {
                files,
                endpoint,
                output_dir,
                no_autostart,
            } => {
                let args = TranslateArgs {
                    files,
                    endpoint,
                    output_dir,
                    autostart: !no_autostart,
                };
                run_translate(&cfg, args).await
            }
            CliCommand::Health => run_health(&cfg).await,
            CliCommand::Progress { task_id } => run_progress(&cfg, &task_id).await,
            CliCommand::Config => run_config(&cfg),
        }
    }
}

#[cfg(test)]
mod tests;
