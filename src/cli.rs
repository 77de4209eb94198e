///
/// This module implements the CLI interface for verilog-mirror: command
/// parsing, the async entrypoint, and user-visible output.
///
/// All pipeline logic lives in the [`verilog-mirror-core`] crate. This module
/// only loads configuration, builds the GitHub transport and reports results.
///
/// ## How To Use
/// - For command-line users: run the `verilog-mirror` binary with `--help`.
/// - For programmatic/integration use: call [`run`] with a constructed [`Cli`].
///
/// [`verilog-mirror-core`]: ../../verilog-mirror-core/
use crate::github::GitHubClient;
use crate::load_config::load_config;
use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use verilog_mirror_core::model::RepoId;
use verilog_mirror_core::synchronise::synchronise;

/// CLI for verilog-mirror: mirror Verilog sources between GitHub repositories.
#[derive(Parser)]
#[clap(
    name = "verilog-mirror",
    version,
    about = "Crawl GitHub repositories for Verilog files and mirror them into a destination repository"
)]
pub struct Cli {
    #[clap(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Mirror all source repositories into the configured destination
    Sync {
        /// Path to the YAML config file
        #[clap(long)]
        config: PathBuf,

        /// Source repository (owner/name); repeatable. Overrides configured
        /// repositories and search discovery.
        #[clap(long = "repo")]
        repos: Vec<RepoId>,
    },
}

/// Extracted async CLI logic entrypoint for integration tests and main()
pub async fn run(cli: Cli) -> Result<()> {
    tracing::info!("trace_initialised");

    match cli.command {
        Commands::Sync { config, repos } => {
            let mut config = load_config(config)?;
            if !repos.is_empty() {
                tracing::info!(count = repos.len(), "Using repositories from command line");
                config.repositories = repos;
            }
            tracing::info!(command = "sync", "Starting mirror");

            let transport = GitHubClient::new_from_env()
                .map_err(|e| anyhow::anyhow!("Failed to build GitHub client: {e}"))?;
            println!("Mirror starting...");
            let report = synchronise(&transport, &config)
                .await
                .map_err(|e| anyhow::anyhow!("Invalid configuration: {e}"))?;

            println!("Mirror complete.\nReport: {report}");
            for path in &report.failed_paths {
                println!("  failed: {path}");
            }

            if report.is_clean() {
                tracing::info!(command = "sync", %report, "Mirror complete");
                Ok(())
            } else {
                tracing::error!(command = "sync", failures = report.failures(), "Mirror completed with failures");
                Err(anyhow::anyhow!(
                    "{} of {} files failed to mirror",
                    report.failures(),
                    report.files()
                ))
            }
        }
    }
}
