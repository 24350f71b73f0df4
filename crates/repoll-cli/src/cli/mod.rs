//! CLI for the repoll scheduler.

mod commands;
mod pause_file;
mod request;

use anyhow::Result;
use clap::{Parser, Subcommand};
use clap_complete::Shell;
use repoll_core::config::{self, PollConfig};
use repoll_core::BackoffStrategy;
use std::path::{Path, PathBuf};

use commands::{run_check, run_completions, run_man, run_poll};

/// Top-level CLI for repoll.
#[derive(Debug, Parser)]
#[command(name = "repoll")]
#[command(about = "repoll: run a command on an interval with resilient retries", long_about = None)]
pub struct Cli {
    /// Config file to use instead of ~/.config/repoll/config.toml.
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Run a command repeatedly, printing its output after each success.
    Run {
        /// Milliseconds to wait after a success before the next run.
        #[arg(long, value_name = "MS")]
        interval: Option<u64>,
        /// Consecutive failures tolerated before giving up.
        #[arg(long, value_name = "N")]
        attempts: Option<u32>,
        /// Backoff strategy: exponential, random or consecutive.
        #[arg(long, value_name = "NAME")]
        strategy: Option<BackoffStrategy>,
        /// Keep polling while the host is paused.
        #[arg(long)]
        background: bool,
        /// Suspend while paused even if the config enables background polling.
        #[arg(long, conflicts_with = "background")]
        no_background: bool,
        /// Suspend polling while this file exists.
        #[arg(long, value_name = "PATH")]
        pause_file: Option<PathBuf>,
        /// Stop after N successful runs.
        #[arg(long, value_name = "N")]
        count: Option<u64>,
        /// Command and arguments to run.
        #[arg(required = true, trailing_var_arg = true, allow_hyphen_values = true)]
        command: Vec<String>,
    },

    /// Validate the config and print the retry schedule.
    Check,

    /// Print shell completions.
    Completions {
        /// Target shell.
        shell: Shell,
    },

    /// Print the man page.
    Man,
}

impl CliCommand {
    pub async fn run_from_args() -> Result<()> {
        let cli = Cli::parse();

        match cli.command {
            CliCommand::Run {
                interval,
                attempts,
                strategy,
                background,
                no_background,
                pause_file,
                count,
                command,
            } => {
                let mut cfg = load_config(cli.config.as_deref())?;
                if let Some(ms) = interval {
                    cfg.interval_ms = ms;
                }
                if let Some(n) = attempts {
                    cfg.attempts = n;
                }
                if let Some(s) = strategy {
                    cfg.backoff_strategy = s;
                }
                apply_background(&mut cfg, background, no_background);
                tracing::debug!("effective config: {:?}", cfg);
                run_poll(&cfg, &command, pause_file, count).await?;
            }
            CliCommand::Check => {
                let cfg = load_config(cli.config.as_deref())?;
                run_check(&cfg)?;
            }
            CliCommand::Completions { shell } => run_completions(shell),
            CliCommand::Man => run_man()?,
        }

        Ok(())
    }
}

/// `--background` / `--no-background` override the config file; neither keeps it.
fn apply_background(cfg: &mut PollConfig, background: bool, no_background: bool) {
    if background {
        cfg.background_polling = true;
    } else if no_background {
        cfg.background_polling = false;
    }
}

fn load_config(path: Option<&Path>) -> Result<PollConfig> {
    match path {
        Some(p) => config::load_from_path(p),
        None => config::load_or_init(),
    }
}

#[cfg(test)]
mod tests;
