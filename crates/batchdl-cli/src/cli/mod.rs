//! CLI for the batchdl batch downloader.

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

use commands::{run_completions, run_download, run_version, DownloadArgs};

/// Top-level CLI for batchdl.
#[derive(Debug, Parser)]
#[command(name = "batchdl")]
#[command(about = "batchdl: download a list of URLs concurrently into a timestamped directory", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Download every URL in a comma-separated list.
    Download {
        /// Base directory; a run directory named after the current time is created inside it.
        #[arg(short = 'p', long = "path", value_name = "DIR")]
        path: PathBuf,

        /// Comma-separated list of URLs.
        #[arg(short = 'u', long = "urls", value_name = "URLS")]
        urls: String,

        /// Print the report as JSON instead of text.
        #[arg(long)]
        json: bool,

        /// Run at most N transfers at once (default: one thread per URL).
        #[arg(long, value_name = "N", value_parser = clap::builder::RangedU64ValueParser::<usize>::new().range(1..))]
        max_concurrent: Option<usize>,

        /// Read settings from this file instead of the XDG config.
        #[arg(long, value_name = "FILE")]
        config: Option<PathBuf>,
    },

    /// Print the version.
    Version,

    /// Generate shell completions on stdout.
    Completions {
        /// Target shell.
        #[arg(value_enum)]
        shell: Shell,
    },
}

impl CliCommand {
    pub fn run_from_args() -> Result<()> {
        let cli = Cli::parse();

        match cli.command {
            CliCommand::Download {
                path,
                urls,
                json,
                max_concurrent,
                config,
            } => run_download(DownloadArgs {
                path,
                urls,
                json,
                max_concurrent,
                config,
            })?,
            CliCommand::Version => run_version(),
            CliCommand::Completions { shell } => run_completions(shell),
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests;
