//! Logging setup for the CLI.
//!
//! Events go to `$XDG_STATE_HOME/batchdl/batchdl.log`. When that file can't
//! be opened the subscriber writes to stderr instead, so a download never
//! fails because of logging.

use anyhow::{Context, Result};
use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

/// Used when `RUST_LOG` is unset or unparsable.
pub const DEFAULT_FILTER: &str = "info,batchdl=debug,batchdl_core=debug";

/// Where log events ended up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogDestination {
    File(PathBuf),
    Stderr,
}

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// `~/.local/state/batchdl/batchdl.log` unless XDG variables say otherwise.
pub fn log_file_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("batchdl")?;
    Ok(xdg_dirs.get_state_home().join("batchdl.log"))
}

/// Opens `path` for appending, creating parent directories.
pub fn open_log_file(path: &Path) -> Result<File> {
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir).with_context(|| format!("create log dir {}", dir.display()))?;
    }
    fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("open log file {}", path.display()))
}

/// Installs the global subscriber and reports where it writes.
///
/// Calling it again (or after another subscriber was set) is a no-op apart
/// from the returned destination.
pub fn init() -> LogDestination {
    let opened = log_file_path().and_then(|path| open_log_file(&path).map(|f| (path, f)));
    match opened {
        Ok((path, file)) => {
            let _ = tracing_subscriber::fmt()
                .with_env_filter(env_filter())
                .with_writer(Mutex::new(file))
                .with_ansi(false)
                .with_thread_names(true)
                .try_init();
            tracing::info!("batchdl {} logging to {}", env!("CARGO_PKG_VERSION"), path.display());
            LogDestination::File(path)
        }
        Err(e) => {
            let _ = tracing_subscriber::fmt()
                .with_env_filter(env_filter())
                .with_writer(io::stderr)
                .with_ansi(false)
                .try_init();
            tracing::warn!("log file unavailable, logging to stderr: {:#}", e);
            LogDestination::Stderr
        }
    }
}
