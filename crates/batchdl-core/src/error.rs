//! Error taxonomy for a batch run.
//!
//! `BatchError` aborts the whole run before any item is dispatched.
//! `ItemError` is captured in a single item's outcome and never unwinds the batch.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Failure detected before dispatch; the run produces no report.
#[derive(Debug, Error)]
pub enum BatchError {
    /// Target path exists but is not a directory.
    #[error("target path is not a directory: {}", path.display())]
    InvalidTarget { path: PathBuf },

    /// Target directory exists but the owner-write bit is not set.
    #[error("write permission not set on target path: {}", path.display())]
    PermissionDenied { path: PathBuf },

    /// A URL in the list failed to parse or lacks a scheme or host.
    #[error("malformed url {url:?}: {reason}")]
    MalformedUrl { url: String, reason: String },

    /// Creating the base or run directory failed.
    #[error("failed to create {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Failure of one item; siblings keep running.
#[derive(Debug, Error)]
pub enum ItemError {
    /// No protocol is registered for the URL scheme.
    #[error("protocol unsupported: {scheme}, url: {url}")]
    UnsupportedProtocol { scheme: String, url: String },

    /// The transfer did not complete; partial state was rolled back.
    #[error("download failed for {url}: {cause}")]
    DownloadFailed { url: String, cause: String },

    /// Rolling back a failed transfer itself failed.
    #[error("cleanup of {} failed ({cleanup}) after: {original}", path.display())]
    CleanupFailed {
        path: PathBuf,
        cleanup: io::Error,
        original: Box<ItemError>,
    },

    /// The item's destination directory could not be created.
    #[error("failed to prepare {}: {source}", path.display())]
    Prepare {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// No thread could be started for this item.
    #[error("could not start a task for {url}: {source}")]
    Spawn {
        url: String,
        #[source]
        source: io::Error,
    },

    /// The task driving this item panicked.
    #[error("worker panicked while downloading {url}")]
    Panicked { url: String },
}

impl ItemError {
    /// Short machine-readable label, used in JSON reports.
    pub fn kind(&self) -> &'static str {
        match self {
            ItemError::UnsupportedProtocol { .. } => "unsupported_protocol",
            ItemError::DownloadFailed { .. } => "download_failed",
            ItemError::CleanupFailed { .. } => "cleanup_failed",
            ItemError::Prepare { .. } => "prepare_failed",
            ItemError::Spawn { .. } => "spawn_failed",
            ItemError::Panicked { .. } => "panicked",
        }
    }

    /// The transfer-level failure, looking through a cleanup failure.
    pub fn root(&self) -> &ItemError {
        match self {
            ItemError::CleanupFailed { original, .. } => original.root(),
            other => other,
        }
    }
}
