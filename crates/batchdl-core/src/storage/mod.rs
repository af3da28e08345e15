//! Destination directories and file lifecycle.
//!
//! Validates or creates the base directory, allocates the timestamp-keyed run
//! directory, and provides the per-item file sink with rollback on failure.

mod dirs;
mod writer;

pub use dirs::{create_owner_dir_all, owner_writable};
pub use writer::{remove_partial, FileSink};

use crate::error::BatchError;
use chrono::{DateTime, Local};
use std::io;
use std::path::{Path, PathBuf};

/// Run subdirectory name format: second resolution, local time.
pub const RUN_DIR_FORMAT: &str = "%Y-%m-%d-%H-%M-%S";

/// The destination root for one invocation: `<base>/<timestamp>`.
#[derive(Debug, Clone)]
pub struct RunDirectory {
    base: PathBuf,
    path: PathBuf,
}

impl RunDirectory {
    /// Validates `base` and creates a run directory named after the current local time.
    pub fn allocate(base: &Path) -> Result<Self, BatchError> {
        Self::allocate_at(base, Local::now())
    }

    /// Like `allocate` but with an explicit timestamp.
    ///
    /// Two runs at the same second share a directory; nothing here prevents it.
    pub fn allocate_at(base: &Path, when: DateTime<Local>) -> Result<Self, BatchError> {
        match std::fs::metadata(base) {
            Ok(meta) => {
                if !meta.is_dir() {
                    return Err(BatchError::InvalidTarget {
                        path: base.to_path_buf(),
                    });
                }
                if !owner_writable(&meta) {
                    return Err(BatchError::PermissionDenied {
                        path: base.to_path_buf(),
                    });
                }
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                create_owner_dir_all(base).map_err(|source| BatchError::Io {
                    path: base.to_path_buf(),
                    source,
                })?;
                tracing::debug!(path = %base.display(), "created base directory");
            }
            Err(source) => {
                return Err(BatchError::Io {
                    path: base.to_path_buf(),
                    source,
                })
            }
        }

        let path = base.join(when.format(RUN_DIR_FORMAT).to_string());
        create_owner_dir_all(&path).map_err(|source| BatchError::Io {
            path: path.clone(),
            source,
        })?;
        tracing::info!(run_dir = %path.display(), "allocated run directory");
        Ok(RunDirectory {
            base: base.to_path_buf(),
            path,
        })
    }

    /// Best-effort removal after a whole-batch validation failure.
    ///
    /// Non-recursive: a directory already holding files (e.g. shared with a run
    /// started in the same second) is left alone.
    pub fn deallocate(self) {
        if let Err(e) = std::fs::remove_dir(&self.path) {
            tracing::warn!(run_dir = %self.path.display(), "could not remove run directory: {}", e);
        } else {
            tracing::debug!(run_dir = %self.path.display(), "removed run directory");
        }
    }

    /// User-supplied base path.
    pub fn base(&self) -> &Path {
        &self.base
    }

    /// Full path of the run directory.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Destination root for items from `host`.
    pub fn host_root(&self, host: &str) -> PathBuf {
        self.path.join(host)
    }
}
