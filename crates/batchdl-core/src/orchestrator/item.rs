//! One URL's unit of work and its state machine.

use crate::error::ItemError;
use crate::storage::RunDirectory;
use crate::url_model::{relative_path_from_url_path, ParsedSource};
use std::path::{Path, PathBuf};

/// Lifecycle of an item: `Pending → Dispatched → {Succeeded | Failed}`.
#[derive(Debug)]
pub enum ItemState {
    Pending,
    Dispatched,
    Succeeded,
    Failed(ItemError),
}

impl ItemState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, ItemState::Succeeded | ItemState::Failed(_))
    }
}

/// A validated URL planned against a run directory.
///
/// Paths are derived from the parsed source and never set directly. Only the
/// task holding `&mut DownloadItem` advances its state.
#[derive(Debug)]
pub struct DownloadItem {
    source: String,
    scheme: String,
    source_path: String,
    destination_root: PathBuf,
    relative_path: PathBuf,
    state: ItemState,
}

impl DownloadItem {
    /// Plans `source` under `run`: `<run>/<host>/<url path>`.
    pub fn new(source: String, parsed: ParsedSource, run: &RunDirectory) -> Self {
        let relative_path = relative_path_from_url_path(&parsed.path);
        DownloadItem {
            destination_root: run.host_root(&parsed.host),
            source,
            scheme: parsed.scheme,
            source_path: parsed.path,
            relative_path,
            state: ItemState::Pending,
        }
    }

    /// Original URL string as given in the list.
    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn scheme(&self) -> &str {
        &self.scheme
    }

    /// Path component of the URL, still percent-encoded.
    pub fn source_path(&self) -> &str {
        &self.source_path
    }

    /// Run directory joined with the host segment.
    pub fn destination_root(&self) -> &Path {
        &self.destination_root
    }

    /// Final on-disk location of the downloaded file.
    pub fn absolute_file_path(&self) -> PathBuf {
        self.destination_root.join(&self.relative_path)
    }

    /// Directory holding `absolute_file_path`, created before the write.
    pub fn absolute_dir_path(&self) -> PathBuf {
        let file = self.absolute_file_path();
        file.parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| self.destination_root.clone())
    }

    pub fn state(&self) -> &ItemState {
        &self.state
    }

    /// Marks the item as owned by a running task.
    pub(crate) fn mark_dispatched(&mut self) {
        debug_assert!(matches!(self.state, ItemState::Pending));
        self.state = ItemState::Dispatched;
    }

    /// Records the terminal outcome. Called once per item.
    pub(crate) fn finish(&mut self, result: Result<(), ItemError>) {
        debug_assert!(!self.state.is_terminal(), "outcome already recorded");
        self.state = match result {
            Ok(()) => ItemState::Succeeded,
            Err(e) => ItemState::Failed(e),
        };
    }

    /// Fails an item whose task never reached `finish` (spawn failure or panic).
    /// No-op if an outcome was already recorded.
    pub(crate) fn fail_unfinished(&mut self, error: ItemError) {
        if !self.state.is_terminal() {
            self.state = ItemState::Failed(error);
        }
    }
}
