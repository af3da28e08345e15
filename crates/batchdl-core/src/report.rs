//! Per-item outcome summary, rendered after every task has finished.

use crate::orchestrator::{DownloadItem, ItemState};
use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};

/// Terminal result of one item as shown to the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum Outcome {
    Succeeded,
    Failed { kind: String, reason: String },
}

impl Outcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Succeeded)
    }
}

/// One line of the report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportEntry {
    pub source: String,
    pub destination: PathBuf,
    pub outcome: Outcome,
}

/// Outcomes for a whole run, in input order.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    run_dir: PathBuf,
    entries: Vec<ReportEntry>,
}

impl RunReport {
    /// Builds the report from joined items. Items are expected to be terminal.
    pub fn from_items(run_dir: &Path, items: &[DownloadItem]) -> Self {
        let entries = items
            .iter()
            .map(|item| ReportEntry {
                source: item.source().to_string(),
                destination: item.absolute_file_path(),
                outcome: match item.state() {
                    ItemState::Succeeded => Outcome::Succeeded,
                    ItemState::Failed(e) => Outcome::Failed {
                        kind: e.kind().to_string(),
                        reason: e.to_string(),
                    },
                    ItemState::Pending | ItemState::Dispatched => Outcome::Failed {
                        kind: "incomplete".to_string(),
                        reason: "task did not complete".to_string(),
                    },
                },
            })
            .collect();
        RunReport {
            run_dir: run_dir.to_path_buf(),
            entries,
        }
    }

    pub fn run_dir(&self) -> &Path {
        &self.run_dir
    }

    pub fn entries(&self) -> &[ReportEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn succeeded(&self) -> usize {
        self.entries.iter().filter(|e| e.outcome.is_success()).count()
    }

    pub fn failed(&self) -> usize {
        self.len() - self.succeeded()
    }

    pub fn all_succeeded(&self) -> bool {
        self.failed() == 0
    }

    /// One-line totals, printed after the per-item lines.
    pub fn summary(&self) -> String {
        format!(
            "{} item(s): {} succeeded, {} failed; run directory {}",
            self.len(),
            self.succeeded(),
            self.failed(),
            self.run_dir.display()
        )
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

/// One line per item: `STATUS  source -> destination [(reason)]`.
impl fmt::Display for RunReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for entry in &self.entries {
            match &entry.outcome {
                Outcome::Succeeded => writeln!(
                    f,
                    "{:<7} {} -> {}",
                    "OK",
                    entry.source,
                    entry.destination.display()
                )?,
                Outcome::Failed { reason, .. } => writeln!(
                    f,
                    "{:<7} {} -> {} ({})",
                    "FAILED",
                    entry.source,
                    entry.destination.display(),
                    reason
                )?,
            }
        }
        Ok(())
    }
}
