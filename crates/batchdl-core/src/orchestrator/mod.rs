//! Batch download orchestrator.
//!
//! Allocates the run directory, validates the whole URL list before any
//! transfer starts, fans out one task per item, joins them all, and builds
//! the report. Individual item failures never abort the batch.

mod dispatch;
mod item;

pub use item::{DownloadItem, ItemState};

use crate::config::RunConfig;
use crate::error::BatchError;
use crate::protocol::ProtocolRegistry;
use crate::report::RunReport;
use crate::storage::RunDirectory;
use crate::url_model::parse_url_list;
use chrono::{DateTime, Local};
use std::path::PathBuf;
use std::time::Instant;

/// The two inputs of a run.
#[derive(Debug, Clone)]
pub struct DownloadRequest {
    /// Base directory; created if missing.
    pub target: PathBuf,
    /// Comma-separated URL list.
    pub urls: String,
}

impl DownloadRequest {
    pub fn new(target: impl Into<PathBuf>, urls: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            urls: urls.into(),
        }
    }
}

/// Runs batches against a fixed config and protocol registry.
pub struct Orchestrator {
    config: RunConfig,
    registry: ProtocolRegistry,
    clock: fn() -> DateTime<Local>,
}

impl Orchestrator {
    /// Orchestrator with the default `http`/`https` protocols.
    pub fn new(config: RunConfig) -> Self {
        let registry = ProtocolRegistry::with_defaults(&config);
        Self::with_registry(config, registry)
    }

    pub fn with_registry(config: RunConfig, registry: ProtocolRegistry) -> Self {
        Self {
            config,
            registry,
            clock: Local::now,
        }
    }

    /// Replaces the clock used to name run directories.
    pub fn with_clock(mut self, clock: fn() -> DateTime<Local>) -> Self {
        self.clock = clock;
        self
    }

    pub fn config(&self) -> &RunConfig {
        &self.config
    }

    pub fn registry(&self) -> &ProtocolRegistry {
        &self.registry
    }

    /// Downloads every URL in `request` into a fresh run directory.
    ///
    /// Returns `Err` only for whole-batch failures (bad target, malformed URL),
    /// in which case no transfer was started. Per-item failures are in the report.
    pub fn run(&self, request: &DownloadRequest) -> Result<RunReport, BatchError> {
        let started = Instant::now();
        tracing::info!(target_dir = %request.target.display(), "starting batch");

        let run = RunDirectory::allocate_at(&request.target, (self.clock)())?;

        let mut items = match plan_items(&request.urls, &run) {
            Ok(items) => items,
            Err(e) => {
                tracing::warn!("aborting batch before dispatch: {}", e);
                run.deallocate();
                return Err(e);
            }
        };

        tracing::info!(items = items.len(), run_dir = %run.path().display(), "dispatching");
        dispatch::dispatch(&mut items, &self.registry, self.config.max_concurrent);

        let report = RunReport::from_items(run.path(), &items);
        tracing::info!(
            succeeded = report.succeeded(),
            failed = report.failed(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "batch finished"
        );
        Ok(report)
    }
}

/// Validates the whole list and plans one item per entry, in input order.
pub fn plan_items(urls: &str, run: &RunDirectory) -> Result<Vec<DownloadItem>, BatchError> {
    Ok(parse_url_list(urls)?
        .into_iter()
        .map(|(source, parsed)| DownloadItem::new(source, parsed, run))
        .collect())
}
