//! `batchdl download` – run one batch and print the report.

use anyhow::{Context, Result};
use batchdl_core::config::{self, RunConfig};
use batchdl_core::{DownloadRequest, Orchestrator};
use std::path::{Path, PathBuf};

/// Arguments of the `download` subcommand.
#[derive(Debug, Clone)]
pub struct DownloadArgs {
    pub path: PathBuf,
    pub urls: String,
    pub json: bool,
    pub max_concurrent: Option<usize>,
    pub config: Option<PathBuf>,
}

/// Loads config, downloads the batch, prints one line per URL.
///
/// A whole-batch error (bad target, malformed URL) is returned so `main`
/// exits non-zero. Per-item failures only show up in the report.
pub fn run_download(args: DownloadArgs) -> Result<()> {
    let cfg = resolve_config(args.config.as_deref())?;
    let cfg = apply_overrides(cfg, args.max_concurrent);
    tracing::debug!("effective config: {:?}", cfg);

    let orchestrator = Orchestrator::new(cfg);
    let request = DownloadRequest::new(args.path, args.urls);
    let report = orchestrator
        .run(&request)
        .with_context(|| format!("batch into {}", request.target.display()))?;

    if args.json {
        println!("{}", report.to_json()?);
    } else {
        print!("{report}");
        println!("{}", report.summary());
    }
    Ok(())
}

/// Explicit `--config` file, else the XDG config (created on first use).
/// An unusable XDG location falls back to defaults rather than blocking the run.
pub(crate) fn resolve_config(explicit: Option<&Path>) -> Result<RunConfig> {
    match explicit {
        Some(path) => config::load_from_path(path),
        None => Ok(config::load_or_init().unwrap_or_else(|e| {
            tracing::warn!("using default config: {:#}", e);
            RunConfig::default()
        })),
    }
}

/// Flags win over file values.
pub(crate) fn apply_overrides(mut cfg: RunConfig, max_concurrent: Option<usize>) -> RunConfig {
    if max_concurrent.is_some() {
        cfg.max_concurrent = max_concurrent;
    }
    cfg
}
