use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Default transfer buffer: bounds memory per in-flight item.
pub const DEFAULT_BUFFER_SIZE: usize = 64 * 1024;

/// Settings for one batch run, loaded from `~/.config/batchdl/config.toml`
/// by the CLI and passed by reference into the orchestrator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    /// Write buffer and curl receive buffer size in bytes.
    pub buffer_size: usize,
    /// Cap on simultaneous transfers. None = one thread per URL (unbounded).
    pub max_concurrent: Option<usize>,
    /// Connect-phase timeout in seconds. None = wait indefinitely.
    pub connect_timeout_secs: Option<u64>,
    /// Follow HTTP redirects.
    pub follow_redirects: bool,
    /// User-Agent header sent with every request.
    pub user_agent: String,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            buffer_size: DEFAULT_BUFFER_SIZE,
            max_concurrent: None,
            connect_timeout_secs: None,
            follow_redirects: true,
            user_agent: format!("batchdl/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("batchdl")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// XDG config, written with defaults on first use.
pub fn load_or_init() -> Result<RunConfig> {
    load_or_init_at(&config_path()?)
}

/// Reads `path`, first writing a default config there if nothing exists yet.
/// An existing file is never overwritten.
pub fn load_or_init_at(path: &Path) -> Result<RunConfig> {
    if !path.exists() {
        write_default(path)?;
        tracing::info!("created default config at {}", path.display());
    }
    load_from_path(path)
}

fn write_default(path: &Path) -> Result<()> {
    let body = toml::to_string_pretty(&RunConfig::default())?;
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).with_context(|| format!("create {}", parent.display()))?;
    }
    fs::write(path, body).with_context(|| format!("write config {}", path.display()))
}

/// Load configuration from an explicit file. Missing keys take defaults.
pub fn load_from_path(path: &Path) -> Result<RunConfig> {
    let data =
        fs::read_to_string(path).with_context(|| format!("read config {}", path.display()))?;
    let cfg: RunConfig =
        toml::from_str(&data).with_context(|| format!("parse config {}", path.display()))?;
    Ok(cfg)
}
