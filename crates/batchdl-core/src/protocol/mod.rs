//! Pluggable transfer protocols, looked up by URL scheme.
//!
//! Adding a protocol means implementing `Protocol` and registering it; the
//! orchestrator never matches on scheme strings itself.

mod http;

pub use http::HttpProtocol;

use crate::config::RunConfig;
use crate::error::ItemError;
use crate::orchestrator::DownloadItem;
use std::collections::HashMap;
use std::sync::Arc;

/// Capability: fetch `item.source()` to `item.absolute_file_path()`.
///
/// Implementations own rollback of anything they wrote on failure. Called
/// from a dedicated thread; blocking I/O is expected.
pub trait Protocol: Send + Sync {
    fn fetch(&self, item: &DownloadItem) -> Result<(), ItemError>;
}

/// Scheme → protocol table, populated once at startup.
#[derive(Clone, Default)]
pub struct ProtocolRegistry {
    protocols: HashMap<String, Arc<dyn Protocol>>,
}

impl ProtocolRegistry {
    /// Empty registry: every scheme is unsupported.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with `http` and `https` served by `HttpProtocol`.
    pub fn with_defaults(config: &RunConfig) -> Self {
        let http: Arc<dyn Protocol> = Arc::new(HttpProtocol::new(config));
        let mut registry = Self::new();
        registry.register("http", Arc::clone(&http));
        registry.register("https", http);
        registry
    }

    /// Registers (or replaces) the protocol for `scheme`. Schemes are case-insensitive.
    pub fn register(&mut self, scheme: &str, protocol: Arc<dyn Protocol>) {
        self.protocols.insert(scheme.to_ascii_lowercase(), protocol);
    }

    pub fn get(&self, scheme: &str) -> Option<&Arc<dyn Protocol>> {
        self.protocols.get(&scheme.to_ascii_lowercase())
    }

    /// Registered schemes, sorted.
    pub fn schemes(&self) -> Vec<&str> {
        let mut s: Vec<&str> = self.protocols.keys().map(String::as_str).collect();
        s.sort_unstable();
        s
    }
}

impl std::fmt::Debug for ProtocolRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProtocolRegistry")
            .field("schemes", &self.schemes())
            .finish()
    }
}
