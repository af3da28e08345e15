//! HTTP/HTTPS fetch over a blocking libcurl Easy handle.
//!
//! The body is streamed through a fixed-size buffer into the destination
//! file. Any failure after the file is created rolls back the file and its
//! (empty) parent directory.

use super::Protocol;
use crate::config::RunConfig;
use crate::error::ItemError;
use crate::orchestrator::DownloadItem;
use crate::storage::{remove_partial, FileSink};
use std::cell::Cell;
use std::io;
use std::path::Path;
use std::time::Duration;

const MAX_REDIRECTIONS: u32 = 10;

/// GET-based protocol for `http` and `https`.
#[derive(Debug, Clone)]
pub struct HttpProtocol {
    buffer_size: usize,
    connect_timeout: Option<Duration>,
    follow_redirects: bool,
    user_agent: String,
}

impl HttpProtocol {
    pub fn new(config: &RunConfig) -> Self {
        Self {
            buffer_size: config.buffer_size.max(1),
            connect_timeout: config.connect_timeout_secs.map(Duration::from_secs),
            follow_redirects: config.follow_redirects,
            user_agent: config.user_agent.clone(),
        }
    }

    /// Runs the GET and streams a 2xx body into `sink`. Returns bytes written
    /// or the failure cause.
    fn transfer(&self, url: &str, mut sink: FileSink) -> Result<u64, String> {
        let status = Cell::new(0u32);
        let mut write_error: Option<io::Error> = None;

        let mut easy = curl::easy::Easy::new();
        self.configure(&mut easy, url)
            .map_err(|e| format!("request setup: {e}"))?;

        let performed = {
            let mut transfer = easy.transfer();
            let setup = transfer
                .header_function(|line| {
                    if let Some(code) = parse_status_line(line) {
                        status.set(code);
                    }
                    true
                })
                .and_then(|()| {
                    transfer.write_function(|data| {
                        if !is_success(status.get()) {
                            // Error body: drain it without touching the file.
                            return Ok(data.len());
                        }
                        match sink.write_chunk(data) {
                            Ok(()) => Ok(data.len()),
                            Err(e) => {
                                tracing::warn!(url, "write failed: {}", e);
                                write_error = Some(e);
                                Ok(0) // abort transfer
                            }
                        }
                    })
                });
            setup.and_then(|()| transfer.perform())
        };

        if let Some(e) = write_error {
            return Err(format!("possible write failure: {e}"));
        }
        if let Err(e) = performed {
            return Err(e.to_string());
        }
        let code = easy
            .response_code()
            .map_err(|e| format!("no response code: {e}"))?;
        if !is_success(code) {
            return Err(format!("HTTP {code}"));
        }
        sink.finish()
            .map_err(|e| format!("possible write failure: {e}"))
    }

    fn configure(&self, easy: &mut curl::easy::Easy, url: &str) -> Result<(), curl::Error> {
        easy.url(url)?;
        easy.get(true)?;
        easy.useragent(&self.user_agent)?;
        easy.buffer_size(self.buffer_size)?;
        if self.follow_redirects {
            easy.follow_location(true)?;
            easy.max_redirections(MAX_REDIRECTIONS)?;
        }
        if let Some(timeout) = self.connect_timeout {
            easy.connect_timeout(timeout)?;
        }
        Ok(())
    }
}

impl Protocol for HttpProtocol {
    fn fetch(&self, item: &DownloadItem) -> Result<(), ItemError> {
        let file_path = item.absolute_file_path();
        let sink = FileSink::create(&file_path, self.buffer_size).map_err(|source| {
            ItemError::Prepare {
                path: file_path.clone(),
                source,
            }
        })?;

        match self.transfer(item.source(), sink) {
            Ok(bytes) => {
                tracing::debug!(url = item.source(), bytes, path = %file_path.display(), "fetched");
                Ok(())
            }
            Err(cause) => Err(rollback(
                &file_path,
                ItemError::DownloadFailed {
                    url: item.source().to_string(),
                    cause,
                },
            )),
        }
    }
}

/// Removes the partial file; a removal failure wraps, never replaces, `original`.
fn rollback(file_path: &Path, original: ItemError) -> ItemError {
    match remove_partial(file_path) {
        Ok(()) => original,
        Err(cleanup) => {
            tracing::error!(path = %file_path.display(), "cleanup failed: {}", cleanup);
            ItemError::CleanupFailed {
                path: file_path.to_path_buf(),
                cleanup,
                original: Box::new(original),
            }
        }
    }
}

fn is_success(code: u32) -> bool {
    (200..300).contains(&code)
}

/// Status code from an `HTTP/x.y NNN reason` header line; None for other lines.
fn parse_status_line(line: &[u8]) -> Option<u32> {
    let line = std::str::from_utf8(line).ok()?;
    let mut parts = line.split_whitespace();
    if !parts.next()?.starts_with("HTTP/") {
        return None;
    }
    parts.next()?.parse().ok()
}
