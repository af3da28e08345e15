//! Relative on-disk path from a URL path.

use super::sanitize::sanitize_segment_for_linux;
use std::path::PathBuf;

/// File name used when the URL path names a directory (empty, `/`, or trailing `/`).
pub const DEFAULT_FILENAME: &str = "index.html";

/// Maps a percent-encoded URL path to a relative path under the host directory.
///
/// Segments are percent-decoded and sanitized. `.` and empty segments are
/// dropped; `..` removes the previous segment but is clamped at the root, so
/// the result never leaves the host directory.
pub fn relative_path_from_url_path(url_path: &str) -> PathBuf {
    let mut segments: Vec<String> = Vec::new();
    for raw in url_path.split('/') {
        let decoded = urlencoding::decode(raw)
            .map(|s| s.into_owned())
            .unwrap_or_else(|_| raw.to_string());
        match decoded.as_str() {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            _ => segments.push(sanitize_segment_for_linux(&decoded)),
        }
    }

    let names_directory = url_path.is_empty()
        || url_path.ends_with('/')
        || url_path.ends_with("/.")
        || url_path.ends_with("/..");
    if names_directory || segments.is_empty() {
        segments.push(DEFAULT_FILENAME.to_string());
    }
    segments.iter().collect()
}
