//! URL list splitting, validation, and on-disk path derivation.
//!
//! A batch is accepted only if every entry parses as an absolute URL with a
//! non-empty scheme and host. Path derivation maps the URL path to a relative
//! path under the host directory that can never escape it.

mod path;
mod sanitize;

pub use path::relative_path_from_url_path;
pub use sanitize::sanitize_segment_for_linux;

use crate::error::BatchError;

/// Separator between entries of the URL list. No escaping, no trimming.
pub const URL_LIST_SEPARATOR: char = ',';

/// Splits the delimited URL list into entries, in input order.
///
/// Whitespace is kept as-is and empty entries are preserved, so a stray
/// trailing comma surfaces as a malformed (empty) URL during validation.
pub fn split_url_list(list: &str) -> Vec<String> {
    list.split(URL_LIST_SEPARATOR).map(str::to_string).collect()
}

/// The parts of a validated source URL needed to plan a download.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedSource {
    /// Lowercased scheme, e.g. `http`.
    pub scheme: String,
    /// Host, with `:port` appended when the URL names a port explicitly.
    pub host: String,
    /// Percent-encoded path component (`/` for an empty path).
    pub path: String,
}

impl ParsedSource {
    /// Parses one list entry, rejecting anything without a scheme and host.
    pub fn parse(entry: &str) -> Result<Self, BatchError> {
        let malformed = |reason: String| BatchError::MalformedUrl {
            url: entry.to_string(),
            reason,
        };
        if entry.trim() != entry {
            return Err(malformed("surrounding whitespace".to_string()));
        }
        let parsed = url::Url::parse(entry).map_err(|e| malformed(e.to_string()))?;
        if parsed.scheme().is_empty() {
            return Err(malformed("missing scheme".to_string()));
        }
        let host = match parsed.host_str() {
            Some(h) if !h.is_empty() => h,
            _ => return Err(malformed("missing host".to_string())),
        };
        let host = match parsed.port() {
            Some(port) => format!("{host}:{port}"),
            None => host.to_string(),
        };
        Ok(ParsedSource {
            scheme: parsed.scheme().to_string(),
            host,
            path: parsed.path().to_string(),
        })
    }
}

/// Validates every entry of the list; the first malformed entry fails the batch.
pub fn parse_url_list(list: &str) -> Result<Vec<(String, ParsedSource)>, BatchError> {
    split_url_list(list)
        .into_iter()
        .map(|entry| ParsedSource::parse(&entry).map(|parsed| (entry, parsed)))
        .collect()
}
