//! CLI command handlers, one file per command.

mod completions;
pub(crate) mod download;
mod version;

pub use completions::run_completions;
pub use download::{run_download, DownloadArgs};
pub use version::run_version;
