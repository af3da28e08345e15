//! batchdl core: download a comma-separated list of URLs concurrently into a
//! fresh, timestamp-named directory and report each URL's outcome.
//!
//! ```no_run
//! use batchdl_core::{DownloadRequest, Orchestrator, RunConfig};
//!
//! let orchestrator = Orchestrator::new(RunConfig::default());
//! let report = orchestrator
//!     .run(&DownloadRequest::new("/tmp/out", "http://a.test/f1,http://b.test/f2"))
//!     .expect("batch validated");
//! print!("{report}");
//! ```

pub mod config;
pub mod error;
pub mod logging;
pub mod orchestrator;
pub mod protocol;
pub mod report;
pub mod storage;
pub mod url_model;

pub use config::RunConfig;
pub use error::{BatchError, ItemError};
pub use orchestrator::{DownloadItem, DownloadRequest, ItemState, Orchestrator};
pub use protocol::{HttpProtocol, Protocol, ProtocolRegistry};
pub use report::{Outcome, ReportEntry, RunReport};
pub use storage::RunDirectory;
