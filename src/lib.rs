//! Space snapshot automation.
//!
//! Creates snapshots for every horizon, instance and collection on a Space
//! account, and downloads the latest complete snapshot of each to disk,
//! optionally unpacking the archive.
//!
//! # Quick Start
//!
//! ```no_run
//! use space_snapshots::{run, Action, Options, SpaceClient, ZipExtractor};
//!
//! #[tokio::main]
//! async fn main() -> space_snapshots::Result<()> {
//!     // Create client from environment variables
//!     let client = SpaceClient::from_env()?;
//!
//!     // Download every scope into ./exports and unpack the archives
//!     let report = run(&client, Action::Download, None, &Options::default(), &ZipExtractor).await?;
//!     println!("Wrote {} bytes", report.total_bytes());
//!
//!     Ok(())
//! }
//! ```
//!
//! # Architecture
//!
//! - [`SpaceClient`] - JSON calls with `Retry-After` handling on HTTP 429
//! - [`SnapshotPipeline`] - list, create and download for one [`Scope`]
//! - [`run`] - drives the pipelines for the selected scopes in order
//!
//! Scopes differ only in data: their path segment, whether the list
//! response nests items under the scope name, and which item field names
//! the downloaded files.
//!
//! # Configuration
//!
//! The client reads configuration from environment variables:
//!
//! - `SPACE_ACCESS_TOKEN` - Your Space access token (`DETA_ACCESS_TOKEN` is read as a fallback)
//! - `SPACE_API_URL` (optional) - Base URL (defaults to `https://deta.space/api/v0`)

pub mod cli;
mod client;
mod error;
mod extract;
mod models;
mod options;
pub mod output;
mod pipeline;
mod report;
mod retry;
mod runner;
mod sanitize;
mod scope;

// Re-export core types
pub use client::{SpaceClient, API_URL_ENV, DEFAULT_REQUEST_TIMEOUT, LEGACY_TOKEN_ENV, TOKEN_ENV};
pub use error::{Result, SnapshotError};
pub use extract::{Extractor, ZipExtractor};
pub use options::{Options, DEFAULT_CREATE_DELAY, DEFAULT_OUTPUT_DIR};
pub use pipeline::{SnapshotPipeline, ITEMS_PER_PAGE, SNAPSHOTS_PER_PAGE};
pub use retry::{RetryPolicy, DEFAULT_MAX_RETRIES};
pub use runner::{run, run_named, Action};
pub use sanitize::clean_name;
pub use scope::{DisplayField, Scope};

// Re-export models
pub use models::{Item, Snapshot, SnapshotList, STATUS_COMPLETE};
pub use report::{CreateOutcome, DownloadOutcome, DownloadStatus, RunReport};
