//! Per-item results of a run.

use std::path::PathBuf;

use serde::Serialize;
use serde_json::Value;

use crate::scope::Scope;

/// Result of a snapshot creation request for one item.
#[derive(Debug, Clone, Serialize)]
pub struct CreateOutcome {
    pub scope: Scope,
    pub item_id: String,
    pub name: String,
    /// Acknowledgement body as returned by the API.
    pub response: Value,
}

/// What happened to one item during a download pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum DownloadStatus {
    /// The item has no snapshots at all.
    NoSnapshots,
    /// The latest snapshot is not complete yet.
    Skipped { snapshot_status: String },
    /// Archive written and kept (unzip disabled).
    Downloaded { path: PathBuf, bytes: u64 },
    /// Archive extracted and deleted.
    Extracted { path: PathBuf, bytes: u64 },
    /// Extraction failed, archive left in place.
    ExtractionFailed { archive: PathBuf, bytes: u64 },
}

impl DownloadStatus {
    /// Short label for table output.
    pub fn label(&self) -> &'static str {
        match self {
            Self::NoSnapshots => "no snapshots",
            Self::Skipped { .. } => "skipped",
            Self::Downloaded { .. } => "downloaded",
            Self::Extracted { .. } => "extracted",
            Self::ExtractionFailed { .. } => "extraction failed",
        }
    }

    /// Bytes written to disk, zero when nothing was downloaded.
    pub fn bytes(&self) -> u64 {
        match self {
            Self::Downloaded { bytes, .. }
            | Self::Extracted { bytes, .. }
            | Self::ExtractionFailed { bytes, .. } => *bytes,
            Self::NoSnapshots | Self::Skipped { .. } => 0,
        }
    }
}

/// Result of a download pass for one item.
#[derive(Debug, Clone, Serialize)]
pub struct DownloadOutcome {
    pub scope: Scope,
    pub item_id: String,
    pub name: String,
    pub snapshot_id: Option<String>,
    #[serde(flatten)]
    pub status: DownloadStatus,
}

/// Everything a run did, in processing order.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RunReport {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub created: Vec<CreateOutcome>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub downloaded: Vec<DownloadOutcome>,
}

impl RunReport {
    /// Returns true if no item was processed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.created.is_empty() && self.downloaded.is_empty()
    }

    /// Total bytes written across all downloads.
    #[must_use]
    pub fn total_bytes(&self) -> u64 {
        self.downloaded.iter().map(|d| d.status.bytes()).sum()
    }
}
