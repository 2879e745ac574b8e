//! Snapshot model.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Result, SnapshotError};

/// Status string the API uses for a finished, downloadable snapshot.
pub const STATUS_COMPLETE: &str = "complete";

/// A point-in-time export of one item.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snapshot {
    /// Snapshot identifier, used as the archive file name suffix.
    pub id: String,

    /// Lifecycle status ("complete" once downloadable).
    #[serde(default)]
    pub status: String,

    /// Location of the archive, set once complete.
    #[serde(default)]
    pub file_path: Option<String>,
}

impl Snapshot {
    /// Check if the snapshot can be downloaded.
    pub fn is_complete(&self) -> bool {
        self.status == STATUS_COMPLETE
    }
}

/// API response wrapper for listing snapshots of an item.
#[derive(Debug, Deserialize)]
pub struct SnapshotList {
    /// Snapshots as ordered by the API, most recent first.
    pub snapshots: Vec<Snapshot>,
}

impl SnapshotList {
    /// Decode a snapshot list response.
    ///
    /// # Errors
    ///
    /// Returns [`SnapshotError::UnexpectedResponse`] if the body has no
    /// `snapshots` array.
    pub fn from_response(response: Value) -> Result<Self> {
        serde_json::from_value(response)
            .map_err(|e| SnapshotError::UnexpectedResponse(format!("snapshot list: {e}")))
    }

    /// The first listed snapshot, trusted to be the most recent.
    pub fn latest(self) -> Option<Snapshot> {
        self.snapshots.into_iter().next()
    }
}
