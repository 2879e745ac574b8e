//! Per-scope snapshot pipeline.
//!
//! A [`SnapshotPipeline`] lists the items of one [`Scope`] and then either
//! asks the API for a new snapshot of each, or downloads the latest
//! complete snapshot of each. Items are handled one at a time, in the order
//! the API lists them.

use std::path::{Path, PathBuf};

use futures::{Stream, StreamExt};
use reqwest::Method;
use tokio::fs::{self, File};
use tokio::io::AsyncWriteExt;

use crate::client::SpaceClient;
use crate::error::{Result, SnapshotError};
use crate::extract::Extractor;
use crate::models::{Item, Snapshot, SnapshotList};
use crate::options::Options;
use crate::report::{CreateOutcome, DownloadOutcome, DownloadStatus};
use crate::sanitize::clean_name;
use crate::scope::Scope;

/// Items requested from a list endpoint. Larger lists are truncated.
pub const ITEMS_PER_PAGE: u32 = 1000;

/// Snapshots requested per item.
pub const SNAPSHOTS_PER_PAGE: u32 = 100;

/// Orchestrates list, create and download for a single scope.
pub struct SnapshotPipeline<'a> {
    client: &'a SpaceClient,
    scope: Scope,
    options: &'a Options,
    extractor: &'a dyn Extractor,
}

impl<'a> SnapshotPipeline<'a> {
    /// Create a pipeline for `scope`.
    pub fn new(
        client: &'a SpaceClient,
        scope: Scope,
        options: &'a Options,
        extractor: &'a dyn Extractor,
    ) -> Self {
        Self {
            client,
            scope,
            options,
            extractor,
        }
    }

    /// The scope this pipeline works on.
    pub fn scope(&self) -> Scope {
        self.scope
    }

    /// File-name token for an item.
    pub fn item_name(&self, item: &Item) -> String {
        clean_name(self.scope.display_field().select(item))
    }

    /// Where the archive of `snapshot` for `item` is written.
    ///
    /// Both name parts are cleaned, so the file always lands directly
    /// under `{output}/{scope}`.
    pub fn target_path(&self, item: &Item, snapshot: &Snapshot) -> PathBuf {
        self.options.output.join(self.scope.path()).join(format!(
            "{}-{}.zip",
            self.item_name(item),
            clean_name(&snapshot.id)
        ))
    }

    /// List the items of this scope (first page only).
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the body has the wrong shape.
    #[tracing::instrument(skip(self), fields(scope = %self.scope))]
    pub async fn list_items(&self) -> Result<Vec<Item>> {
        let path = format!("/{}?per_page={ITEMS_PER_PAGE}", self.scope.path());
        let response = self.client.call(&path, Method::GET, None).await?;
        let items = Item::list_from_response(self.scope, response)?;
        tracing::info!(count = items.len(), "Listed {}", self.scope);
        Ok(items)
    }

    /// Request a new snapshot for every item, pausing between requests.
    ///
    /// # Errors
    ///
    /// Stops at the first failed call; later items are not attempted.
    #[tracing::instrument(skip(self), fields(scope = %self.scope))]
    pub async fn create_snapshots(&self) -> Result<Vec<CreateOutcome>> {
        let items = self.list_items().await?;
        let mut outcomes = Vec::with_capacity(items.len());

        for (index, item) in items.iter().enumerate() {
            if index > 0 {
                tokio::time::sleep(self.options.create_delay).await;
            }

            let path = format!(
                "/{}/{}/snapshots",
                self.scope.path(),
                urlencoding::encode(&item.id)
            );
            let response = self.client.call(&path, Method::POST, None).await?;
            tracing::info!(item = %item.id, %response, "Requested snapshot");

            outcomes.push(CreateOutcome {
                scope: self.scope,
                item_id: item.id.clone(),
                name: self.item_name(item),
                response,
            });
        }

        Ok(outcomes)
    }

    /// Fetch the most recent snapshot of an item, as ordered by the API.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or has no `snapshots` list.
    pub async fn latest_snapshot(&self, item_id: &str) -> Result<Option<Snapshot>> {
        let path = format!(
            "/{}/{}/snapshots?per_page={SNAPSHOTS_PER_PAGE}",
            self.scope.path(),
            urlencoding::encode(item_id)
        );
        let response = self.client.call(&path, Method::GET, None).await?;
        Ok(SnapshotList::from_response(response)?.latest())
    }

    /// Download the latest complete snapshot of every item.
    ///
    /// Items whose latest snapshot is not complete are skipped.
    ///
    /// # Errors
    ///
    /// Stops at the first failed call or write; later items are not attempted.
    #[tracing::instrument(skip(self), fields(scope = %self.scope))]
    pub async fn download_snapshots(&self) -> Result<Vec<DownloadOutcome>> {
        let items = self.list_items().await?;
        let mut outcomes = Vec::with_capacity(items.len());

        for item in &items {
            let outcome = self.download_item(item).await?;
            outcomes.push(outcome);
        }

        Ok(outcomes)
    }

    async fn download_item(&self, item: &Item) -> Result<DownloadOutcome> {
        let mut outcome = DownloadOutcome {
            scope: self.scope,
            item_id: item.id.clone(),
            name: self.item_name(item),
            snapshot_id: None,
            status: DownloadStatus::NoSnapshots,
        };

        let Some(snapshot) = self.latest_snapshot(&item.id).await? else {
            tracing::info!(item = %item.id, "No snapshots yet");
            return Ok(outcome);
        };
        tracing::debug!(item = %item.id, ?snapshot, "Latest snapshot");
        outcome.snapshot_id = Some(snapshot.id.clone());

        let file_path = match snapshot.file_path.as_deref() {
            Some(file_path) if snapshot.is_complete() => file_path,
            _ => {
                tracing::info!(
                    item = %item.id,
                    status = %snapshot.status,
                    "Snapshot is not ready yet {}",
                    snapshot.id
                );
                outcome.status = DownloadStatus::Skipped {
                    snapshot_status: snapshot.status.clone(),
                };
                return Ok(outcome);
            }
        };

        let archive = self.target_path(item, &snapshot);
        let bytes = self.download_archive(file_path, &archive).await?;
        tracing::info!(bytes, "Wrote {}", archive.display());

        outcome.status = if self.options.unzip {
            self.unzip_archive(archive, bytes).await?
        } else {
            DownloadStatus::Downloaded {
                path: archive,
                bytes,
            }
        };

        Ok(outcome)
    }

    /// Stream a remote archive to `destination`, creating parent directories.
    ///
    /// Returns the number of bytes written.
    ///
    /// # Errors
    ///
    /// Returns an error if the archive cannot be fetched or written.
    pub async fn download_archive(&self, file_path: &str, destination: &Path) -> Result<u64> {
        let response = self.client.fetch_archive(file_path).await?;
        write_stream(response.bytes_stream(), destination).await
    }

    /// Extract next to the archive; delete the archive only on success.
    async fn unzip_archive(&self, archive: PathBuf, bytes: u64) -> Result<DownloadStatus> {
        let destination = archive.with_extension("");

        if !self.extractor.extract(&archive, &destination).await {
            tracing::warn!("Keeping {} after failed extraction", archive.display());
            return Ok(DownloadStatus::ExtractionFailed { archive, bytes });
        }

        tracing::info!("Deleting zip file {}", archive.display());
        fs::remove_file(&archive).await?;

        Ok(DownloadStatus::Extracted {
            path: destination,
            bytes,
        })
    }
}

/// Copy a byte stream into a new file at `destination`.
///
/// A partially written file is removed when the stream or a write fails.
async fn write_stream<S, B, E>(stream: S, destination: &Path) -> Result<u64>
where
    S: Stream<Item = core::result::Result<B, E>>,
    B: AsRef<[u8]>,
    E: std::fmt::Display,
{
    if let Some(parent) = destination.parent() {
        fs::create_dir_all(parent).await?;
    }
    let mut file = File::create(destination).await?;

    let result = async {
        futures::pin_mut!(stream);
        let mut written: u64 = 0;
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|e| {
                SnapshotError::NoResponseStream(format!("{}: {e}", destination.display()))
            })?;
            file.write_all(chunk.as_ref()).await?;
            written += chunk.as_ref().len() as u64;
        }
        file.flush().await?;
        Ok::<u64, SnapshotError>(written)
    }
    .await;

    if result.is_err() {
        drop(file);
        if let Err(e) = fs::remove_file(destination).await {
            tracing::warn!("Could not remove partial {}: {e}", destination.display());
        }
    }

    result
}
