//! Archive extraction.
//!
//! The pipeline only needs a yes/no answer from extraction, so it talks to
//! the [`Extractor`] trait. [`ZipExtractor`] is the default implementation.

use std::fs::File;
use std::path::{Path, PathBuf};

use async_trait::async_trait;

/// Extract an archive into a destination directory.
#[async_trait]
pub trait Extractor: Send + Sync {
    /// Extract `archive` into `destination`, reporting success.
    ///
    /// Failures are reported as `false`, never as errors; the caller keeps
    /// the archive around when extraction fails.
    async fn extract(&self, archive: &Path, destination: &Path) -> bool;
}

/// Zip extraction on a blocking thread.
#[derive(Debug, Clone, Copy, Default)]
pub struct ZipExtractor;

#[async_trait]
impl Extractor for ZipExtractor {
    #[tracing::instrument(skip(self))]
    async fn extract(&self, archive: &Path, destination: &Path) -> bool {
        let archive: PathBuf = archive.to_path_buf();
        let destination: PathBuf = destination.to_path_buf();

        let result = tokio::task::spawn_blocking(move || unzip(&archive, &destination)).await;

        match result {
            Ok(Ok(())) => true,
            Ok(Err(e)) => {
                tracing::warn!("Extraction failed: {e}");
                false
            }
            Err(e) => {
                tracing::warn!("Extraction task panicked: {e}");
                false
            }
        }
    }
}

fn unzip(archive: &Path, destination: &Path) -> zip::result::ZipResult<()> {
    let file = File::open(archive)?;
    let mut zip = zip::ZipArchive::new(file)?;
    std::fs::create_dir_all(destination)?;
    zip.extract(destination)
}
