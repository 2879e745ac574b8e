//! Pipeline options.

use std::path::PathBuf;
use std::time::Duration;

/// Default directory downloads land in.
pub const DEFAULT_OUTPUT_DIR: &str = "./exports";

/// Pause between snapshot creation requests.
pub const DEFAULT_CREATE_DELAY: Duration = Duration::from_millis(200);

/// Settings shared by every scope pipeline in a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Options {
    /// Directory downloads are written under, one subdirectory per scope.
    pub output: PathBuf,
    /// Extract archives next to the download and delete the `.zip`.
    pub unzip: bool,
    /// Fixed wait after each create request.
    pub create_delay: Duration,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            output: PathBuf::from(DEFAULT_OUTPUT_DIR),
            unzip: true,
            create_delay: DEFAULT_CREATE_DELAY,
        }
    }
}
