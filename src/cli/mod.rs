//! CLI argument parsing types.
//!
//! This module provides the command-line interface structure for the
//! space-snapshots binary.

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

use crate::error::Result;
use crate::options::{Options, DEFAULT_OUTPUT_DIR};
use crate::retry::{RetryPolicy, DEFAULT_MAX_RETRIES};
use crate::runner::Action;
use crate::scope::Scope;

/// Create or download Space snapshots.
#[derive(Parser, Debug)]
#[command(name = "space-snapshots", about = "Create and download Space snapshots", version)]
pub struct Cli {
    /// What to do for every item.
    pub action: Action,

    /// Only process this scope: horizons, instances or collections
    /// (all scopes when omitted or empty).
    pub scope: Option<String>,

    /// Directory downloads are written to.
    #[arg(long, default_value = DEFAULT_OUTPUT_DIR)]
    pub output: PathBuf,

    /// Extract downloaded archives and delete the zip (default).
    #[arg(long = "unzip", overrides_with = "no_unzip")]
    pub unzip: bool,

    /// Keep downloaded archives as zip files.
    #[arg(long = "no-unzip", overrides_with = "unzip")]
    pub no_unzip: bool,

    /// Pause between snapshot creation requests, in milliseconds.
    #[arg(long, default_value_t = 200)]
    pub create_delay_ms: u64,

    /// Give up on a call after this many rate limited retries.
    #[arg(long, default_value_t = DEFAULT_MAX_RETRIES, conflicts_with = "retry_forever")]
    pub max_retries: u32,

    /// Retry rate limited calls without a ceiling.
    #[arg(long)]
    pub retry_forever: bool,

    /// Output results as JSON instead of a table.
    #[arg(long, global = true, default_value = "false")]
    pub json: bool,
}

impl Cli {
    /// The selected scope, `None` meaning every scope.
    ///
    /// # Errors
    ///
    /// Returns [`crate::SnapshotError::InvalidScope`] for unknown names.
    pub fn scope_filter(&self) -> Result<Option<Scope>> {
        Scope::parse_filter(self.scope.as_deref())
    }

    /// Whether archives should be extracted.
    pub fn unzip(&self) -> bool {
        !self.no_unzip
    }

    /// Pipeline options from the parsed flags.
    pub fn options(&self) -> Options {
        Options {
            output: self.output.clone(),
            unzip: self.unzip(),
            create_delay: Duration::from_millis(self.create_delay_ms),
        }
    }

    /// Rate limit policy from the parsed flags.
    pub fn retry_policy(&self) -> RetryPolicy {
        if self.retry_forever {
            RetryPolicy::unbounded()
        } else {
            RetryPolicy::bounded(self.max_retries)
        }
    }
}
