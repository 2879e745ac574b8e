//! Scope runner.
//!
//! Drives one pipeline per selected scope, strictly one after the other.

use std::fmt;
use std::str::FromStr;

use clap::ValueEnum;
use serde::Serialize;

use crate::client::SpaceClient;
use crate::error::{Result, SnapshotError};
use crate::extract::Extractor;
use crate::options::Options;
use crate::pipeline::SnapshotPipeline;
use crate::report::RunReport;
use crate::scope::Scope;

/// What to do for every item of the selected scopes.
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    /// Ask the API to create a new snapshot.
    Create,
    /// Download the latest complete snapshot.
    Download,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Create => "create",
            Self::Download => "download",
        })
    }
}

impl FromStr for Action {
    type Err = SnapshotError;

    fn from_str(s: &str) -> core::result::Result<Self, Self::Err> {
        match s {
            "create" => Ok(Self::Create),
            "download" => Ok(Self::Download),
            other => Err(SnapshotError::InvalidAction(other.to_string())),
        }
    }
}

/// Run `action` over every scope matching `filter` (all scopes when `None`).
///
/// Any failure aborts the remaining items and scopes.
///
/// # Errors
///
/// Returns the first error raised by a pipeline.
pub async fn run(
    client: &SpaceClient,
    action: Action,
    filter: Option<Scope>,
    options: &Options,
    extractor: &dyn Extractor,
) -> Result<RunReport> {
    let mut report = RunReport::default();

    for scope in Scope::selected(filter) {
        let pipeline = SnapshotPipeline::new(client, scope, options, extractor);
        match action {
            Action::Create => {
                tracing::info!("Creating snapshots for {scope}");
                report.created.extend(pipeline.create_snapshots().await?);
            }
            Action::Download => {
                tracing::info!("Downloading snapshots for {scope}");
                report.downloaded.extend(pipeline.download_snapshots().await?);
            }
        }
    }

    Ok(report)
}

/// Validate raw action and scope names, then [`run`].
///
/// Nothing touches the network unless both names are valid. An empty or
/// missing scope selects every scope.
///
/// # Errors
///
/// Returns [`SnapshotError::InvalidScope`] or [`SnapshotError::InvalidAction`]
/// for bad names, otherwise whatever [`run`] returns.
pub async fn run_named(
    client: &SpaceClient,
    action: Option<&str>,
    scope: Option<&str>,
    options: &Options,
    extractor: &dyn Extractor,
) -> Result<RunReport> {
    let filter = Scope::parse_filter(scope)?;
    let action: Action = action.unwrap_or_default().parse()?;
    run(client, action, filter, options, extractor).await
}
