//! Output formatting for CLI display.
//!
//! Renders a [`RunReport`] as a table or as JSON.

use tabled::{Table, Tabled};

use crate::error::Result;
use crate::report::{CreateOutcome, DownloadOutcome, DownloadStatus, RunReport};

/// Render a run report for the terminal.
///
/// # Errors
///
/// Returns an error if JSON encoding fails.
pub fn render(report: &RunReport, json: bool) -> Result<String> {
    if json {
        return Ok(serde_json::to_string_pretty(report)?);
    }

    if report.is_empty() {
        return Ok("Nothing to do".to_string());
    }

    let mut sections = Vec::new();
    if !report.created.is_empty() {
        let rows: Vec<CreateRow> = report.created.iter().map(CreateRow::from).collect();
        sections.push(Table::new(rows).to_string());
    }
    if !report.downloaded.is_empty() {
        let rows: Vec<DownloadRow> = report.downloaded.iter().map(DownloadRow::from).collect();
        sections.push(Table::new(rows).to_string());
        sections.push(format!(
            "{} items, {} bytes written",
            report.downloaded.len(),
            report.total_bytes()
        ));
    }

    Ok(sections.join("\n\n"))
}

// Table row types for non-JSON output

#[derive(Tabled)]
struct CreateRow {
    scope: String,
    id: String,
    name: String,
    snapshot: String,
}

impl From<&CreateOutcome> for CreateRow {
    fn from(c: &CreateOutcome) -> Self {
        Self {
            scope: c.scope.to_string(),
            id: c.item_id.clone(),
            name: c.name.clone(),
            snapshot: c
                .response
                .get("id")
                .and_then(|v| v.as_str())
                .unwrap_or("-")
                .to_string(),
        }
    }
}

#[derive(Tabled)]
struct DownloadRow {
    scope: String,
    name: String,
    snapshot: String,
    result: String,
    path: String,
}

impl From<&DownloadOutcome> for DownloadRow {
    fn from(d: &DownloadOutcome) -> Self {
        let path = match &d.status {
            DownloadStatus::Downloaded { path, .. } | DownloadStatus::Extracted { path, .. } => {
                path.display().to_string()
            }
            DownloadStatus::ExtractionFailed { archive, .. } => archive.display().to_string(),
            DownloadStatus::Skipped { snapshot_status } => format!("status: {snapshot_status}"),
            DownloadStatus::NoSnapshots => String::new(),
        };
        Self {
            scope: d.scope.to_string(),
            name: d.name.clone(),
            snapshot: d.snapshot_id.clone().unwrap_or_default(),
            result: d.status.label().to_string(),
            path,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scope::Scope;
    use std::path::PathBuf;

    fn sample_report() -> RunReport {
        RunReport {
            created: vec![],
            downloaded: vec![
                DownloadOutcome {
                    scope: Scope::Instances,
                    item_id: "i1".to_string(),
                    name: "todo".to_string(),
                    snapshot_id: Some("s1".to_string()),
                    status: DownloadStatus::Extracted {
                        path: PathBuf::from("exports/instances/todo-s1"),
                        bytes: 10,
                    },
                },
                DownloadOutcome {
                    scope: Scope::Instances,
                    item_id: "i2".to_string(),
                    name: "notes".to_string(),
                    snapshot_id: Some("s2".to_string()),
                    status: DownloadStatus::Skipped {
                        snapshot_status: "pending".to_string(),
                    },
                },
            ],
        }
    }

    #[test]
    fn test_table_output_lists_items() {
        let output = render(&sample_report(), false).unwrap();
        assert!(output.contains("todo"));
        assert!(output.contains("extracted"));
        assert!(output.contains("status: pending"));
        assert!(output.contains("2 items, 10 bytes written"));
        assert!(serde_json::from_str::<serde_json::Value>(&output).is_err());
    }

    #[test]
    fn test_json_output_is_tagged() {
        let output = render(&sample_report(), true).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&output).unwrap();

        let downloaded = parsed["downloaded"].as_array().unwrap();
        assert_eq!(downloaded.len(), 2);
        assert_eq!(downloaded[0]["result"], "extracted");
        assert_eq!(downloaded[0]["scope"], "instances");
        assert_eq!(downloaded[1]["snapshot_status"], "pending");
        assert!(parsed.get("created").is_none());
    }

    #[test]
    fn test_empty_report() {
        assert_eq!(render(&RunReport::default(), false).unwrap(), "Nothing to do");
    }
}
