// src/checker/model.rs
// =============================================================================
// The records that flow through the pipeline:
//
//   Job  ──(worker)──>  AuditResult
//
// A Job is one URL plus the row it came from. An AuditResult is the verdict
// for that Job. Both are created once and never changed afterwards, they are
// just moved from one channel to the next.
// =============================================================================

use super::detect::{Detection, Finding};
use super::error::CheckError;
use serde::Serialize;
use std::fmt;

// Marker prefixes the results sheet relies on for styling
pub const SUCCESS_MARKER: &str = "✅";
pub const FAILURE_MARKER: &str = "❌";

/// Identifies the spreadsheet row a job came from (1-based, row 1 is the header)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct RowId(pub usize);

impl fmt::Display for RowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "row {}", self.0)
    }
}

/// One URL to check
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Job {
    pub id: RowId,
    pub url: String,
}

impl Job {
    pub fn new(id: RowId, url: impl Into<String>) -> Self {
        Self { id, url: url.into() }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditStatus {
    /// Fetched and parsed, nothing found
    Clean,
    /// At least one noindex / nofollow finding
    Excluded,
    /// Could not fetch or parse, and nothing was found
    Failed,
}

// The verdict for one Job
//
// Invariants (enforced by the constructors below):
//   Excluded  <=> findings is non-empty
//   Failed    <=> error is Some and findings is empty
//   Clean     <=> no error and no findings
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuditResult {
    pub id: RowId,
    pub url: String,
    pub status: AuditStatus,
    pub findings: Vec<Finding>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Final HTTP status code, if a response arrived
    #[serde(skip_serializing_if = "Option::is_none")]
    pub http_status: Option<u16>,
}

impl AuditResult {
    // Builds the result from what the detector said
    pub fn classify(job: Job, http_status: Option<u16>, detection: Result<Detection, CheckError>) -> Self {
        match detection {
            Ok(detection) => {
                let status = if detection.findings.is_empty() {
                    AuditStatus::Clean
                } else {
                    AuditStatus::Excluded
                };
                AuditResult {
                    id: job.id,
                    url: job.url,
                    status,
                    findings: detection.findings,
                    error: None,
                    http_status,
                }
            }
            Err(error) => AuditResult {
                http_status,
                ..AuditResult::failed(job, &error)
            },
        }
    }

    // A job that never got as far as the detector
    pub fn failed(job: Job, error: &dyn fmt::Display) -> Self {
        AuditResult {
            id: job.id,
            url: job.url,
            status: AuditStatus::Failed,
            findings: Vec::new(),
            error: Some(error.to_string()),
            http_status: None,
        }
    }

    // Renders the text that goes into the result cell
    //
    //   Clean    -> "✅ No noindex / nofollow found"
    //   Excluded -> one "❌ <source> found: <value>" line per finding
    //   Failed   -> "❌ Error: <description>"
    pub fn render(&self) -> String {
        match self.status {
            AuditStatus::Clean => format!("{} No noindex / nofollow found", SUCCESS_MARKER),
            AuditStatus::Excluded => self
                .findings
                .iter()
                .map(|f| format!("{} {} found: {}", FAILURE_MARKER, f.source, f.normalized_value))
                .collect::<Vec<_>>()
                .join("\n"),
            AuditStatus::Failed => format!(
                "{} Error: {}",
                FAILURE_MARKER,
                self.error.as_deref().unwrap_or("unknown error")
            ),
        }
    }
}
