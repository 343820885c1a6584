//! Job handles, status vocabulary and parse results.

use crate::config::ParseMode;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A server-side parsing job, identified by the opaque id the upload
/// endpoint returned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Job {
    pub id: String,
}

impl Job {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }

    /// `{base}/api/parsing/job/{id}`
    pub fn status_url(&self, base_url: &str) -> String {
        format!("{}/api/parsing/job/{}", base_url, self.id)
    }

    /// `{base}/api/parsing/job/{id}/result/{mode}`
    pub fn result_url(&self, base_url: &str, mode: ParseMode) -> String {
        format!("{}/api/parsing/job/{}/result/{}", base_url, self.id, mode)
    }
}

impl fmt::Display for Job {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.id)
    }
}

/// One observation of a job's status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum JobStatus {
    Pending,
    Success,
    Error,
    PartialSuccess,
    Cancelled,
    /// A status string outside the known vocabulary.
    Other(String),
    /// Non-200 response, undecodable body, or no string `status` field.
    Unknown,
}

impl JobStatus {
    /// Decode the `status` field of a status-endpoint body.
    ///
    /// Matching is exact and case-sensitive: `"success"` is not `Success`.
    pub fn from_body(body: &serde_json::Value) -> Self {
        match body.get("status").and_then(|s| s.as_str()) {
            Some(s) => Self::from_wire(s),
            None => JobStatus::Unknown,
        }
    }

    pub fn from_wire(s: &str) -> Self {
        match s {
            "PENDING" => JobStatus::Pending,
            "SUCCESS" => JobStatus::Success,
            "ERROR" => JobStatus::Error,
            "PARTIAL_SUCCESS" => JobStatus::PartialSuccess,
            "CANCELLED" | "CANCELED" => JobStatus::Cancelled,
            other => JobStatus::Other(other.to_string()),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, JobStatus::Success)
    }

    /// Upstream says the job will never succeed.
    pub fn is_terminal_failure(&self) -> bool {
        matches!(self, JobStatus::Error | JobStatus::Cancelled)
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JobStatus::Pending => f.write_str("PENDING"),
            JobStatus::Success => f.write_str("SUCCESS"),
            JobStatus::Error => f.write_str("ERROR"),
            JobStatus::PartialSuccess => f.write_str("PARTIAL_SUCCESS"),
            JobStatus::Cancelled => f.write_str("CANCELLED"),
            JobStatus::Other(s) => f.write_str(s),
            JobStatus::Unknown => f.write_str("<unknown>"),
        }
    }
}

/// Timing and polling statistics for one parse.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParseStats {
    /// Status requests sent, including the one that observed success.
    pub poll_attempts: u32,
    pub upload_duration_ms: u64,
    pub wait_duration_ms: u64,
    pub fetch_duration_ms: u64,
    pub total_duration_ms: u64,
}

/// The complete result of a parse.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParseOutput {
    pub job_id: String,
    pub mode: ParseMode,
    /// The payload extracted from the result body under the mode's key.
    pub content: String,
    pub stats: ParseStats,
}
