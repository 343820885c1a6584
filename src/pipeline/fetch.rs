//! Result retrieval: `GET /api/parsing/job/{id}/result/{mode}`.
//!
//! The payload lives under a key named after the mode, e.g.
//! `{"markdown": "# Title\n..."}`. Anything else (non-success status, a body
//! that is not JSON, a missing key, a non-string value) is
//! [`ParseError::ParsingFailed`].

use crate::client::{classify_transport, JobClient};
use crate::config::ParseMode;
use crate::deadline::Deadline;
use crate::error::{ParseError, Stage};
use crate::output::Job;
use crate::pipeline::{decode_json, snippet};
use tracing::debug;

pub async fn fetch_result(
    client: &JobClient,
    job: &Job,
    mode: ParseMode,
    deadline: &Deadline,
) -> Result<String, ParseError> {
    let url = job.result_url(client.base_url(), mode);
    debug!("Job {}: fetching {} result", job, mode);

    let response = client.send(client.get(&url), deadline).await?;
    let status = response.status();
    let body = response
        .bytes()
        .await
        .map_err(|e| classify_transport(e, deadline))?;

    if !status.is_success() {
        return Err(ParseError::parsing_failed(
            Stage::Result,
            format!("HTTP {}: {}", status, snippet(&body)),
        ));
    }

    let value = decode_json(&body).ok_or_else(|| {
        ParseError::parsing_failed(
            Stage::Result,
            format!("response is not JSON: {}", snippet(&body)),
        )
    })?;

    extract_payload(&value, mode)
}

/// Pull the mode-keyed string out of a result body.
pub fn extract_payload(value: &serde_json::Value, mode: ParseMode) -> Result<String, ParseError> {
    match value.get(mode.as_str()) {
        Some(serde_json::Value::String(s)) => Ok(s.clone()),
        Some(other) => Err(ParseError::parsing_failed(
            Stage::Result,
            format!(
                "field '{}' is not a string (got {})",
                mode,
                json_type_name(other)
            ),
        )),
        None => Err(ParseError::parsing_failed(
            Stage::Result,
            format!("response has no '{}' field", mode),
        )),
    }
}

fn json_type_name(v: &serde_json::Value) -> &'static str {
    match v {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "bool",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}
