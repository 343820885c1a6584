//! Job submission: `POST /api/parsing/upload`.
//!
//! Exactly one HTTP call. A non-success status and a success body without a
//! string `id` are both reported as [`ParseError::ParsingFailed`]; there is no
//! separate protocol-error kind.

use crate::client::{classify_transport, JobClient};
use crate::deadline::Deadline;
use crate::error::{ParseError, Stage};
use crate::output::Job;
use crate::pipeline::{decode_json, snippet};
use reqwest::multipart::Form;
use tracing::{debug, info};

pub async fn submit(client: &JobClient, form: Form, deadline: &Deadline) -> Result<Job, ParseError> {
    let url = format!("{}/api/parsing/upload", client.base_url());
    debug!("Uploading to {}", url);

    let response = client.send(client.post(&url).multipart(form), deadline).await?;
    let status = response.status();
    let body = response
        .bytes()
        .await
        .map_err(|e| classify_transport(e, deadline))?;

    if !status.is_success() {
        return Err(ParseError::parsing_failed(
            Stage::Upload,
            format!("HTTP {}: {}", status, snippet(&body)),
        ));
    }

    let id = decode_json(&body)
        .as_ref()
        .and_then(|v| v.get("id"))
        .and_then(|id| id.as_str())
        .map(str::to_string)
        .ok_or_else(|| {
            ParseError::parsing_failed(
                Stage::Upload,
                format!("response has no string 'id' field: {}", snippet(&body)),
            )
        })?;

    info!("Created parsing job {}", id);
    Ok(Job::new(id))
}
