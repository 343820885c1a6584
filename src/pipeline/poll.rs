//! Status polling: the job's state machine.
//!
//! ```text
//! Polling ──SUCCESS──▶ Succeeded   (caller fetches the result)
//!    │
//!    ├──deadline──▶ TimedOut       ParseError::TimeoutReached
//!    └──transport─▶ aborted        ParseError::Http
//! ```
//!
//! Each iteration checks the deadline first, then sleeps for the poll
//! interval, then sends one status request. The whole loop can therefore
//! overrun the budget by up to one interval plus one round trip.
//!
//! Only transport failures stop the loop early. A non-200 status, a body
//! that is not JSON and a missing or non-string `status` field are all just
//! "not yet", same as `PENDING`. Upstream `ERROR` / `CANCELLED` are treated
//! the same way unless [`ParseConfig::fail_on_error_status`] is set.

use crate::client::{classify_transport, JobClient};
use crate::config::ParseConfig;
use crate::deadline::Deadline;
use crate::error::{ParseError, Stage};
use crate::output::{Job, JobStatus};
use crate::pipeline::decode_json;
use tokio::time::sleep;
use tracing::{debug, warn};

/// Send one status request and decode the answer.
pub async fn check_status(
    client: &JobClient,
    job: &Job,
    deadline: &Deadline,
) -> Result<JobStatus, ParseError> {
    let url = job.status_url(client.base_url());
    let response = client.send(client.get(&url), deadline).await?;
    let status = response.status();
    let body = response
        .bytes()
        .await
        .map_err(|e| classify_transport(e, deadline))?;

    if !status.is_success() {
        warn!("Job {}: status check returned HTTP {}, retrying", job, status);
        return Ok(JobStatus::Unknown);
    }

    Ok(decode_json(&body)
        .map(|v| JobStatus::from_body(&v))
        .unwrap_or(JobStatus::Unknown))
}

/// Poll until `SUCCESS`. Returns the number of status requests sent.
pub async fn wait_for_completion(
    client: &JobClient,
    job: &Job,
    config: &ParseConfig,
    deadline: &Deadline,
) -> Result<u32, ParseError> {
    let mut attempt: u32 = 0;

    loop {
        if deadline.is_expired() {
            debug!(
                "Job {}: deadline of {:?} passed after {} polls",
                job,
                deadline.budget(),
                attempt
            );
            return Err(ParseError::TimeoutReached {
                elapsed_secs: deadline.elapsed().as_secs(),
            });
        }

        sleep(config.check_interval).await;

        attempt += 1;
        let status = check_status(client, job, deadline).await?;
        debug!("Job {}: poll {} → {}", job, attempt, status);

        if let Some(ref cb) = config.progress_callback {
            cb.on_poll(attempt, &status);
        }

        if status.is_success() {
            return Ok(attempt);
        }

        if config.fail_on_error_status && status.is_terminal_failure() {
            return Err(ParseError::parsing_failed(
                Stage::Status,
                format!("job {} reported {}", job, status),
            ));
        }
    }
}
