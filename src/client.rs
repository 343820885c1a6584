//! Authenticated HTTP plumbing for the LlamaParse job API.
//!
//! [`JobClient`] owns the `reqwest::Client`, the API root and the resolved
//! credential. Every request goes through [`JobClient::send`], which attaches
//! the bearer header and a timeout derived from the caller's [`Deadline`].
//!
//! The stage methods (`submit`, `status`, `wait_for_completion`,
//! `fetch_result`) are thin wrappers over [`crate::pipeline`] for callers who
//! want to drive a job themselves, for example to resume polling a job id
//! obtained earlier. Most callers want [`crate::parse`] instead.

use crate::config::{ParseConfig, ParseMode};
use crate::deadline::Deadline;
use crate::error::ParseError;
use crate::output::{Job, JobStatus};
use crate::pipeline::{fetch, multipart, poll, upload};
use reqwest::{RequestBuilder, Response};
use std::fmt;

pub struct JobClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl fmt::Debug for JobClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JobClient")
            .field("base_url", &self.base_url)
            .field("api_key", &"<redacted>")
            .finish()
    }
}

impl JobClient {
    /// Create a client for `base_url` with an already-resolved credential.
    ///
    /// No client-level timeout is set; each request carries its own.
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Result<Self, ParseError> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("llamaparse-rs/", env!("CARGO_PKG_VERSION")))
            .build()?;
        let base_url: String = base_url.into();
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        })
    }

    /// Resolve the credential from `config` and build a client for its base URL.
    pub fn from_config(config: &ParseConfig) -> Result<Self, ParseError> {
        let api_key = config.resolve_api_key()?;
        Self::new(&config.base_url, api_key)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub(crate) fn get(&self, url: &str) -> RequestBuilder {
        self.http.get(url)
    }

    pub(crate) fn post(&self, url: &str) -> RequestBuilder {
        self.http.post(url)
    }

    /// Authenticate and send `request` within what is left of `deadline`.
    pub(crate) async fn send(
        &self,
        request: RequestBuilder,
        deadline: &Deadline,
    ) -> Result<Response, ParseError> {
        request
            .bearer_auth(&self.api_key)
            .timeout(deadline.request_timeout())
            .send()
            .await
            .map_err(|e| classify_transport(e, deadline))
    }

    // ── Stage methods ────────────────────────────────────────────────────

    /// Upload `file` and return the created job.
    pub async fn submit(
        &self,
        file: &[u8],
        file_name: &str,
        language: Option<&str>,
        deadline: &Deadline,
    ) -> Result<Job, ParseError> {
        let form = multipart::build_form(file, file_name, language)?;
        upload::submit(self, form, deadline).await
    }

    /// One status request. Non-200 and malformed bodies decode as
    /// [`JobStatus::Unknown`]; transport failures are errors.
    pub async fn status(&self, job: &Job, deadline: &Deadline) -> Result<JobStatus, ParseError> {
        poll::check_status(self, job, deadline).await
    }

    /// Poll until the job reports success. Returns the number of status
    /// requests sent.
    pub async fn wait_for_completion(
        &self,
        job: &Job,
        config: &ParseConfig,
        deadline: &Deadline,
    ) -> Result<u32, ParseError> {
        poll::wait_for_completion(self, job, config, deadline).await
    }

    /// Fetch the finished job's payload for `mode`.
    pub async fn fetch_result(
        &self,
        job: &Job,
        mode: ParseMode,
        deadline: &Deadline,
    ) -> Result<String, ParseError> {
        fetch::fetch_result(self, job, mode, deadline).await
    }
}

/// Transport timeouts mean the overall budget ran out; everything else is
/// passed through unchanged.
pub(crate) fn classify_transport(err: reqwest::Error, deadline: &Deadline) -> ParseError {
    if err.is_timeout() {
        ParseError::TimeoutReached {
            elapsed_secs: deadline.elapsed().as_secs(),
        }
    } else {
        ParseError::Http(err)
    }
}
