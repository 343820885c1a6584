//! Progress-callback trait for job lifecycle events.
//!
//! Inject an [`Arc<dyn JobProgressCallback>`] via
//! [`crate::config::ParseConfigBuilder::progress_callback`] to observe a parse
//! as it moves through upload, polling and result fetch. The CLI uses this to
//! drive its spinner.
//!
//! # Example
//!
//! ```rust
//! use llamaparse::{JobProgressCallback, JobStatus, ParseConfig};
//! use std::sync::{Arc, atomic::{AtomicU32, Ordering}};
//!
//! struct PollCounter(AtomicU32);
//!
//! impl JobProgressCallback for PollCounter {
//!     fn on_poll(&self, attempt: u32, status: &JobStatus) {
//!         self.0.store(attempt, Ordering::SeqCst);
//!         eprintln!("poll #{attempt}: {status}");
//!     }
//! }
//!
//! let config = ParseConfig::builder()
//!     .progress_callback(Arc::new(PollCounter(AtomicU32::new(0))))
//!     .build()
//!     .unwrap();
//! ```

use crate::output::JobStatus;
use std::sync::Arc;

/// Called by the parse pipeline at each stage boundary.
///
/// All methods default to no-ops. Implementations must be `Send + Sync`
/// because a config (and its callback) may be shared across tasks.
pub trait JobProgressCallback: Send + Sync {
    /// Called just before the upload request is sent.
    fn on_upload_start(&self, file_len: usize) {
        let _ = file_len;
    }

    /// Called once the upload endpoint has returned a job id.
    fn on_job_created(&self, job_id: &str) {
        let _ = job_id;
    }

    /// Called after every status check.
    ///
    /// # Arguments
    /// * `attempt`: 1-indexed status request count
    /// * `status` : decoded observation (`Unknown` for non-200 / malformed)
    fn on_poll(&self, attempt: u32, status: &JobStatus) {
        let _ = (attempt, status);
    }

    /// Called after the result payload was extracted.
    fn on_result(&self, job_id: &str, content_len: usize) {
        let _ = (job_id, content_len);
    }
}

/// A no-op implementation for callers that don't need progress events.
pub struct NoopProgressCallback;

impl JobProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`crate::config::ParseConfig`].
pub type ProgressCallback = Arc<dyn JobProgressCallback>;
