//! One overall time budget, shared by every request of a parse.
//!
//! A [`Deadline`] is created once when a parse starts. Upload, status checks
//! and the result fetch each derive their per-request timeout from whatever
//! is left of it, so no stage gets a fresh copy of the full budget.

use std::time::{Duration, Instant};

/// Lower bound for a single request's timeout.
///
/// The poll loop checks the deadline before sleeping, so the last status
/// check may start with little or no budget left. It still gets one round
/// trip to complete.
pub const MIN_REQUEST_TIMEOUT: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, Copy)]
pub struct Deadline {
    start: Instant,
    budget: Duration,
}

impl Deadline {
    /// Start the clock now.
    pub fn after(budget: Duration) -> Self {
        Self {
            start: Instant::now(),
            budget,
        }
    }

    pub fn budget(&self) -> Duration {
        self.budget
    }

    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }

    pub fn remaining(&self) -> Duration {
        self.budget.saturating_sub(self.elapsed())
    }

    /// Strictly past the budget.
    pub fn is_expired(&self) -> bool {
        self.elapsed() > self.budget
    }

    /// Timeout to attach to the next HTTP request.
    pub fn request_timeout(&self) -> Duration {
        self.remaining().max(MIN_REQUEST_TIMEOUT)
    }
}
