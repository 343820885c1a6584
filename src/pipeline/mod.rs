//! Pipeline stages for one LlamaParse job.
//!
//! Each submodule implements exactly one step of the protocol and is
//! testable on its own.
//!
//! ## Data Flow
//!
//! ```text
//! input ──▶ multipart ──▶ upload ──▶ poll ──▶ fetch
//! (path/URL)  (form)     (job id)   (status)  (payload)
//! ```
//!
//! 1. [`input`]    : read a local file or download a URL into memory
//! 2. [`multipart`]: build the `file` + `language` upload form
//! 3. [`upload`]   : `POST /api/parsing/upload`, extract the job id
//! 4. [`poll`]     : sleep / check status until `SUCCESS` or the deadline
//! 5. [`fetch`]    : `GET …/result/{mode}`, extract the payload string

pub mod fetch;
pub mod input;
pub mod multipart;
pub mod poll;
pub mod upload;

/// Read a response body as JSON, or `None` if it is not JSON.
pub(crate) fn decode_json(bytes: &[u8]) -> Option<serde_json::Value> {
    serde_json::from_slice(bytes).ok()
}

/// First 200 characters of a body, for error details.
pub(crate) fn snippet(bytes: &[u8]) -> String {
    let text = String::from_utf8_lossy(bytes);
    let trimmed = text.trim();
    match trimmed.char_indices().nth(200) {
        Some((idx, _)) => format!("{}\u{2026}", &trimmed[..idx]),
        None => trimmed.to_string(),
    }
}
