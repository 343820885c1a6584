//! Error types for the llamaparse library.
//!
//! A single enum, [`ParseError`], covers every way a parse can end without a
//! result. The variants follow the job protocol:
//!
//! * **Before any network call**: [`ParseError::EmptyInput`] and
//!   [`ParseError::MissingCredential`] are raised at the call boundary, so a
//!   misconfigured caller never reaches the API.
//! * **Protocol failures**: [`ParseError::ParsingFailed`] is the one kind for
//!   "the service said no or answered something we cannot read", tagged with
//!   the [`Stage`] it happened in.
//! * **Budget exhausted**: [`ParseError::TimeoutReached`].
//! * **Transport**: [`ParseError::Http`] wraps `reqwest::Error` untouched.

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// The protocol stage an error was observed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum Stage {
    /// `POST /api/parsing/upload`
    Upload,
    /// `GET /api/parsing/job/{id}`
    Status,
    /// `GET /api/parsing/job/{id}/result/{mode}`
    Result,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Stage::Upload => "upload",
            Stage::Status => "status",
            Stage::Result => "result",
        })
    }
}

/// All errors returned by the llamaparse library.
#[derive(Debug, Error)]
pub enum ParseError {
    // ── Call-boundary errors ──────────────────────────────────────────────
    /// No credential was passed and the environment fallback is unset or empty.
    #[error("LlamaCloud API key is required.\nPass one explicitly or set {env_var}.")]
    MissingCredential { env_var: String },

    /// The file content is zero bytes long.
    #[error("The file cannot be empty")]
    EmptyInput,

    // ── Protocol errors ───────────────────────────────────────────────────
    /// Non-success HTTP status or an unexpected response body.
    #[error("Parsing the file failed at the {stage} stage: {detail}")]
    ParsingFailed { stage: Stage, detail: String },

    /// The overall deadline expired before the job reported success.
    #[error("Timeout reached while parsing the file ({elapsed_secs}s elapsed)\nIncrease --timeout.")]
    TimeoutReached { elapsed_secs: u64 },

    // ── Transport errors ──────────────────────────────────────────────────
    /// Connection, TLS or body-read failure, propagated as-is.
    #[error("HTTP transport error: {0}")]
    Http(#[from] reqwest::Error),

    // ── Input errors ──────────────────────────────────────────────────────
    /// Input file was not found at the given path.
    #[error("File not found: '{path}'\nCheck the path exists and is readable.")]
    FileNotFound { path: PathBuf },

    /// Process does not have read permission on the file.
    #[error("Permission denied reading '{path}'\nTry: chmod +r {path:?}")]
    PermissionDenied { path: PathBuf },

    /// The input string is neither a readable path nor an HTTP/HTTPS URL.
    #[error("Invalid input '{input}': not a file path or a valid HTTP/HTTPS URL")]
    InvalidInput { input: String },

    /// HTTP URL was syntactically valid but the download failed.
    #[error("Failed to download '{url}': {reason}\nCheck your internet connection.")]
    DownloadFailed { url: String, reason: String },

    // ── I/O errors ────────────────────────────────────────────────────────
    /// Could not create or write the output file.
    #[error("Failed to write output file '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ParseError {
    pub(crate) fn parsing_failed(stage: Stage, detail: impl Into<String>) -> Self {
        ParseError::ParsingFailed {
            stage,
            detail: detail.into(),
        }
    }

    /// True for errors raised before any request was sent.
    pub fn is_precondition(&self) -> bool {
        matches!(
            self,
            ParseError::EmptyInput
                | ParseError::MissingCredential { .. }
                | ParseError::InvalidConfig(_)
        )
    }
}
