//! # llamaparse
//!
//! Async client for the [LlamaParse](https://cloud.llamaindex.ai) document
//! parsing API.
//!
//! Parsing happens server-side. This crate uploads the file, waits for the
//! job to finish and returns the result as Markdown, plain text or JSON.
//!
//! ## Job Protocol
//!
//! ```text
//! bytes
//!  │
//!  ├─ 1. Upload  POST /api/parsing/upload            → job id
//!  ├─ 2. Poll    GET  /api/parsing/job/{id}          every check_interval, until "SUCCESS"
//!  └─ 3. Fetch   GET  /api/parsing/job/{id}/result/{mode} → payload string
//! ```
//!
//! One overall timeout (default 2000 s) bounds all three steps.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use llamaparse::{parse, ParseConfig, ParseMode};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Credential read from LLAMA_CLOUD_API_KEY
//!     let config = ParseConfig::builder().mode(ParseMode::Markdown).build()?;
//!     let bytes = std::fs::read("document.pdf")?;
//!     let markdown = parse(&bytes, &config).await?;
//!     println!("{markdown}");
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `llamaparse` binary (clap + anyhow + tracing-subscriber + indicatif) |
//!
//! Disable `cli` when using only the library:
//! ```toml
//! llamaparse = { version = "0.1", default-features = false }
//! ```

// ── Modules ──────────────────────────────────────────────────────────────

pub mod client;
pub mod config;
pub mod deadline;
pub mod error;
pub mod mime;
pub mod output;
pub mod parse;
pub mod pipeline;
pub mod progress;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use client::JobClient;
pub use config::{ParseConfig, ParseConfigBuilder, ParseMode, API_KEY_ENV, BASE_URL};
pub use deadline::Deadline;
pub use error::{ParseError, Stage};
pub use mime::{is_supported_mime, mime_for_extension, mime_for_path, SUPPORTED_MIME_TYPES};
pub use output::{Job, JobStatus, ParseOutput, ParseStats};
pub use parse::{parse, parse_file, parse_job, parse_sync, parse_to_file, resume_job};
pub use progress::{JobProgressCallback, NoopProgressCallback, ProgressCallback};
