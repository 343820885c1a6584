//! Parse entry points.
//!
//! Every entry point runs the same sequence for exactly one job:
//!
//! 1. reject empty input, resolve the credential (no network yet)
//! 2. start one [`Deadline`] for the whole job
//! 3. upload → poll → fetch, each request bounded by what is left of it
//!
//! Nothing is carried between calls: each one builds its own [`JobClient`].

use crate::client::JobClient;
use crate::config::{ParseConfig, DEFAULT_FILE_NAME};
use crate::deadline::Deadline;
use crate::error::ParseError;
use crate::output::{Job, ParseOutput, ParseStats};
use crate::pipeline::input;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::info;

/// Download timeout used by [`parse_file`] for URL inputs.
pub const DEFAULT_DOWNLOAD_TIMEOUT_SECS: u64 = 120;

/// Parse a document and return the payload for `config.mode`.
///
/// # Errors
/// - [`ParseError::EmptyInput`]: `file` is empty (no request is sent)
/// - [`ParseError::MissingCredential`]: no key given and the env var is unset
///   (no request is sent)
/// - [`ParseError::ParsingFailed`]: upload or result fetch rejected, or an
///   unexpected response body
/// - [`ParseError::TimeoutReached`]: `config.timeout` elapsed before success
/// - [`ParseError::Http`]: transport failure
///
/// # Example
/// ```rust,no_run
/// use llamaparse::{parse, ParseConfig, ParseMode};
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let bytes = std::fs::read("report.pdf")?;
/// let config = ParseConfig::builder().mode(ParseMode::Markdown).build()?;
/// let markdown = parse(&bytes, &config).await?;
/// println!("{markdown}");
/// # Ok(())
/// # }
/// ```
pub async fn parse(file: &[u8], config: &ParseConfig) -> Result<String, ParseError> {
    parse_job(file, config).await.map(|out| out.content)
}

/// Like [`parse`], but also returns the job id and timing statistics.
pub async fn parse_job(file: &[u8], config: &ParseConfig) -> Result<ParseOutput, ParseError> {
    parse_named(file, &config.file_name, config).await
}

/// Parse a local file or an HTTP/HTTPS URL.
///
/// The file name of the path (or the last URL segment) is sent with the
/// upload unless the config sets a non-default one.
pub async fn parse_file(
    input_str: impl AsRef<str>,
    config: &ParseConfig,
) -> Result<ParseOutput, ParseError> {
    let input_str = input_str.as_ref();
    let resolved = input::resolve_input(input_str, DEFAULT_DOWNLOAD_TIMEOUT_SECS).await?;
    let file_name = if config.file_name == DEFAULT_FILE_NAME {
        resolved.file_name.as_str()
    } else {
        config.file_name.as_str()
    };
    parse_named(&resolved.bytes, file_name, config).await
}

/// Parse a document and write the payload directly to a file.
///
/// Uses atomic write (temp file + rename) to prevent partial files.
pub async fn parse_to_file(
    input_str: impl AsRef<str>,
    output_path: impl AsRef<Path>,
    config: &ParseConfig,
) -> Result<ParseStats, ParseError> {
    let output = parse_file(input_str, config).await?;
    write_atomic(output_path.as_ref(), &output.content).await?;
    Ok(output.stats)
}

/// Synchronous wrapper around [`parse`].
///
/// Creates a temporary tokio runtime internally; do not call it from inside
/// an async context.
pub fn parse_sync(file: &[u8], config: &ParseConfig) -> Result<String, ParseError> {
    tokio::runtime::Runtime::new()
        .map_err(|e| ParseError::Internal(format!("Failed to create tokio runtime: {}", e)))?
        .block_on(parse(file, config))
}

/// Wait for an already-submitted job and fetch its result.
///
/// The deadline starts now; the upload that created `job_id` is not counted.
pub async fn resume_job(job_id: &str, config: &ParseConfig) -> Result<ParseOutput, ParseError> {
    let total_start = Instant::now();
    let client = JobClient::from_config(config)?;
    let deadline = Deadline::after(config.timeout);
    let job = Job::new(job_id);
    info!("Resuming job {}", job);

    let mut stats = ParseStats::default();
    let content = wait_and_fetch(&client, &job, config, &deadline, &mut stats).await?;
    stats.total_duration_ms = total_start.elapsed().as_millis() as u64;

    Ok(ParseOutput {
        job_id: job.id,
        mode: config.mode,
        content,
        stats,
    })
}

// ── Internal helpers ─────────────────────────────────────────────────────

async fn parse_named(
    file: &[u8],
    file_name: &str,
    config: &ParseConfig,
) -> Result<ParseOutput, ParseError> {
    // ── Step 1: Preconditions ────────────────────────────────────────────
    if file.is_empty() {
        return Err(ParseError::EmptyInput);
    }
    let client = JobClient::from_config(config)?;

    // ── Step 2: Upload ───────────────────────────────────────────────────
    let total_start = Instant::now();
    let deadline = Deadline::after(config.timeout);
    info!(
        "Starting {} parse of {} bytes ('{}')",
        config.mode,
        file.len(),
        file_name
    );

    if let Some(ref cb) = config.progress_callback {
        cb.on_upload_start(file.len());
    }
    let upload_start = Instant::now();
    let job = client
        .submit(file, file_name, config.language.as_deref(), &deadline)
        .await?;
    let mut stats = ParseStats {
        upload_duration_ms: upload_start.elapsed().as_millis() as u64,
        ..ParseStats::default()
    };
    if let Some(ref cb) = config.progress_callback {
        cb.on_job_created(&job.id);
    }

    // ── Step 3: Poll + fetch ─────────────────────────────────────────────
    let content = wait_and_fetch(&client, &job, config, &deadline, &mut stats).await?;
    stats.total_duration_ms = total_start.elapsed().as_millis() as u64;

    info!(
        "Job {} complete: {} chars after {} polls, {}ms total",
        job, content.len(), stats.poll_attempts, stats.total_duration_ms
    );

    Ok(ParseOutput {
        job_id: job.id,
        mode: config.mode,
        content,
        stats,
    })
}

async fn wait_and_fetch(
    client: &JobClient,
    job: &Job,
    config: &ParseConfig,
    deadline: &Deadline,
    stats: &mut ParseStats,
) -> Result<String, ParseError> {
    let wait_start = Instant::now();
    stats.poll_attempts = client.wait_for_completion(job, config, deadline).await?;
    stats.wait_duration_ms = wait_start.elapsed().as_millis() as u64;

    let fetch_start = Instant::now();
    let content = client.fetch_result(job, config.mode, deadline).await?;
    stats.fetch_duration_ms = fetch_start.elapsed().as_millis() as u64;

    if let Some(ref cb) = config.progress_callback {
        cb.on_result(&job.id, content.len());
    }
    Ok(content)
}

async fn write_atomic(path: &Path, content: &str) -> Result<(), ParseError> {
    let write_failed = |source: std::io::Error| ParseError::OutputWriteFailed {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await.map_err(write_failed)?;
    }

    let tmp_path = tmp_path_for(path);
    tokio::fs::write(&tmp_path, content)
        .await
        .map_err(write_failed)?;
    tokio::fs::rename(&tmp_path, path)
        .await
        .map_err(write_failed)?;
    Ok(())
}

/// `out.md` → `out.md.tmp`
fn tmp_path_for(path: &Path) -> PathBuf {
    let mut name: OsString = path.as_os_str().to_owned();
    name.push(".tmp");
    PathBuf::from(name)
}
