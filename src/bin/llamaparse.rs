//! CLI binary for llamaparse.
//!
//! A thin shim over the library crate that maps CLI flags
//! to `ParseConfig` and prints results.

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use llamaparse::mime::SUPPORTED_EXTENSIONS;
use llamaparse::{
    parse_file, parse_to_file, resume_job, JobProgressCallback, JobStatus, ParseConfig,
    ParseMode, ParseOutput, ProgressCallback, BASE_URL,
};
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}
fn cyan(s: &str) -> String {
    format!("\x1b[36m{s}\x1b[0m")
}

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Spinner that follows the job through upload, polling and fetch.
struct CliProgressCallback {
    bar: ProgressBar,
    job_id: Mutex<Option<String>>,
}

impl CliProgressCallback {
    fn new() -> Arc<Self> {
        let bar = ProgressBar::new_spinner();
        let style = ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}  ⏱ {elapsed_precise}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]);

        bar.set_style(style);
        bar.set_prefix("Preparing");
        bar.set_message("reading input…");
        bar.enable_steady_tick(Duration::from_millis(80));

        Arc::new(Self {
            bar,
            job_id: Mutex::new(None),
        })
    }

    /// Stop the spinner when a run ends in an error, so the error message
    /// starts on a clean line.
    fn finish_on_error<T>(&self, result: &Result<T>) {
        if result.is_err() && !self.bar.is_finished() {
            self.bar.finish_and_clear();
        }
    }

    fn job_label(&self) -> String {
        self.job_id
            .lock()
            .map(|id| id.clone().unwrap_or_default())
            .unwrap_or_default()
    }
}

impl JobProgressCallback for CliProgressCallback {
    fn on_upload_start(&self, file_len: usize) {
        self.bar.set_prefix("Uploading");
        self.bar.set_message(format!("{file_len} bytes"));
    }

    fn on_job_created(&self, job_id: &str) {
        if let Ok(mut slot) = self.job_id.lock() {
            *slot = Some(job_id.to_string());
        }
        self.bar
            .println(format!("{} job {}", cyan("◆"), bold(job_id)));
        self.bar.set_prefix("Parsing");
        self.bar.set_message("waiting for the service…");
    }

    fn on_poll(&self, attempt: u32, status: &JobStatus) {
        self.bar.set_prefix("Parsing");
        self.bar.set_message(format!(
            "{}  {}",
            dim(&format!("poll #{attempt}")),
            status
        ));
    }

    fn on_result(&self, _job_id: &str, content_len: usize) {
        self.bar.finish_and_clear();
        eprintln!(
            "{} job {} parsed  {}",
            green("✔"),
            bold(&self.job_label()),
            dim(&format!("{content_len} chars"))
        );
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Markdown to stdout
  llamaparse report.pdf

  # Plain text to a file
  llamaparse --mode text report.pdf -o report.txt

  # Parse a remote document, French language hint
  llamaparse --language fr https://example.com/rapport.pdf

  # Resume waiting on a job submitted earlier
  llamaparse --job-id 3f1c2a7e-... -o out.md

  # JSON output with job id and timings
  llamaparse --json report.pdf > output.json

  # List file types accepted by the service
  llamaparse --list-types

ENVIRONMENT VARIABLES:
  LLAMA_CLOUD_API_KEY     LlamaCloud API key
  LLAMAPARSE_BASE_URL     Override the API root
  RUST_LOG                Override the log filter (e.g. llamaparse=debug)
"#;

/// Parse documents with the LlamaParse cloud API.
#[derive(Parser, Debug)]
#[command(
    name = "llamaparse",
    version,
    about = "Parse documents to Markdown, text or JSON with the LlamaParse cloud API",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Local file path or HTTP/HTTPS URL.
    #[arg(required_unless_present_any = ["job_id", "list_types"])]
    input: Option<String>,

    /// Write the parsed output to this file instead of stdout.
    #[arg(short, long, env = "LLAMAPARSE_OUTPUT")]
    output: Option<PathBuf>,

    /// Output format.
    #[arg(short, long, env = "LLAMAPARSE_MODE", value_enum, default_value = "markdown")]
    mode: ModeArg,

    /// LlamaCloud API key.
    #[arg(long, env = "LLAMA_CLOUD_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Language hint (e.g. en, fr, de). Auto-detected if omitted.
    #[arg(short, long, env = "LLAMAPARSE_LANGUAGE")]
    language: Option<String>,

    /// Overall timeout in seconds for upload, polling and fetch.
    #[arg(long, env = "LLAMAPARSE_TIMEOUT", default_value_t = 2000,
          value_parser = clap::value_parser!(u64).range(1..))]
    timeout: u64,

    /// Seconds between status checks.
    #[arg(long, env = "LLAMAPARSE_CHECK_INTERVAL", default_value_t = 1,
          value_parser = clap::value_parser!(u64).range(1..))]
    check_interval: u64,

    /// API root.
    #[arg(long, env = "LLAMAPARSE_BASE_URL", default_value = BASE_URL)]
    base_url: String,

    /// Skip the upload and wait on an existing job id.
    #[arg(long, conflicts_with = "input")]
    job_id: Option<String>,

    /// Stop as soon as the service reports ERROR or CANCELLED.
    #[arg(long, env = "LLAMAPARSE_FAIL_ON_ERROR_STATUS")]
    fail_on_error_status: bool,

    /// Output structured JSON (ParseOutput) instead of the raw payload.
    #[arg(long, env = "LLAMAPARSE_JSON")]
    json: bool,

    /// Disable the progress spinner.
    #[arg(long, env = "LLAMAPARSE_NO_PROGRESS")]
    no_progress: bool,

    /// Print the supported file extensions and MIME types, then exit.
    #[arg(long)]
    list_types: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "LLAMAPARSE_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "LLAMAPARSE_QUIET")]
    quiet: bool,
}

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
enum ModeArg {
    Markdown,
    Text,
    Json,
}

impl From<ModeArg> for ParseMode {
    fn from(v: ModeArg) -> Self {
        match v {
            ModeArg::Markdown => ParseMode::Markdown,
            ModeArg::Text => ParseMode::Text,
            ModeArg::Json => ParseMode::Json,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // The spinner already reports progress; keep library logs to errors
    // while it is shown.
    let show_progress = !cli.quiet && !cli.no_progress && !cli.json && !cli.list_types;
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || show_progress {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    // ── List-types mode ──────────────────────────────────────────────────
    if cli.list_types {
        for (ext, mime) in SUPPORTED_EXTENSIONS {
            println!("{:<10} {}", ext, mime);
        }
        return Ok(());
    }

    // ── Build config ─────────────────────────────────────────────────────
    let spinner = show_progress.then(CliProgressCallback::new);
    let progress_cb: Option<ProgressCallback> = spinner
        .clone()
        .map(|s| s as Arc<dyn JobProgressCallback>);

    let result = match build_config(&cli, progress_cb) {
        Ok(config) => run(&cli, &config).await,
        Err(e) => Err(e),
    };
    if let Some(ref spinner) = spinner {
        spinner.finish_on_error(&result);
    }
    result
}

async fn run(cli: &Cli, config: &ParseConfig) -> Result<()> {
    if let Some(ref job_id) = cli.job_id {
        let output = resume_job(job_id, config)
            .await
            .with_context(|| format!("Failed to finish job {job_id}"))?;
        return emit(cli, output).await;
    }

    let input = cli
        .input
        .as_deref()
        .context("An input path or URL is required")?;

    if let (Some(output_path), false) = (cli.output.as_ref(), cli.json) {
        let stats = parse_to_file(input, output_path, config)
            .await
            .context("Parsing failed")?;

        if !cli.quiet {
            eprintln!(
                "{}  {} polls  {}ms  →  {}",
                green("✔"),
                stats.poll_attempts,
                stats.total_duration_ms,
                bold(&output_path.display().to_string()),
            );
        }
        return Ok(());
    }

    let output = parse_file(input, config).await.context("Parsing failed")?;
    emit(cli, output).await
}

/// Print (or write) a finished parse.
async fn emit(cli: &Cli, output: ParseOutput) -> Result<()> {
    let rendered = if cli.json {
        serde_json::to_string_pretty(&output).context("Failed to serialise output")?
    } else {
        output.content.clone()
    };

    if let Some(ref path) = cli.output {
        tokio::fs::write(path, &rendered)
            .await
            .with_context(|| format!("Failed to write {}", path.display()))?;
    } else {
        let stdout = io::stdout();
        let mut handle = stdout.lock();
        handle
            .write_all(rendered.as_bytes())
            .context("Failed to write to stdout")?;
        if !rendered.ends_with('\n') {
            handle.write_all(b"\n").ok();
        }
    }

    if !cli.quiet && !cli.json {
        eprintln!(
            "   job {}  ·  {} polls  ·  {}ms total",
            dim(&output.job_id),
            output.stats.poll_attempts,
            output.stats.total_duration_ms,
        );
    }
    Ok(())
}

/// Map CLI args to `ParseConfig`.
fn build_config(cli: &Cli, progress: Option<ProgressCallback>) -> Result<ParseConfig> {
    let mut builder = ParseConfig::builder()
        .mode(cli.mode.into())
        .timeout_secs(cli.timeout)
        .check_interval_secs(cli.check_interval)
        .base_url(cli.base_url.clone())
        .fail_on_error_status(cli.fail_on_error_status);

    if let Some(ref key) = cli.api_key {
        builder = builder.api_key(key.clone());
    }
    if let Some(ref lang) = cli.language {
        builder = builder.language(lang.clone());
    }
    if let Some(cb) = progress {
        builder = builder.progress_callback(cb);
    }

    builder.build().context("Invalid configuration")
}
