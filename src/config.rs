//! Configuration types for a LlamaParse job.
//!
//! Every knob of a parse lives in [`ParseConfig`], built via its
//! [`ParseConfigBuilder`]. The config holds no file content; the bytes are
//! passed alongside it to [`crate::parse`], so one config can be reused
//! across many documents and shared between tasks.

use crate::error::ParseError;
use crate::progress::ProgressCallback;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// Production API root.
pub const BASE_URL: &str = "https://api.cloud.llamaindex.ai";

/// Environment variable read when no credential is passed explicitly.
pub const API_KEY_ENV: &str = "LLAMA_CLOUD_API_KEY";

pub const DEFAULT_MAX_TIMEOUT_SECS: u64 = 2000;
pub const DEFAULT_CHECK_INTERVAL_SECS: u64 = 1;

/// File name sent in the multipart `file` part when the caller gives none.
pub const DEFAULT_FILE_NAME: &str = "uploadfile";

/// Output format requested from the result endpoint.
///
/// The lowercase name doubles as the URL path segment and as the JSON key of
/// the payload in the result body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParseMode {
    #[default]
    Markdown,
    Text,
    Json,
}

impl ParseMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ParseMode::Markdown => "markdown",
            ParseMode::Text => "text",
            ParseMode::Json => "json",
        }
    }
}

impl fmt::Display for ParseMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ParseMode {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "markdown" | "md" => Ok(ParseMode::Markdown),
            "text" | "txt" => Ok(ParseMode::Text),
            "json" => Ok(ParseMode::Json),
            other => Err(ParseError::InvalidConfig(format!(
                "unknown mode '{other}' (expected markdown, text or json)"
            ))),
        }
    }
}

/// Configuration for a single parse.
///
/// Built via [`ParseConfig::builder()`] or using [`ParseConfig::default()`].
///
/// # Example
/// ```rust
/// use llamaparse::{ParseConfig, ParseMode};
/// use std::time::Duration;
///
/// let config = ParseConfig::builder()
///     .mode(ParseMode::Text)
///     .language("fr")
///     .timeout(Duration::from_secs(600))
///     .build()
///     .unwrap();
/// assert_eq!(config.mode, ParseMode::Text);
/// ```
#[derive(Clone)]
pub struct ParseConfig {
    /// Output format. Default: [`ParseMode::Markdown`].
    pub mode: ParseMode,

    /// Explicit API credential. If None, read from `api_key_env`.
    pub api_key: Option<String>,

    /// Name of the environment variable holding the fallback credential.
    /// Default: `LLAMA_CLOUD_API_KEY`.
    pub api_key_env: String,

    /// Language hint sent as the `language` form field. If None, the service
    /// detects the language itself.
    pub language: Option<String>,

    /// Overall budget for upload + polling + result fetch. Default: 2000 s.
    pub timeout: Duration,

    /// Delay before each status check. Default: 1 s.
    pub check_interval: Duration,

    /// API root. Default: [`BASE_URL`].
    pub base_url: String,

    /// File name reported in the multipart `file` part. Also drives the
    /// content-type guess for the part. Default: `"uploadfile"`.
    pub file_name: String,

    /// Stop polling on an upstream `ERROR` / `CANCELLED` status instead of
    /// waiting for the timeout. Default: false.
    pub fail_on_error_status: bool,

    /// Optional progress observer.
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for ParseConfig {
    fn default() -> Self {
        Self {
            mode: ParseMode::default(),
            api_key: None,
            api_key_env: API_KEY_ENV.to_string(),
            language: None,
            timeout: Duration::from_secs(DEFAULT_MAX_TIMEOUT_SECS),
            check_interval: Duration::from_secs(DEFAULT_CHECK_INTERVAL_SECS),
            base_url: BASE_URL.to_string(),
            file_name: DEFAULT_FILE_NAME.to_string(),
            fail_on_error_status: false,
            progress_callback: None,
        }
    }
}

impl fmt::Debug for ParseConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ParseConfig")
            .field("mode", &self.mode)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("api_key_env", &self.api_key_env)
            .field("language", &self.language)
            .field("timeout", &self.timeout)
            .field("check_interval", &self.check_interval)
            .field("base_url", &self.base_url)
            .field("file_name", &self.file_name)
            .field("fail_on_error_status", &self.fail_on_error_status)
            .field(
                "progress_callback",
                &self
                    .progress_callback
                    .as_ref()
                    .map(|_| "<dyn JobProgressCallback>"),
            )
            .finish()
    }
}

impl ParseConfig {
    /// Create a new builder for `ParseConfig`.
    pub fn builder() -> ParseConfigBuilder {
        ParseConfigBuilder {
            config: Self::default(),
        }
    }

    /// Resolve the credential for this config: explicit value first, then the
    /// configured environment variable.
    pub fn resolve_api_key(&self) -> Result<String, ParseError> {
        resolve_api_key_with(self.api_key.as_deref(), &self.api_key_env, |name| {
            std::env::var(name).ok()
        })
    }
}

/// Credential resolution with an injectable environment lookup.
///
/// Empty strings count as absent at both levels.
pub fn resolve_api_key_with<F>(
    explicit: Option<&str>,
    env_var: &str,
    lookup: F,
) -> Result<String, ParseError>
where
    F: FnOnce(&str) -> Option<String>,
{
    if let Some(key) = explicit.filter(|k| !k.is_empty()) {
        return Ok(key.to_string());
    }
    match lookup(env_var) {
        Some(key) if !key.is_empty() => Ok(key),
        _ => Err(ParseError::MissingCredential {
            env_var: env_var.to_string(),
        }),
    }
}

/// Builder for [`ParseConfig`].
#[derive(Debug)]
pub struct ParseConfigBuilder {
    config: ParseConfig,
}

impl ParseConfigBuilder {
    pub fn mode(mut self, mode: ParseMode) -> Self {
        self.config.mode = mode;
        self
    }

    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.config.api_key = Some(key.into());
        self
    }

    pub fn api_key_env(mut self, name: impl Into<String>) -> Self {
        self.config.api_key_env = name.into();
        self
    }

    pub fn language(mut self, language: impl Into<String>) -> Self {
        self.config.language = Some(language.into());
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = timeout;
        self
    }

    pub fn timeout_secs(self, secs: u64) -> Self {
        self.timeout(Duration::from_secs(secs))
    }

    pub fn check_interval(mut self, interval: Duration) -> Self {
        self.config.check_interval = interval;
        self
    }

    pub fn check_interval_secs(self, secs: u64) -> Self {
        self.check_interval(Duration::from_secs(secs))
    }

    /// Override the API root, e.g. for a regional endpoint or a test server.
    /// A trailing slash is stripped.
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        let url: String = url.into();
        self.config.base_url = url.trim_end_matches('/').to_string();
        self
    }

    pub fn file_name(mut self, name: impl Into<String>) -> Self {
        self.config.file_name = name.into();
        self
    }

    pub fn fail_on_error_status(mut self, v: bool) -> Self {
        self.config.fail_on_error_status = v;
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<ParseConfig, ParseError> {
        let c = &self.config;
        if c.timeout.is_zero() {
            return Err(ParseError::InvalidConfig("Timeout must be > 0".into()));
        }
        if c.check_interval.is_zero() {
            return Err(ParseError::InvalidConfig("Check interval must be > 0".into()));
        }
        if !(c.base_url.starts_with("http://") || c.base_url.starts_with("https://")) {
            return Err(ParseError::InvalidConfig(format!(
                "Base URL must be HTTP/HTTPS, got '{}'",
                c.base_url
            )));
        }
        if c.file_name.is_empty() {
            return Err(ParseError::InvalidConfig("File name must not be empty".into()));
        }
        Ok(self.config)
    }
}
