//! Input resolution: turn a user-supplied path or URL into file bytes.
//!
//! The upload is a single in-memory multipart body, so both local files and
//! downloads end up as a `Vec<u8>`. The file name travels with the bytes: it
//! is reported to the service and picks the part's content type.

use crate::config::DEFAULT_FILE_NAME;
use crate::error::ParseError;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// A document ready for upload.
#[derive(Debug, Clone)]
pub struct ResolvedInput {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

/// Check if the input string looks like a URL.
pub fn is_url(input: &str) -> bool {
    input.starts_with("http://") || input.starts_with("https://")
}

/// Resolve the input string to document bytes.
///
/// URLs are downloaded with `timeout_secs` as the request timeout; anything
/// else is read as a local path.
pub async fn resolve_input(input: &str, timeout_secs: u64) -> Result<ResolvedInput, ParseError> {
    if input.trim().is_empty() {
        return Err(ParseError::InvalidInput {
            input: input.to_string(),
        });
    }
    if is_url(input) {
        download_url(input, timeout_secs).await
    } else {
        read_local(input).await
    }
}

async fn read_local(path_str: &str) -> Result<ResolvedInput, ParseError> {
    let path = PathBuf::from(path_str);

    let bytes = match tokio::fs::read(&path).await {
        Ok(b) => b,
        Err(e) if e.kind() == std::io::ErrorKind::PermissionDenied => {
            return Err(ParseError::PermissionDenied { path });
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(ParseError::FileNotFound { path });
        }
        Err(_) if path.is_dir() => {
            return Err(ParseError::InvalidInput {
                input: path_str.to_string(),
            });
        }
        Err(_) => return Err(ParseError::FileNotFound { path }),
    };

    debug!("Read local file: {} ({} bytes)", path.display(), bytes.len());
    Ok(ResolvedInput {
        file_name: file_name_of(&path),
        bytes,
    })
}

async fn download_url(url: &str, timeout_secs: u64) -> Result<ResolvedInput, ParseError> {
    info!("Downloading document from: {}", url);

    let download_failed = |reason: String| ParseError::DownloadFailed {
        url: url.to_string(),
        reason,
    };

    let client = reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(timeout_secs))
        .build()
        .map_err(|e| download_failed(e.to_string()))?;

    let response = client.get(url).send().await.map_err(|e| {
        if e.is_timeout() {
            download_failed(format!("timed out after {timeout_secs}s"))
        } else {
            download_failed(e.to_string())
        }
    })?;

    if !response.status().is_success() {
        return Err(download_failed(format!("HTTP {}", response.status())));
    }

    let bytes = response
        .bytes()
        .await
        .map_err(|e| download_failed(e.to_string()))?;

    info!("Downloaded {} bytes", bytes.len());
    Ok(ResolvedInput {
        file_name: extract_filename(url),
        bytes: bytes.to_vec(),
    })
}

fn file_name_of(path: &Path) -> String {
    path.file_name()
        .and_then(|n| n.to_str())
        .filter(|n| !n.is_empty())
        .unwrap_or(DEFAULT_FILE_NAME)
        .to_string()
}

/// Last URL path segment if it looks like a file name.
fn extract_filename(url: &str) -> String {
    if let Ok(parsed) = reqwest::Url::parse(url) {
        if let Some(mut segments) = parsed.path_segments() {
            if let Some(last) = segments.next_back() {
                if !last.is_empty() && last.contains('.') {
                    return last.to_string();
                }
            }
        }
    }

    DEFAULT_FILE_NAME.to_string()
}
