//! Upload form construction.
//!
//! The upload endpoint expects `multipart/form-data` with the document in a
//! `file` part and an optional `language` text field. `reqwest` generates the
//! boundary and the matching `Content-Type` header when the form is attached
//! to a request.

use crate::error::ParseError;
use crate::mime::{mime_for_path, OCTET_STREAM};
use reqwest::multipart::{Form, Part};
use tracing::debug;

/// Build the upload form.
///
/// Fails fast with [`ParseError::EmptyInput`] on zero-length content. The
/// part's content type is guessed from `file_name`'s extension.
pub fn build_form(
    file: &[u8],
    file_name: &str,
    language: Option<&str>,
) -> Result<Form, ParseError> {
    if file.is_empty() {
        return Err(ParseError::EmptyInput);
    }

    let mime = mime_for_path(file_name).unwrap_or(OCTET_STREAM);
    let part = Part::bytes(file.to_vec())
        .file_name(file_name.to_string())
        .mime_str(mime)?;

    let mut form = Form::new().part("file", part);
    if let Some(lang) = language.filter(|l| !l.is_empty()) {
        form = form.text("language", lang.to_string());
    }

    debug!(
        "Built upload form: {} bytes as '{}' ({}), language={:?}",
        file.len(),
        file_name,
        mime,
        language
    );
    Ok(form)
}
