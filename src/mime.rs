//! File types accepted by the LlamaParse service.
//!
//! Advisory only: nothing in the parse path rejects a file because it is
//! missing from these tables. Callers can use them to validate input up front,
//! and the upload stage uses [`mime_for_path`] to label the multipart part.

use std::path::Path;

/// Fallback content type for the upload part.
pub const OCTET_STREAM: &str = "application/octet-stream";

/// Extension (lowercase, no dot) → MIME type.
pub const SUPPORTED_EXTENSIONS: &[(&str, &str)] = &[
    ("pdf", "application/pdf"),
    // Documents
    ("cgm", "image/cgm"),
    ("doc", "application/msword"),
    (
        "docx",
        "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
    ),
    ("docm", "application/vnd.ms-word.document.macroEnabled.12"),
    ("dot", "text/vnd.graphviz"),
    ("dotm", "application/vnd.ms-word.template.macroEnabled.12"),
    ("lwp", "application/vnd.lotus-wordpro"),
    ("pages", "application/vnd.apple.pages"),
    ("pbd", "application/vnd.powerbuilder6"),
    ("rtf", "application/rtf"),
    ("sdp", "application/sdp"),
    ("sxw", "application/vnd.sun.xml.writer"),
    ("stw", "application/vnd.sun.xml.writer.template"),
    ("sxg", "application/vnd.sun.xml.writer.global"),
    ("txt", "text/plain"),
    ("wpd", "application/vnd.wordperfect"),
    ("wps", "application/vnd.ms-works"),
    ("xml", "text/xml"),
    ("epub", "application/epub+zip"),
    // Presentations
    ("ppt", "application/vnd.ms-powerpoint"),
    ("pptm", "application/vnd.ms-powerpoint.presentation.macroEnabled.12"),
    (
        "pptx",
        "application/vnd.openxmlformats-officedocument.presentationml.presentation",
    ),
    ("pot", "application/vnd.ms-powerpoint"),
    ("potm", "application/vnd.ms-powerpoint.template.macroEnabled.12"),
    (
        "potx",
        "application/vnd.openxmlformats-officedocument.presentationml.template",
    ),
    ("sti", "application/vnd.sun.xml.impress.template"),
    ("sxi", "application/vnd.sun.xml.impress"),
    // Images
    ("jpg", "image/jpeg"),
    ("jpeg", "image/jpeg"),
    ("png", "image/png"),
    ("gif", "image/gif"),
    ("bmp", "image/bmp"),
    ("svg", "image/svg+xml"),
    ("tiff", "image/tiff"),
    ("webp", "image/webp"),
    // Web
    ("htm", "text/html"),
    ("html", "text/html"),
    // Spreadsheets
    (
        "xlsx",
        "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
    ),
    ("xls", "application/vnd.ms-excel"),
    ("xlsm", "application/vnd.ms-excel.sheet.macroEnabled.12"),
    ("xlsb", "application/vnd.ms-excel.sheet.binary.macroEnabled.12"),
    ("xlw", "application/vnd.ms-excel"),
    ("csv", "text/csv"),
    ("numbers", "application/vnd.apple.numbers"),
    ("ods", "application/vnd.oasis.opendocument.spreadsheet"),
    ("dbf", "application/vnd.dbf"),
    ("wk1", "application/vnd.lotus-1-2-3"),
    ("wk2", "application/vnd.lotus-1-2-3"),
    ("wk3", "application/vnd.lotus-1-2-3"),
    ("wk4", "application/vnd.lotus-1-2-3"),
    ("wks", "application/vnd.ms-works"),
    ("123", "application/vnd.lotus-1-2-3"),
    ("tsv", "text/tab-separated-values"),
];

/// Distinct MIME types from [`SUPPORTED_EXTENSIONS`], in first-seen order.
pub const SUPPORTED_MIME_TYPES: &[&str] = &[
    "application/pdf",
    "image/cgm",
    "application/msword",
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
    "application/vnd.ms-word.document.macroEnabled.12",
    "text/vnd.graphviz",
    "application/vnd.ms-word.template.macroEnabled.12",
    "application/vnd.lotus-wordpro",
    "application/vnd.apple.pages",
    "application/vnd.powerbuilder6",
    "application/rtf",
    "application/sdp",
    "application/vnd.sun.xml.writer",
    "application/vnd.sun.xml.writer.template",
    "application/vnd.sun.xml.writer.global",
    "text/plain",
    "application/vnd.wordperfect",
    "application/vnd.ms-works",
    "text/xml",
    "application/epub+zip",
    "application/vnd.ms-powerpoint",
    "application/vnd.ms-powerpoint.presentation.macroEnabled.12",
    "application/vnd.openxmlformats-officedocument.presentationml.presentation",
    "application/vnd.ms-powerpoint.template.macroEnabled.12",
    "application/vnd.openxmlformats-officedocument.presentationml.template",
    "application/vnd.sun.xml.impress.template",
    "application/vnd.sun.xml.impress",
    "image/jpeg",
    "image/png",
    "image/gif",
    "image/bmp",
    "image/svg+xml",
    "image/tiff",
    "image/webp",
    "text/html",
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
    "application/vnd.ms-excel",
    "application/vnd.ms-excel.sheet.macroEnabled.12",
    "application/vnd.ms-excel.sheet.binary.macroEnabled.12",
    "text/csv",
    "application/vnd.apple.numbers",
    "application/vnd.oasis.opendocument.spreadsheet",
    "application/vnd.dbf",
    "application/vnd.lotus-1-2-3",
    "text/tab-separated-values",
];

/// Is `mime` one of the service's supported types? Parameters such as
/// `; charset=utf-8` are ignored and the comparison is case-insensitive.
pub fn is_supported_mime(mime: &str) -> bool {
    let essence = mime.split(';').next().unwrap_or("").trim();
    SUPPORTED_MIME_TYPES
        .iter()
        .any(|m| m.eq_ignore_ascii_case(essence))
}

/// MIME type for a file extension (with or without the leading dot).
pub fn mime_for_extension(ext: &str) -> Option<&'static str> {
    let ext = ext.trim_start_matches('.');
    SUPPORTED_EXTENSIONS
        .iter()
        .find(|(e, _)| e.eq_ignore_ascii_case(ext))
        .map(|(_, m)| *m)
}

/// MIME type for a path, judged by its extension.
pub fn mime_for_path(path: impl AsRef<Path>) -> Option<&'static str> {
    path.as_ref()
        .extension()
        .and_then(|e| e.to_str())
        .and_then(mime_for_extension)
}
