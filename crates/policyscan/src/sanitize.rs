//! Helpers for sanitizing data before it enters tracing span attributes.
//!
//! Uploaded filenames can carry client directory paths, and model replies can
//! carry customer data, so neither goes into logs unabridged.

/// Returns only the final component of a client-supplied filename.
///
/// Browsers on some platforms send the full local path; both `/` and `\`
/// separators are stripped.
pub fn redact_filename(filename: &str) -> String {
    let name = filename
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or_default()
        .trim();
    if name.is_empty() {
        "<unnamed>".to_string()
    } else {
        name.to_string()
    }
}

/// Truncates text to at most `max_chars` characters, marking the cut.
pub fn truncate_for_log(text: &str, max_chars: usize) -> String {
    let total = text.chars().count();
    if total <= max_chars {
        return text.to_string();
    }
    let kept: String = text.chars().take(max_chars).collect();
    format!("{}… ({} more chars)", kept, total - max_chars)
}
