use std::sync::Arc;

use crate::error::{ExtractError, InputError};
use crate::sanitize;

/// An uploaded PDF, held in memory for the duration of one request.
#[derive(Debug, Clone)]
pub struct Document {
    filename: String,
    bytes: Arc<[u8]>,
}

impl Document {
    pub fn new(filename: impl Into<String>, bytes: impl Into<Arc<[u8]>>) -> Self {
        Self {
            filename: filename.into(),
            bytes: bytes.into(),
        }
    }

    /// Validates an upload's filename before accepting its bytes.
    pub fn from_upload(filename: &str, bytes: Vec<u8>) -> Result<Self, InputError> {
        let filename = validate_pdf_filename(filename)?;
        Ok(Self::new(filename, bytes))
    }

    pub fn filename(&self) -> &str {
        &self.filename
    }

    /// Filename with any client directory components removed, for logs.
    pub fn display_name(&self) -> String {
        sanitize::redact_filename(&self.filename)
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn shared_bytes(&self) -> Arc<[u8]> {
        Arc::clone(&self.bytes)
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Parses the document to count its pages.
    pub fn page_count(&self) -> Result<usize, ExtractError> {
        let doc = lopdf::Document::load_mem(&self.bytes)
            .map_err(|e| ExtractError::ParsePdf(e.to_string()))?;
        Ok(doc.get_pages().len())
    }
}

/// Accepts only non-empty filenames ending in `.pdf` (any case).
///
/// Only the empty string counts as "no file selected"; a whitespace name is
/// judged by its extension like any other.
pub fn validate_pdf_filename(filename: &str) -> Result<&str, InputError> {
    if filename.is_empty() {
        return Err(InputError::NoFileSelected);
    }

    if !filename.to_lowercase().ends_with(".pdf") {
        return Err(InputError::NotPdf);
    }

    Ok(filename)
}
