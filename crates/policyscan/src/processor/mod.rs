pub mod classifier;
pub mod heuristic;
pub mod ocr;
pub mod pdf;
pub mod remote;

#[cfg(test)]
mod fixtures;

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::config::schema::{Config, ExtractionStrategy};
use crate::document::Document;
use crate::error::{ConfigError, ExtractError};

pub use classifier::{ContentAnalysis, DocumentType, PageKind};
pub use heuristic::HeuristicExtractor;
pub use ocr::{OcrEngine, TesseractOcr};
pub use pdf::{PageRenderer, PdftoppmRenderer};
pub use remote::{RemoteOcrExtractor, RemoteOcrSummary};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtractionMethod {
    Text,
    Ocr,
    Hybrid,
    RemoteOcr,
}

/// Extracted document text and the method that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedText {
    pub content: String,
    pub method: ExtractionMethod,
}

impl ExtractedText {
    pub fn new(content: impl Into<String>, method: ExtractionMethod) -> Self {
        Self {
            content: content.into(),
            method,
        }
    }

    pub fn is_blank(&self) -> bool {
        self.content.trim().is_empty()
    }
}

/// How the text was obtained.
#[derive(Debug, Clone, PartialEq)]
pub enum ExtractionReport {
    Classified(ContentAnalysis),
    RemoteOcr(RemoteOcrSummary),
}

impl ExtractionReport {
    /// One sentence for the analysis prompt describing the text's provenance.
    pub fn context_line(&self) -> String {
        match self {
            ExtractionReport::Classified(analysis) => format!(
                "This content was extracted from a {} PDF with {} pages.",
                analysis.pdf_type, analysis.total_pages
            ),
            ExtractionReport::RemoteOcr(summary) => format!(
                "This content was extracted using {} OCR from a PDF with {} pages.",
                summary.provider, summary.total_pages
            ),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Extraction {
    pub text: ExtractedText,
    pub report: ExtractionReport,
}

#[async_trait]
pub trait DocumentExtractor: Send + Sync {
    async fn extract(&self, document: &Document) -> Result<Extraction, ExtractError>;
}

/// Builds the extractor selected by `extraction.strategy`.
pub fn build_extractor(config: &Config) -> Result<Arc<dyn DocumentExtractor>, ConfigError> {
    let extractor: Arc<dyn DocumentExtractor> = match config.extraction.strategy {
        ExtractionStrategy::Heuristic => {
            let ocr = TesseractOcr::new(&config.ocr.languages);
            let renderer = PdftoppmRenderer::new(config.ocr.dpi);
            Arc::new(HeuristicExtractor::new(Arc::new(ocr), Arc::new(renderer)))
        }
        ExtractionStrategy::RemoteOcr => {
            Arc::new(RemoteOcrExtractor::from_config(&config.remote_ocr)?)
        }
    };

    log::info!(
        "Using {} extraction strategy",
        config.extraction.strategy.as_str()
    );
    Ok(extractor)
}
