use std::sync::Arc;

use tracing::{debug, info, info_span, Instrument};

use crate::analyzer::{FieldAnalyzer, InsuranceRecord};
use crate::config::schema::Config;
use crate::document::Document;
use crate::error::ConfigError;
use crate::processor::{build_extractor, DocumentExtractor, Extraction};

use super::error::PipelineError;

/// Result of running one document through extraction and analysis.
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessedDocument {
    pub record: InsuranceRecord,
    pub extraction: Extraction,
}

/// Extraction followed by field analysis. Immutable and shared across requests.
pub struct Pipeline {
    extractor: Arc<dyn DocumentExtractor>,
    analyzer: FieldAnalyzer,
}

impl Pipeline {
    pub fn new(extractor: Arc<dyn DocumentExtractor>, analyzer: FieldAnalyzer) -> Self {
        Self {
            extractor,
            analyzer,
        }
    }

    /// Builds the extractor and the LLM client described by `config`.
    pub fn from_config(config: &Config) -> Result<Self, ConfigError> {
        let extractor = build_extractor(config)?;
        let analyzer = FieldAnalyzer::from_config(&config.llm)?;
        Ok(Self::new(extractor, analyzer))
    }

    pub async fn process(&self, document: &Document) -> Result<ProcessedDocument, PipelineError> {
        let span = info_span!(
            "pipeline",
            filename = %document.display_name(),
            bytes = document.len(),
        );

        self.run_steps(document).instrument(span).await
    }

    async fn run_steps(&self, document: &Document) -> Result<ProcessedDocument, PipelineError> {
        // Step 1: Extract text
        let extraction = self
            .extractor
            .extract(document)
            .instrument(info_span!("extract"))
            .await?;
        debug!(
            method = ?extraction.text.method,
            chars = extraction.text.content.chars().count(),
            "Extracted document text"
        );

        // Step 2: Analyze fields
        let context = extraction.report.context_line();
        let record = self
            .analyzer
            .analyze(&extraction.text.content, &context)
            .instrument(info_span!("analyze"))
            .await?;

        info!(found = record.found_count(), "Document processed");
        Ok(ProcessedDocument { record, extraction })
    }
}
