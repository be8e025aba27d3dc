use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info};

use crate::document::Document;
use crate::error::ExtractError;
use crate::processor::classifier::{ContentAnalysis, DocumentType};
use crate::processor::ocr::OcrEngine;
use crate::processor::pdf::{join_page_text, PageContent, PageRenderer, PdfDocument};
use crate::processor::{
    DocumentExtractor, ExtractedText, Extraction, ExtractionMethod, ExtractionReport,
};

/// Below this many trimmed characters, hybrid extraction OCRs the whole document instead.
pub const HYBRID_MIN_TEXT_CHARS: usize = 100;

const OCR_SUPPLEMENT_HEADER: &str = "\n\n--- OCR EXTRACTED CONTENT ---\n";

/// Classifies pages locally, then extracts with text, OCR, or both.
#[derive(Clone)]
pub struct HeuristicExtractor {
    ocr: Arc<dyn OcrEngine>,
    renderer: Arc<dyn PageRenderer>,
}

impl HeuristicExtractor {
    pub fn new(ocr: Arc<dyn OcrEngine>, renderer: Arc<dyn PageRenderer>) -> Self {
        Self { ocr, renderer }
    }

    /// Runs classification and extraction on the calling thread.
    pub fn extract_blocking(&self, pdf_bytes: &[u8]) -> Result<Extraction, ExtractError> {
        let _span = tracing::info_span!("processor.pdf").entered();

        let doc = PdfDocument::load(pdf_bytes)?;
        let pages = doc.pages();
        let analysis = ContentAnalysis::from_pages(&pages);

        info!(
            pdf_type = %analysis.pdf_type,
            total_pages = analysis.total_pages,
            text_pages = analysis.text_pages,
            image_pages = analysis.image_pages,
            mixed_pages = analysis.mixed_pages,
            "Classified PDF content"
        );

        let text = match analysis.pdf_type {
            DocumentType::TextDominant => {
                ExtractedText::new(join_page_text(&pages), ExtractionMethod::Text)
            }
            DocumentType::ImageDominant => {
                ExtractedText::new(self.ocr_all(pdf_bytes, &pages)?, ExtractionMethod::Ocr)
            }
            DocumentType::Mixed => self.hybrid(pdf_bytes, &pages, &analysis)?,
        };

        if text.is_blank() {
            return Err(ExtractError::NoContent);
        }

        Ok(Extraction {
            text,
            report: ExtractionReport::Classified(analysis),
        })
    }

    fn hybrid(
        &self,
        pdf_bytes: &[u8],
        pages: &[PageContent],
        analysis: &ContentAnalysis,
    ) -> Result<ExtractedText, ExtractError> {
        let _span = tracing::info_span!("processor.hybrid").entered();

        let mut content = join_page_text(pages);
        let text_chars = content.trim().chars().count();

        if text_chars < HYBRID_MIN_TEXT_CHARS {
            debug!(
                text_chars,
                "Too little extractable text, falling back to full OCR"
            );
            return Ok(ExtractedText::new(
                self.ocr_all(pdf_bytes, pages)?,
                ExtractionMethod::Ocr,
            ));
        }

        // Only documents with at least one pure image page get the supplement
        if analysis.image_pages > 0 {
            content.push_str(OCR_SUPPLEMENT_HEADER);
            for number in analysis.ocr_page_numbers() {
                let page_text = self.ocr_page(pdf_bytes, number)?;
                content.push_str(&format!("\n--- OCR Page {} ---\n{}\n", number, page_text));
            }
        }

        Ok(ExtractedText::new(content, ExtractionMethod::Hybrid))
    }

    /// OCRs every page; fails with [`ExtractError::NoContent`] when no page yields text.
    fn ocr_all(&self, pdf_bytes: &[u8], pages: &[PageContent]) -> Result<String, ExtractError> {
        let mut all_text = String::new();
        let mut recognized_any = false;
        for page in pages {
            let page_text = self.ocr_page(pdf_bytes, page.number)?;
            recognized_any |= !page_text.trim().is_empty();
            all_text.push_str(&format!("\n--- Page {} ---\n{}\n", page.number, page_text));
        }
        if !recognized_any {
            return Err(ExtractError::NoContent);
        }
        Ok(all_text)
    }

    fn ocr_page(&self, pdf_bytes: &[u8], page_number: u32) -> Result<String, ExtractError> {
        let image = self.renderer.render_page(pdf_bytes, page_number)?;
        let text = self.ocr.recognize(&image)?;
        debug!(page = page_number, chars = text.len(), "OCR'd page");
        Ok(text)
    }
}

#[async_trait]
impl DocumentExtractor for HeuristicExtractor {
    async fn extract(&self, document: &Document) -> Result<Extraction, ExtractError> {
        let extractor = self.clone();
        let bytes = document.shared_bytes();
        let span = tracing::Span::current();

        tokio::task::spawn_blocking(move || {
            let _entered = span.enter();
            extractor.extract_blocking(&bytes)
        })
        .await
        .map_err(|e| ExtractError::Task(e.to_string()))?
    }
}
