use serde::{Deserialize, Serialize};

use crate::error::ExtractError;
use crate::processor::pdf::{PageContent, PdfDocument};

/// A page needs strictly more trimmed characters than this to count as text-bearing.
pub const MIN_TEXT_CHARS: usize = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PageKind {
    Text,
    Image,
    Mixed,
}

impl PageKind {
    pub fn from_signals(text: &str, has_images: bool) -> Self {
        let meaningful_text = text.trim().chars().count() > MIN_TEXT_CHARS;
        match (meaningful_text, has_images) {
            (true, false) => PageKind::Text,
            (true, true) => PageKind::Mixed,
            (false, _) => PageKind::Image,
        }
    }

    /// Pages whose content is at least partly raster and so benefits from OCR.
    pub fn needs_ocr(self) -> bool {
        matches!(self, PageKind::Image | PageKind::Mixed)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentType {
    TextDominant,
    ImageDominant,
    Mixed,
}

impl DocumentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentType::TextDominant => "text_dominant",
            DocumentType::ImageDominant => "image_dominant",
            DocumentType::Mixed => "mixed",
        }
    }
}

impl std::fmt::Display for DocumentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-page labels and their aggregate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentAnalysis {
    pub total_pages: usize,
    pub text_pages: usize,
    pub image_pages: usize,
    pub mixed_pages: usize,
    pub page_types: Vec<PageKind>,
    pub pdf_type: DocumentType,
}

impl ContentAnalysis {
    pub fn from_page_kinds(page_types: Vec<PageKind>) -> Self {
        let count = |kind: PageKind| page_types.iter().filter(|k| **k == kind).count();
        let text_pages = count(PageKind::Text);
        let image_pages = count(PageKind::Image);
        let mixed_pages = count(PageKind::Mixed);

        let pdf_type = if text_pages > image_pages {
            DocumentType::TextDominant
        } else if image_pages > text_pages {
            DocumentType::ImageDominant
        } else {
            DocumentType::Mixed
        };

        Self {
            total_pages: page_types.len(),
            text_pages,
            image_pages,
            mixed_pages,
            page_types,
            pdf_type,
        }
    }

    pub fn from_pages(pages: &[PageContent]) -> Self {
        Self::from_page_kinds(
            pages
                .iter()
                .map(|page| PageKind::from_signals(&page.text, page.has_images))
                .collect(),
        )
    }

    /// 1-based numbers of pages labelled `image` or `mixed`.
    pub fn ocr_page_numbers(&self) -> Vec<u32> {
        self.page_types
            .iter()
            .zip(1u32..)
            .filter(|(kind, _)| kind.needs_ocr())
            .map(|(_, number)| number)
            .collect()
    }
}

/// Parses the PDF and classifies every page.
pub fn classify_bytes(pdf_bytes: &[u8]) -> Result<ContentAnalysis, ExtractError> {
    let _span = tracing::debug_span!("processor.classify").entered();
    let doc = PdfDocument::load(pdf_bytes)?;
    Ok(ContentAnalysis::from_pages(&doc.pages()))
}
