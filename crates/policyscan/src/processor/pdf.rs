use std::path::Path;
use std::process::Command;

use lopdf::{Dictionary, Object, ObjectId};
use tracing::debug;

use crate::error::ExtractError;

/// Page trees are shallow; this bounds the walk up `Parent` links in malformed files.
const MAX_PAGE_TREE_DEPTH: usize = 32;

/// Text and resource signals for one page, in document order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageContent {
    /// 1-based page number.
    pub number: u32,
    pub text: String,
    pub has_images: bool,
}

/// A parsed PDF.
pub struct PdfDocument {
    doc: lopdf::Document,
}

impl PdfDocument {
    pub fn load(pdf_bytes: &[u8]) -> Result<Self, ExtractError> {
        let doc = lopdf::Document::load_mem(pdf_bytes)
            .map_err(|e| ExtractError::ParsePdf(e.to_string()))?;
        Ok(Self { doc })
    }

    pub fn page_count(&self) -> usize {
        self.doc.get_pages().len()
    }

    /// Extracts text and inspects image resources for every page.
    pub fn pages(&self) -> Vec<PageContent> {
        self.doc
            .get_pages()
            .into_iter()
            .map(|(number, page_id)| PageContent {
                number,
                text: self.page_text(number),
                has_images: page_has_images(&self.doc, page_id),
            })
            .collect()
    }

    fn page_text(&self, number: u32) -> String {
        match self.doc.extract_text(&[number]) {
            Ok(text) => text,
            Err(e) => {
                // Undecodable pages are treated as textless so they get OCR'd
                debug!(page = number, error = %e, "Text extraction failed for page");
                String::new()
            }
        }
    }
}

/// Concatenates page texts, one newline after each page.
pub fn join_page_text(pages: &[PageContent]) -> String {
    let mut text = String::new();
    for page in pages {
        text.push_str(&page.text);
        text.push('\n');
    }
    text
}

/// Resources of a page, falling back to those inherited from ancestor `Pages` nodes.
fn inherited_resources(doc: &lopdf::Document, page_id: ObjectId) -> Option<&Dictionary> {
    let mut node = doc.get_dictionary(page_id).ok()?;

    for _ in 0..MAX_PAGE_TREE_DEPTH {
        if let Ok(resources) = node.get(b"Resources") {
            let (_, resolved) = doc.dereference(resources).ok()?;
            return resolved.as_dict().ok();
        }
        let parent = node.get(b"Parent").ok()?.as_reference().ok()?;
        node = doc.get_dictionary(parent).ok()?;
    }

    None
}

fn page_has_images(doc: &lopdf::Document, page_id: ObjectId) -> bool {
    let Some(resources) = inherited_resources(doc, page_id) else {
        return false;
    };

    let xobjects = resources
        .get(b"XObject")
        .ok()
        .and_then(|obj| doc.dereference(obj).ok())
        .and_then(|(_, obj)| obj.as_dict().ok());

    match xobjects {
        Some(xobjects) => xobjects.iter().any(|(_, obj)| is_image_xobject(doc, obj)),
        None => false,
    }
}

fn is_image_xobject(doc: &lopdf::Document, obj: &Object) -> bool {
    let Ok((_, resolved)) = doc.dereference(obj) else {
        return false;
    };

    let dict = match resolved {
        Object::Stream(stream) => &stream.dict,
        Object::Dictionary(dict) => dict,
        _ => return false,
    };

    dict.get(b"Subtype")
        .and_then(|subtype| subtype.as_name())
        .map(|name| name == b"Image")
        .unwrap_or(false)
}

/// Rasterizes single PDF pages for OCR.
pub trait PageRenderer: Send + Sync {
    /// Renders a 1-based page to encoded image bytes.
    fn render_page(&self, pdf_bytes: &[u8], page_number: u32) -> Result<Vec<u8>, ExtractError>;
}

/// Renders pages with poppler's `pdftoppm`, which must be on `PATH`.
#[derive(Debug, Clone)]
pub struct PdftoppmRenderer {
    dpi: u32,
}

impl PdftoppmRenderer {
    pub fn new(dpi: u32) -> Self {
        Self { dpi }
    }

    pub fn dpi(&self) -> u32 {
        self.dpi
    }
}

impl PageRenderer for PdftoppmRenderer {
    fn render_page(&self, pdf_bytes: &[u8], page_number: u32) -> Result<Vec<u8>, ExtractError> {
        let _span = tracing::debug_span!("processor.render", page = page_number).entered();
        let render_err = |message: String| ExtractError::Render {
            page: page_number,
            message,
        };

        let temp_dir = std::env::temp_dir();
        let run_id = uuid::Uuid::new_v4();
        let pdf_path = temp_dir.join(format!("policyscan_{}.pdf", run_id));
        let output_prefix = temp_dir.join(format!("policyscan_page_{}", run_id));

        std::fs::write(&pdf_path, pdf_bytes)
            .map_err(|e| render_err(format!("Failed to write temp PDF: {}", e)))?;

        let page_arg = page_number.to_string();
        let output = Command::new("pdftoppm")
            .arg("-png")
            .args(["-r", &self.dpi.to_string()])
            .args(["-f", &page_arg, "-l", &page_arg])
            .arg(&pdf_path)
            .arg(&output_prefix)
            .output();

        let _ = std::fs::remove_file(&pdf_path);

        let output = output.map_err(|e| {
            render_err(format!(
                "Failed to run pdftoppm: {}. Make sure poppler-utils is installed.",
                e
            ))
        })?;

        if !output.status.success() {
            return Err(render_err(format!(
                "pdftoppm failed: {}",
                String::from_utf8_lossy(&output.stderr)
            )));
        }

        // pdftoppm zero-pads the page suffix to the width of the page count
        let prefix = output_prefix.display();
        let candidates = [
            format!("{}-{}.png", prefix, page_number),
            format!("{}-{:02}.png", prefix, page_number),
            format!("{}-{:03}.png", prefix, page_number),
            format!("{}-{:04}.png", prefix, page_number),
        ];
        let image_path = candidates
            .iter()
            .find(|p| Path::new(p).exists())
            .ok_or_else(|| render_err("Failed to find rendered page image".to_string()))?;

        let image_data = std::fs::read(image_path)
            .map_err(|e| render_err(format!("Failed to read rendered image: {}", e)));

        let _ = std::fs::remove_file(image_path);

        image_data
    }
}
