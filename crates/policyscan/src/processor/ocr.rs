use std::sync::Arc;

use crate::error::ExtractError;

/// Recognizes text in a rendered page image.
pub trait OcrEngine: Send + Sync {
    fn recognize(&self, image_data: &[u8]) -> Result<String, ExtractError>;
}

/// Local OCR through Tesseract (via `leptess`).
#[derive(Clone)]
pub struct TesseractOcr {
    inner: Arc<TesseractOcrInner>,
}

struct TesseractOcrInner {
    languages: String,
}

impl TesseractOcr {
    pub fn new(languages: &[String]) -> Self {
        let lang_str = if languages.is_empty() {
            "eng".to_string()
        } else {
            languages.join("+")
        };

        Self {
            inner: Arc::new(TesseractOcrInner {
                languages: lang_str,
            }),
        }
    }

    pub fn languages(&self) -> &str {
        &self.inner.languages
    }
}

impl OcrEngine for TesseractOcr {
    fn recognize(&self, image_data: &[u8]) -> Result<String, ExtractError> {
        let _span = tracing::info_span!("processor.ocr").entered();

        let png_data = normalize_to_png(image_data)?;
        run_tesseract(&self.inner.languages, &png_data)
    }
}

/// Decodes any supported raster format and re-encodes it as PNG for Tesseract.
fn normalize_to_png(image_data: &[u8]) -> Result<Vec<u8>, ExtractError> {
    let img = image::load_from_memory(image_data)
        .map_err(|e| ExtractError::OcrFailed(format!("Failed to load image: {}", e)))?;

    let mut png_data = Vec::new();
    img.write_to(
        &mut std::io::Cursor::new(&mut png_data),
        image::ImageFormat::Png,
    )
    .map_err(|e| ExtractError::OcrFailed(format!("Failed to convert image: {}", e)))?;

    Ok(png_data)
}

#[cfg(feature = "tesseract")]
fn run_tesseract(languages: &str, png_data: &[u8]) -> Result<String, ExtractError> {
    // Fresh instance per page
    let mut lt = leptess::LepTess::new(None, languages).map_err(|e| {
        ExtractError::OcrFailed(format!("Failed to initialize Tesseract: {}", e))
    })?;

    lt.set_image_from_mem(png_data)
        .map_err(|e| ExtractError::OcrFailed(format!("Failed to set image for OCR: {}", e)))?;

    lt.get_utf8_text()
        .map_err(|e| ExtractError::OcrFailed(format!("Tesseract failed: {}", e)))
}

#[cfg(not(feature = "tesseract"))]
fn run_tesseract(_languages: &str, _png_data: &[u8]) -> Result<String, ExtractError> {
    Err(ExtractError::OcrFailed(
        "policyscan was built without the `tesseract` feature; use the remote_ocr strategy"
            .to_string(),
    ))
}
