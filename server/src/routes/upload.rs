use axum::extract::{Multipart, State};
use axum::extract::multipart::MultipartRejection;
use axum::Json;
use policyscan::error::InputError;
use policyscan::{ContentAnalysis, Document, ExtractionMethod, ExtractionReport, InsuranceRecord};
use serde::Serialize;

use super::ApiError;
use crate::state::AppState;

const FILE_FIELD: &str = "file";

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub success: bool,
    pub data: InsuranceRecord,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pdf_analysis: Option<PdfAnalysis>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ocr_analysis: Option<OcrAnalysis>,
    pub extraction_method: ExtractionMethod,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct PdfAnalysis {
    #[serde(rename = "type")]
    pub pdf_type: String,
    pub total_pages: usize,
    pub text_pages: usize,
    pub image_pages: usize,
    pub mixed_pages: usize,
}

impl From<&ContentAnalysis> for PdfAnalysis {
    fn from(analysis: &ContentAnalysis) -> Self {
        Self {
            pdf_type: analysis.pdf_type.to_string(),
            total_pages: analysis.total_pages,
            text_pages: analysis.text_pages,
            image_pages: analysis.image_pages,
            mixed_pages: analysis.mixed_pages,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct OcrAnalysis {
    pub provider: String,
    pub total_pages: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub processing_ms: Option<u64>,
}

/// `POST /upload`: multipart PDF in the `file` field, extracted fields out.
pub async fn upload(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<UploadResponse>, ApiError> {
    let Ok(multipart) = multipart else {
        return Err(InputError::MissingFile.into());
    };

    let document = read_document(multipart).await?;
    tracing::info!(
        filename = %document.display_name(),
        bytes = document.len(),
        "Received upload"
    );

    let processed = state.pipeline.process(&document).await?;
    let extraction = processed.extraction;

    let (pdf_analysis, ocr_analysis, message) = match &extraction.report {
        ExtractionReport::Classified(analysis) => (
            Some(PdfAnalysis::from(analysis)),
            None,
            format!(
                "PDF processed successfully. Detected as {} content.",
                analysis.pdf_type
            ),
        ),
        ExtractionReport::RemoteOcr(summary) => (
            None,
            Some(OcrAnalysis {
                provider: summary.provider.clone(),
                total_pages: summary.total_pages,
                processing_ms: summary.processing_ms,
            }),
            format!(
                "PDF processed successfully using {} OCR.",
                summary.provider
            ),
        ),
    };

    Ok(Json(UploadResponse {
        success: true,
        data: processed.record,
        pdf_analysis,
        ocr_analysis,
        extraction_method: extraction.text.method,
        message,
    }))
}

/// Finds the `file` field and validates its filename before buffering it.
///
/// A `file` part without a filename parameter is a plain form value, not an
/// upload, and is skipped.
async fn read_document(mut multipart: Multipart) -> Result<Document, ApiError> {
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }
        let Some(filename) = field.file_name().map(str::to_string) else {
            continue;
        };

        policyscan::document::validate_pdf_filename(&filename)?;

        let bytes = field.bytes().await?;
        return Ok(Document::from_upload(&filename, bytes.to_vec())?);
    }

    Err(InputError::MissingFile.into())
}
