//! Extraction through an OCR.space-compatible HTTP API.
//!
//! The whole PDF is uploaded in one multipart request; the provider returns
//! one parsed result per page, which are joined with `--- Page N ---` markers.

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use tracing::{info, Instrument};

use crate::config::schema::RemoteOcrConfig;
use crate::document::Document;
use crate::error::{ConfigError, ExtractError};
use crate::processor::{
    DocumentExtractor, ExtractedText, Extraction, ExtractionMethod, ExtractionReport,
};
use crate::secrets::SecretSource;

pub const PROVIDER_NAME: &str = "OCR.space";

/// What the remote provider reported about a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteOcrSummary {
    pub provider: String,
    pub total_pages: usize,
    pub processing_ms: Option<u64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct OcrSpaceResponse {
    #[serde(default)]
    parsed_results: Vec<OcrSpacePage>,
    #[serde(default)]
    is_errored_on_processing: bool,
    /// A string or a list of strings depending on the failure.
    #[serde(default)]
    error_message: serde_json::Value,
    /// Reported as a string of digits.
    #[serde(default, rename = "ProcessingTimeInMilliseconds")]
    processing_time: serde_json::Value,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct OcrSpacePage {
    #[serde(default)]
    parsed_text: String,
}

impl OcrSpaceResponse {
    fn error_text(&self) -> String {
        let message = match &self.error_message {
            serde_json::Value::String(s) => s.clone(),
            serde_json::Value::Array(items) => items
                .iter()
                .filter_map(|item| item.as_str())
                .collect::<Vec<_>>()
                .join("; "),
            _ => String::new(),
        };
        if message.trim().is_empty() {
            "Unknown OCR error".to_string()
        } else {
            message
        }
    }

    fn processing_ms(&self) -> Option<u64> {
        match &self.processing_time {
            serde_json::Value::String(s) => s.trim().parse().ok(),
            serde_json::Value::Number(n) => n.as_u64(),
            _ => None,
        }
    }

    fn has_text(&self) -> bool {
        self.parsed_results
            .iter()
            .any(|page| !page.parsed_text.trim().is_empty())
    }

    fn joined_text(&self) -> String {
        let mut text = String::new();
        for (index, page) in self.parsed_results.iter().enumerate() {
            text.push_str(&format!(
                "\n--- Page {} ---\n{}\n",
                index + 1,
                page.parsed_text
            ));
        }
        text
    }
}

pub struct RemoteOcrExtractor {
    client: reqwest::Client,
    endpoint: String,
    language: String,
    engine: u8,
    api_key: Option<SecretString>,
    api_key_env: String,
}

impl RemoteOcrExtractor {
    pub fn new(config: &RemoteOcrConfig, api_key: Option<SecretString>) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: config.endpoint.clone(),
            language: config.language.clone(),
            engine: config.engine,
            api_key,
            api_key_env: config.api_key_env.clone(),
        }
    }

    /// Resolves the API key from the configured file or environment variable.
    ///
    /// An unset key is allowed here; requests fail with
    /// [`ExtractError::MissingApiKey`] until it is provided.
    pub fn from_config(config: &RemoteOcrConfig) -> Result<Self, ConfigError> {
        let api_key = SecretSource::new(
            config.api_key_file.as_deref(),
            Some(config.api_key_env.as_str()),
        )
        .resolve_optional()
        .map_err(|source| ConfigError::Secret {
            service: "remote_ocr",
            source,
        })?;

        if api_key.is_none() {
            log::warn!(
                "No OCR API key found in {}; remote OCR requests will fail",
                config.api_key_env
            );
        }

        Ok(Self::new(config, api_key))
    }

    async fn extract_remote(&self, document: &Document) -> Result<Extraction, ExtractError> {
        let api_key = self
            .api_key
            .as_ref()
            .ok_or_else(|| ExtractError::MissingApiKey {
                env_var: self.api_key_env.clone(),
            })?;

        let form = self.build_form(api_key, document)?;
        let response = self
            .client
            .post(&self.endpoint)
            .multipart(form)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ExtractError::RemoteOcr(format!(
                "HTTP {}: {}",
                status.as_u16(),
                body.trim()
            )));
        }

        let parsed: OcrSpaceResponse = response.json().await?;
        if parsed.is_errored_on_processing {
            return Err(ExtractError::RemoteOcr(parsed.error_text()));
        }

        if !parsed.has_text() {
            return Err(ExtractError::NoContent);
        }

        let summary = RemoteOcrSummary {
            provider: PROVIDER_NAME.to_string(),
            total_pages: parsed.parsed_results.len(),
            processing_ms: parsed.processing_ms(),
        };
        info!(
            pages = summary.total_pages,
            processing_ms = ?summary.processing_ms,
            "Remote OCR finished"
        );

        Ok(Extraction {
            text: ExtractedText::new(parsed.joined_text(), ExtractionMethod::RemoteOcr),
            report: ExtractionReport::RemoteOcr(summary),
        })
    }

    fn build_form(&self, api_key: &SecretString, document: &Document) -> Result<Form, ExtractError> {
        let file = Part::bytes(document.bytes().to_vec())
            .file_name(document.display_name())
            .mime_str("application/pdf")?;

        Ok(Form::new()
            .text("apikey", api_key.expose_secret().to_string())
            .text("language", self.language.clone())
            .text("OCREngine", self.engine.to_string())
            .text("filetype", "PDF")
            .text("scale", "true")
            .part("file", file))
    }
}

#[async_trait]
impl DocumentExtractor for RemoteOcrExtractor {
    async fn extract(&self, document: &Document) -> Result<Extraction, ExtractError> {
        let span = tracing::info_span!(
            "processor.remote_ocr",
            provider = PROVIDER_NAME,
            bytes = document.len()
        );

        self.extract_remote(document).instrument(span).await
    }
}
