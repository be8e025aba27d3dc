use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PolicyscanError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("{0}")]
    Input(#[from] InputError),

    #[error("Extraction error: {0}")]
    Extract(#[from] ExtractError),

    #[error("Analysis error: {0}")]
    Analysis(#[from] AnalysisError),

    #[error("Spreadsheet error: {0}")]
    Spreadsheet(#[from] SpreadsheetError),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config JSON: {0}")]
    ParseJson(#[from] serde_json::Error),

    #[error("Config validation failed: {message}")]
    Validation { message: String },

    #[error("Schema validation failed: {errors}")]
    SchemaValidation { errors: String },

    #[error("Invalid secret reference for {service}: {source}")]
    Secret {
        service: &'static str,
        #[source]
        source: crate::secrets::SecretError,
    },
}

/// Request-level validation failures. The messages are shown to API clients verbatim.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InputError {
    #[error("No file uploaded")]
    MissingFile,

    #[error("No file selected")]
    NoFileSelected,

    #[error("Only PDF files are allowed")]
    NotPdf,

    #[error("No data provided")]
    NoData,
}

#[derive(Error, Debug)]
pub enum ExtractError {
    #[error("Failed to parse PDF: {0}")]
    ParsePdf(String),

    #[error("Failed to render PDF page {page}: {message}")]
    Render { page: u32, message: String },

    #[error("OCR failed: {0}")]
    OcrFailed(String),

    #[error("Remote OCR service returned an error: {0}")]
    RemoteOcr(String),

    #[error("Remote OCR request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("OCR API key not configured: set the {env_var} environment variable")]
    MissingApiKey { env_var: String },

    #[error("No text could be extracted from the document")]
    NoContent,

    #[error("Extraction task failed: {0}")]
    Task(String),
}

#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error("LLM API key not configured: set the {env_var} environment variable")]
    MissingApiKey { env_var: String },

    #[error("LLM request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("LLM provider returned {status}: {message}")]
    Provider { status: u16, message: String },

    #[error("LLM returned an empty reply")]
    EmptyReply,

    #[error("Failed to parse model response: {0}")]
    MalformedReply(String),
}

#[derive(Error, Debug)]
pub enum SpreadsheetError {
    #[error("Failed to write workbook: {0}")]
    Write(String),

    #[error("Failed to read workbook: {0}")]
    Read(String),

    #[error("Workbook archive error: {0}")]
    Archive(#[from] zip::result::ZipError),

    #[error("Workbook is missing part '{0}'")]
    MissingPart(String),
}

pub type Result<T> = std::result::Result<T, PolicyscanError>;
