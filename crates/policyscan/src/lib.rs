pub mod analyzer;
pub mod config;
pub mod document;
pub mod error;
pub mod pipeline;
pub mod processor;
pub mod sanitize;
pub mod secrets;
pub mod spreadsheet;

pub use analyzer::{ChatCompletion, FieldAnalyzer, InsuranceRecord, OpenAiChatClient};
pub use config::{load_config, load_runtime_config, Config, ExtractionStrategy};
pub use document::Document;
pub use error::{
    AnalysisError, ConfigError, ExtractError, InputError, PolicyscanError, Result,
    SpreadsheetError,
};
pub use pipeline::{Pipeline, PipelineError, ProcessedDocument};
pub use processor::{
    ContentAnalysis, DocumentExtractor, DocumentType, ExtractedText, Extraction,
    ExtractionMethod, ExtractionReport, PageKind,
};
pub use secrets::SecretError;
