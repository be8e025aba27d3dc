pub mod loader;
pub mod schema;

pub use loader::{load_config, load_config_from_str, load_runtime_config, validate_config};
pub use schema::{
    Config, ExtractionConfig, ExtractionStrategy, LlmConfig, LogFormat, LoggingConfig, OcrConfig,
    RemoteOcrConfig, ServerConfig,
};
