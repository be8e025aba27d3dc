use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use crate::config::schema::{Config, ExtractionStrategy, LogFormat, CONFIG_VERSION};
use crate::error::ConfigError;

const SCHEMA_JSON: &str = include_str!("../../../../schema/config-v1.json");

/// Environment variable naming the config file when no `--config` flag is given.
pub const CONFIG_PATH_ENV_VAR: &str = "POLICYSCAN_CONFIG";
pub const BIND_ADDRESS_ENV_VAR: &str = "POLICYSCAN_BIND_ADDRESS";
pub const STRATEGY_ENV_VAR: &str = "POLICYSCAN_EXTRACTION_STRATEGY";
pub const LOG_FORMAT_ENV_VAR: &str = "POLICYSCAN_LOG_FORMAT";

const MIN_DPI: u32 = 72;
const MAX_DPI: u32 = 1200;

pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config, ConfigError> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadFile {
        path: path.to_path_buf(),
        source: e,
    })?;

    load_config_from_str(&content)
}

pub fn load_config_from_str(content: &str) -> Result<Config, ConfigError> {
    let json_value: serde_json::Value = serde_json::from_str(content)?;

    validate_schema(&json_value)?;

    let config: Config = serde_json::from_value(json_value)?;

    validate_config(&config)?;

    Ok(config)
}

/// Loads the config file if one is named (explicitly or via `POLICYSCAN_CONFIG`),
/// otherwise starts from defaults. Environment overrides are applied last.
pub fn load_runtime_config(explicit_path: Option<&Path>) -> Result<Config, ConfigError> {
    let path: Option<PathBuf> = explicit_path.map(Path::to_path_buf).or_else(|| {
        std::env::var_os(CONFIG_PATH_ENV_VAR)
            .filter(|v| !v.is_empty())
            .map(PathBuf::from)
    });

    let mut config = match path {
        Some(path) => load_config(path)?,
        None => Config::default(),
    };

    apply_env_overrides(&mut config)?;
    validate_config(&config)?;

    Ok(config)
}

pub fn apply_env_overrides(config: &mut Config) -> Result<(), ConfigError> {
    if let Some(bind) = env_value(BIND_ADDRESS_ENV_VAR) {
        config.server.bind_address = bind;
    }

    if let Some(name) = env_value(STRATEGY_ENV_VAR) {
        config.extraction.strategy =
            ExtractionStrategy::from_name(&name).ok_or_else(|| ConfigError::Validation {
                message: format!(
                    "{} must be 'heuristic' or 'remote_ocr', got '{}'",
                    STRATEGY_ENV_VAR, name
                ),
            })?;
    }

    if let Some(name) = env_value(LOG_FORMAT_ENV_VAR) {
        config.logging.format =
            LogFormat::from_name(&name).ok_or_else(|| ConfigError::Validation {
                message: format!("{} must be 'text' or 'json', got '{}'", LOG_FORMAT_ENV_VAR, name),
            })?;
    }

    Ok(())
}

fn env_value(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn validate_schema(json_value: &serde_json::Value) -> Result<(), ConfigError> {
    let schema: serde_json::Value =
        serde_json::from_str(SCHEMA_JSON).map_err(|e| ConfigError::Validation {
            message: format!("Invalid embedded schema JSON: {}", e),
        })?;

    let validator = jsonschema::validator_for(&schema).map_err(|e| ConfigError::Validation {
        message: format!("Failed to compile JSON schema: {}", e),
    })?;

    let error_messages: Vec<String> = validator
        .iter_errors(json_value)
        .map(|e| e.to_string())
        .collect();
    if !error_messages.is_empty() {
        return Err(ConfigError::SchemaValidation {
            errors: error_messages.join("; "),
        });
    }

    Ok(())
}

pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.version != CONFIG_VERSION {
        return Err(ConfigError::Validation {
            message: format!("Unsupported config version: {}", config.version),
        });
    }

    if config.server.bind_address.parse::<SocketAddr>().is_err() {
        return Err(ConfigError::Validation {
            message: format!(
                "server.bind_address '{}' is not a valid socket address",
                config.server.bind_address
            ),
        });
    }

    if config.server.max_upload_bytes == 0 {
        return Err(ConfigError::Validation {
            message: "server.max_upload_bytes must be greater than zero".to_string(),
        });
    }

    if !(MIN_DPI..=MAX_DPI).contains(&config.ocr.dpi) {
        return Err(ConfigError::Validation {
            message: format!(
                "ocr.dpi must be between {} and {}, got {}",
                MIN_DPI, MAX_DPI, config.ocr.dpi
            ),
        });
    }

    if !(0.0..=2.0).contains(&config.llm.temperature) {
        return Err(ConfigError::Validation {
            message: format!(
                "llm.temperature must be between 0 and 2, got {}",
                config.llm.temperature
            ),
        });
    }

    if config.llm.model.trim().is_empty() {
        return Err(ConfigError::Validation {
            message: "llm.model must not be empty".to_string(),
        });
    }

    for (field, url) in [
        ("llm.base_url", &config.llm.base_url),
        ("remote_ocr.endpoint", &config.remote_ocr.endpoint),
    ] {
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(ConfigError::Validation {
                message: format!("{} must be an http(s) URL, got '{}'", field, url),
            });
        }
    }

    Ok(())
}
