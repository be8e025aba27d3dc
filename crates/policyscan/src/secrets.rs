//! API key resolution for the external OCR and LLM services.
//!
//! Keys are looked up in priority order:
//!
//! 1. **File reference** - Docker secrets pattern (e.g. `api_key_file: /run/secrets/openai`)
//! 2. **Env var reference** - the common case (e.g. `api_key_env: OPENAI_API_KEY`)
//!
//! A key that is simply absent is not an error at startup. Clients hold an
//! `Option<SecretString>` and report a descriptive error on the request that
//! needs the key.

use secrecy::SecretString;
use std::fs;

/// Error type for secret resolution failures.
#[derive(Debug, thiserror::Error)]
pub enum SecretError {
    #[error("No secret source provided (need a file path or an env var name)")]
    NoSourceProvided,

    #[error("Failed to read secret from file '{path}': {source}")]
    FileReadError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Secret file '{path}' is empty")]
    EmptyFile { path: String },

    #[error("Environment variable '{name}' not set")]
    EnvVarNotSet { name: String },

    #[error("Environment variable '{name}' contains invalid UTF-8")]
    EnvVarNotUnicode { name: String },
}

pub type Result<T> = std::result::Result<T, SecretError>;

/// Where a service's API key comes from.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SecretSource<'a> {
    pub file_path: Option<&'a str>,
    pub env_var: Option<&'a str>,
}

impl<'a> SecretSource<'a> {
    pub fn new(file_path: Option<&'a str>, env_var: Option<&'a str>) -> Self {
        Self { file_path, env_var }
    }

    /// Resolves the secret, failing if no source yields a value.
    pub fn resolve(&self) -> Result<SecretString> {
        if let Some(path) = self.file_path.filter(|p| !p.is_empty()) {
            let expanded = expand_home(path);
            let content =
                fs::read_to_string(&expanded).map_err(|e| SecretError::FileReadError {
                    path: expanded.clone(),
                    source: e,
                })?;
            let trimmed = content.trim();
            if trimmed.is_empty() {
                return Err(SecretError::EmptyFile { path: expanded });
            }
            return Ok(SecretString::from(trimmed.to_string()));
        }

        if let Some(var_name) = self.env_var.filter(|v| !v.is_empty()) {
            return match std::env::var(var_name) {
                // Env files often leave a trailing newline
                Ok(value) if !value.trim().is_empty() => Ok(SecretString::from(value.trim().to_string())),
                Ok(_) | Err(std::env::VarError::NotPresent) => Err(SecretError::EnvVarNotSet {
                    name: var_name.to_string(),
                }),
                Err(std::env::VarError::NotUnicode(_)) => Err(SecretError::EnvVarNotUnicode {
                    name: var_name.to_string(),
                }),
            };
        }

        Err(SecretError::NoSourceProvided)
    }

    /// Resolves the secret, treating "nothing configured" and "env var unset" as `None`.
    ///
    /// A referenced file that cannot be read is still an error: that is a
    /// deployment mistake, not a missing key.
    pub fn resolve_optional(&self) -> Result<Option<SecretString>> {
        match self.resolve() {
            Ok(secret) => Ok(Some(secret)),
            Err(SecretError::NoSourceProvided) | Err(SecretError::EnvVarNotSet { .. }) => Ok(None),
            Err(e) => Err(e),
        }
    }
}

/// Expands `~` to the user's home directory.
///
/// Only `~` and `~/path` are supported, not `~user/path`.
fn expand_home(path: &str) -> String {
    if path == "~" || path.starts_with("~/") {
        if let Some(home) = std::env::var_os("HOME").or_else(|| std::env::var_os("USERPROFILE")) {
            if path == "~" {
                return home.to_string_lossy().into_owned();
            }
            return path.replacen('~', &home.to_string_lossy(), 1);
        }
    }
    path.to_string()
}
