pub mod client;
pub mod parse;
pub mod prompt;
pub mod record;

use std::sync::Arc;

use tracing::debug;

use crate::config::schema::LlmConfig;
use crate::error::{AnalysisError, ConfigError};
use crate::sanitize;

pub use client::{ChatCompletion, ChatRequest, OpenAiChatClient};
pub use parse::parse_reply;
pub use record::{InsuranceRecord, FIELD_NAMES, NOT_FOUND};

/// Longest slice of a model reply that goes into debug logs.
const REPLY_LOG_CHARS: usize = 200;

/// Turns extracted document text into an [`InsuranceRecord`] via an LLM.
#[derive(Clone)]
pub struct FieldAnalyzer {
    client: Arc<dyn ChatCompletion>,
    structured_output: bool,
}

impl FieldAnalyzer {
    pub fn new(client: Arc<dyn ChatCompletion>, structured_output: bool) -> Self {
        Self {
            client,
            structured_output,
        }
    }

    pub fn from_config(config: &LlmConfig) -> Result<Self, ConfigError> {
        let client = OpenAiChatClient::from_config(config)?;
        Ok(Self::new(Arc::new(client), config.structured_output))
    }

    /// Builds the request the analyzer would send for `text`.
    pub fn build_request(&self, text: &str, context: &str) -> ChatRequest {
        ChatRequest {
            system: prompt::SYSTEM_PROMPT.to_string(),
            user: prompt::build_user_prompt(text, context),
            response_schema: self.structured_output.then(prompt::response_schema),
        }
    }

    /// `context` is a sentence describing how `text` was obtained.
    pub async fn analyze(&self, text: &str, context: &str) -> Result<InsuranceRecord, AnalysisError> {
        let request = self.build_request(text, context);
        let reply = self.client.complete(&request).await?;

        debug!(
            reply = %sanitize::truncate_for_log(&reply, REPLY_LOG_CHARS),
            "Model replied"
        );

        let record = parse_reply(&reply)?;
        debug!(found = record.found_count(), "Parsed insurance fields");
        Ok(record)
    }
}
