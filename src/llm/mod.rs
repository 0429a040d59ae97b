//! LLM — chat completion adapter.
//!
//! DESIGN
//! ======
//! One provider dialect (OpenAI-compatible chat completions), configured from
//! environment variables. `LlmClient` is built once by `main` and handed to
//! the session by reference; nothing here is global.

pub mod config;
pub mod openai;
pub mod types;

#[cfg(test)]
pub mod test_helpers;

use config::LlmConfig;
pub use types::ChatCompletion;
use types::{GenerationParams, LlmError, Message};

// =============================================================================
// CLIENT
// =============================================================================

/// Concrete completion client bound to one model and credential.
pub struct LlmClient {
    inner: openai::OpenAiClient,
    model: String,
}

impl LlmClient {
    /// Build an LLM client from a parsed typed config.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client fails to build.
    pub fn from_config(config: LlmConfig) -> Result<Self, LlmError> {
        let inner = openai::OpenAiClient::new(config.api_key, &config.base_url, config.timeouts)?;
        Ok(Self { inner, model: config.model })
    }

    /// Return the configured model name.
    #[must_use]
    pub fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait::async_trait]
impl ChatCompletion for LlmClient {
    async fn complete(&self, messages: &[Message], params: GenerationParams) -> Result<String, LlmError> {
        self.inner.chat(&self.model, messages, params).await
    }
}
