//! OpenAI-compatible chat completions client.
//!
//! Together AI, and most hosted open-weight model providers, speak the
//! `/v1/chat/completions` dialect. Only plain text messages are sent; the
//! reply is the text of `choices[0]`.

use std::time::Duration;

use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use super::config::LlmTimeouts;
use super::types::{GenerationParams, LlmError, Message, Role};

pub struct OpenAiClient {
    http: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl OpenAiClient {
    /// # Errors
    ///
    /// Returns [`LlmError::HttpClientBuild`] if the TLS backend fails to load.
    pub fn new(api_key: String, base_url: &str, timeouts: LlmTimeouts) -> Result<Self, LlmError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeouts.request_secs))
            .connect_timeout(Duration::from_secs(timeouts.connect_secs))
            .build()
            .map_err(|e| LlmError::HttpClientBuild(e.to_string()))?;
        Ok(Self { http, api_key, base_url: base_url.trim_end_matches('/').to_string() })
    }

    pub async fn chat(&self, model: &str, messages: &[Message], params: GenerationParams) -> Result<String, LlmError> {
        let msgs = build_chat_completions_messages(messages);
        let body = CcRequest {
            model,
            messages: &msgs,
            max_tokens: params.max_output_tokens,
            temperature: params.temperature,
        };
        let text = self.send_json("/chat/completions", &body).await?;
        parse_chat_completions_response(&text)
    }

    async fn send_json(&self, path: &str, body: &impl Serialize) -> Result<String, LlmError> {
        let url = format!("{}{}", self.base_url, path);
        let response = self
            .http
            .post(url)
            .bearer_auth(&self.api_key)
            .json(body)
            .send()
            .await?;

        let status = response.status().as_u16();
        let text = response.text().await?;
        if status != 200 {
            debug!(status, body_len = text.len(), "llm: non-success status");
            return Err(LlmError::ApiResponse { status, body: text });
        }
        Ok(text)
    }
}

// =============================================================================
// CHAT COMPLETIONS — wire types
// =============================================================================

#[derive(Serialize)]
pub(crate) struct CcRequest<'a> {
    pub(crate) model: &'a str,
    pub(crate) messages: &'a [CcMessage<'a>],
    pub(crate) max_tokens: u32,
    pub(crate) temperature: f32,
}

#[derive(Serialize)]
pub(crate) struct CcMessage<'a> {
    role: Role,
    content: &'a str,
}

pub(crate) fn build_chat_completions_messages(messages: &[Message]) -> Vec<CcMessage<'_>> {
    messages
        .iter()
        .map(|m| CcMessage { role: m.role(), content: m.content() })
        .collect()
}

// =============================================================================
// RESPONSE PARSING
// =============================================================================

pub(crate) fn parse_chat_completions_response(json_text: &str) -> Result<String, LlmError> {
    let root: Value = serde_json::from_str(json_text).map_err(|e| LlmError::ApiParse(e.to_string()))?;

    let Some(choice) = root
        .get("choices")
        .and_then(Value::as_array)
        .and_then(|arr| arr.first())
    else {
        return Err(LlmError::ApiParse("chat_completions: missing choices[0]".to_string()));
    };

    let finish_reason = choice
        .get("finish_reason")
        .and_then(Value::as_str)
        .unwrap_or("stop");
    let prompt_tokens = root
        .get("usage")
        .and_then(|u| u.get("prompt_tokens"))
        .and_then(Value::as_u64)
        .unwrap_or(0);
    let completion_tokens = root
        .get("usage")
        .and_then(|u| u.get("completion_tokens"))
        .and_then(Value::as_u64)
        .unwrap_or(0);
    debug!(finish_reason, prompt_tokens, completion_tokens, "llm: completion parsed");

    choice
        .get("message")
        .and_then(|m| m.get("content"))
        .and_then(Value::as_str)
        .map(str::to_owned)
        .ok_or_else(|| LlmError::ApiParse("chat_completions: choices[0] has no message content".to_string()))
}

#[cfg(test)]
#[path = "openai_test.rs"]
mod tests;
