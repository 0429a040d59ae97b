//! LLM types — chat messages, generation parameters and errors.
//!
//! Provider-neutral types shared by the completion client, the prompt
//! composer and the conversation store.

use std::fmt;

use serde::Serialize;

use crate::error::ErrorCode;

// =============================================================================
// ERROR
// =============================================================================

/// Errors produced by LLM client operations.
#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    /// The required API key environment variable is not set.
    #[error("missing API key: env var {var} not set")]
    MissingApiKey { var: String },

    /// The HTTP request to the completion endpoint failed.
    #[error("API request failed: {0}")]
    ApiRequest(String),

    /// The HTTP request did not finish within the configured timeout.
    #[error("API request timed out: {0}")]
    Timeout(String),

    /// The completion endpoint returned a non-success HTTP status.
    #[error("API response error: status {status}: {}", body_snippet(.body))]
    ApiResponse { status: u16, body: String },

    /// The response body could not be deserialized or carried no text.
    #[error("API response parse failed: {0}")]
    ApiParse(String),

    /// The underlying HTTP client could not be constructed.
    #[error("HTTP client build failed: {0}")]
    HttpClientBuild(String),
}

/// Longest provider error body echoed into an [`LlmError::ApiResponse`] message.
const BODY_SNIPPET_CHARS: usize = 200;

fn body_snippet(body: &str) -> String {
    let body = body.trim();
    if body.is_empty() {
        return "(empty body)".to_string();
    }
    let mut snippet: String = body.chars().take(BODY_SNIPPET_CHARS).collect();
    if body.chars().count() > BODY_SNIPPET_CHARS {
        snippet.push_str("...");
    }
    snippet
}

/// Coarse failure class of an [`LlmError`], for callers that need to react
/// to the kind of failure rather than its text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Config,
    Network,
    Timeout,
    Auth,
    RateLimited,
    Server,
    Malformed,
}

impl LlmError {
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::MissingApiKey { .. } | Self::HttpClientBuild(_) => ErrorKind::Config,
            Self::ApiRequest(_) => ErrorKind::Network,
            Self::Timeout(_) => ErrorKind::Timeout,
            Self::ApiResponse { status: 401 | 403, .. } => ErrorKind::Auth,
            Self::ApiResponse { status: 429, .. } => ErrorKind::RateLimited,
            Self::ApiResponse { .. } => ErrorKind::Server,
            Self::ApiParse(_) => ErrorKind::Malformed,
        }
    }
}

impl From<reqwest::Error> for LlmError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() { Self::Timeout(e.to_string()) } else { Self::ApiRequest(e.to_string()) }
    }
}

impl ErrorCode for LlmError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::MissingApiKey { .. } => "E_MISSING_API_KEY",
            Self::ApiRequest(_) => "E_API_REQUEST",
            Self::Timeout(_) => "E_API_TIMEOUT",
            Self::ApiResponse { .. } => "E_API_RESPONSE",
            Self::ApiParse(_) => "E_API_PARSE",
            Self::HttpClientBuild(_) => "E_HTTP_CLIENT_BUILD",
        }
    }

    fn retryable(&self) -> bool {
        matches!(self, Self::ApiRequest(_) | Self::Timeout(_) | Self::ApiResponse { status: 429 | 500..=599, .. })
    }
}

// =============================================================================
// MESSAGE TYPES
// =============================================================================

/// Author of a chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

impl Role {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::System => "system",
            Self::User => "user",
            Self::Assistant => "assistant",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single message in a conversation. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    role: Role,
    content: String,
}

impl Message {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self { role, content: content.into() }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::new(Role::System, content)
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }

    #[must_use]
    pub fn role(&self) -> Role {
        self.role
    }

    #[must_use]
    pub fn content(&self) -> &str {
        &self.content
    }
}

/// Sampling parameters chosen per request.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GenerationParams {
    pub max_output_tokens: u32,
    pub temperature: f32,
}

// =============================================================================
// CHAT COMPLETION TRAIT
// =============================================================================

/// Provider-neutral async trait for chat completion. Enables mocking in tests.
#[async_trait::async_trait]
pub trait ChatCompletion: Send + Sync {
    /// Send the composed message list and return the generated text.
    ///
    /// # Errors
    ///
    /// Returns an [`LlmError`] if the request fails, the endpoint rejects it,
    /// or the response carries no text.
    async fn complete(&self, messages: &[Message], params: GenerationParams) -> Result<String, LlmError>;
}

#[cfg(test)]
#[path = "types_test.rs"]
mod tests;
