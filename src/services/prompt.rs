//! Prompt composer — pick a persona and generation parameters per request.
//!
//! DESIGN
//! ======
//! Only the latest message decides the policy, and only when the user wrote
//! it. An empty conversation, or one ending in an assistant turn, gets the
//! general policy. The stored conversation is never touched: the returned
//! list is a fresh `[system] + history` built for this call.

use tracing::debug;

use super::classifier;
use crate::llm::types::{GenerationParams, Message, Role};

pub const RDS_SYSTEM_PROMPT: &str = "You are an AWS RDS deployment specialist. Provide detailed, helpful information about \
     Amazon RDS setup, configuration, deployment, database management, and troubleshooting. Be thorough and technical \
     when needed.";

pub const GENERAL_SYSTEM_PROMPT: &str = "You are a helpful AI assistant. For general topics, provide brief, concise responses \
     (1-2 sentences) unless explicitly asked for more details. Always keep responses short and to the point initially.";

pub const TEMPERATURE: f32 = 0.3;
pub const RDS_MAX_TOKENS: u32 = 800;
pub const GENERAL_MAX_TOKENS: u32 = 300;

/// The two response policies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryKind {
    Rds,
    General,
}

impl QueryKind {
    #[must_use]
    pub fn from_classification(is_rds: bool) -> Self {
        if is_rds { Self::Rds } else { Self::General }
    }

    #[must_use]
    pub fn system_prompt(self) -> &'static str {
        match self {
            Self::Rds => RDS_SYSTEM_PROMPT,
            Self::General => GENERAL_SYSTEM_PROMPT,
        }
    }

    #[must_use]
    pub fn params(self) -> GenerationParams {
        let max_output_tokens = match self {
            Self::Rds => RDS_MAX_TOKENS,
            Self::General => GENERAL_MAX_TOKENS,
        };
        GenerationParams { max_output_tokens, temperature: TEMPERATURE }
    }
}

/// Result of [`compose`]: the list to send and how to sample it.
#[derive(Debug, Clone, PartialEq)]
pub struct ComposedPrompt {
    pub kind: QueryKind,
    pub messages: Vec<Message>,
    pub params: GenerationParams,
}

/// Classify the latest user message and build the request for it.
#[must_use]
pub fn compose(conversation: &[Message]) -> ComposedPrompt {
    let kind = match conversation.last() {
        Some(last) if last.role() == Role::User => {
            let is_rds = classifier::classify(last.content());
            debug!(is_rds, "prompt: classified latest user message");
            QueryKind::from_classification(is_rds)
        }
        Some(last) => {
            debug!(role = %last.role(), "prompt: latest message not from user, using general policy");
            QueryKind::General
        }
        None => {
            debug!("prompt: empty conversation, using general policy");
            QueryKind::General
        }
    };

    let mut messages = Vec::with_capacity(conversation.len() + 1);
    messages.push(Message::system(kind.system_prompt()));
    messages.extend(
        conversation
            .iter()
            .filter(|m| m.role() != Role::System)
            .cloned(),
    );

    ComposedPrompt { kind, messages, params: kind.params() }
}

#[cfg(test)]
#[path = "prompt_test.rs"]
mod tests;
