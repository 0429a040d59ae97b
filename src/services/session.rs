//! Session service — one chat turn: store → compose → complete → store.
//!
//! DESIGN
//! ======
//! `respond` keeps the completion failure typed so batch callers can branch
//! on it. `ChatSession::submit` is the interactive boundary: failures become
//! an `"Error: ..."` assistant message and the session carries on.

use tracing::{info, instrument, warn};
use uuid::Uuid;

use super::conversation::Conversation;
use super::prompt;
use crate::error::ErrorCode;
use crate::llm::ChatCompletion;
use crate::llm::types::{LlmError, Message};

/// Prefix of every assistant message that reports a failed completion.
pub const ERROR_PREFIX: &str = "Error: ";

/// Compose the request for the latest message and run it.
///
/// # Errors
///
/// Propagates the [`LlmError`] from the completion call unchanged.
pub async fn respond(llm: &dyn ChatCompletion, conversation: &[Message]) -> Result<String, LlmError> {
    let composed = prompt::compose(conversation);
    info!(
        kind = ?composed.kind,
        max_tokens = composed.params.max_output_tokens,
        messages = composed.messages.len(),
        "session: sending completion"
    );

    match llm.complete(&composed.messages, composed.params).await {
        Ok(text) => {
            info!(reply_len = text.len(), "session: completion ok");
            Ok(text)
        }
        Err(e) => {
            warn!(error = %e, code = e.error_code(), kind = ?e.kind(), "session: completion failed");
            Err(e)
        }
    }
}

/// Render a completion outcome as chat text.
#[must_use]
pub fn display_text(result: Result<String, LlmError>) -> String {
    match result {
        Ok(text) => text,
        Err(e) => format!("{ERROR_PREFIX}{e}"),
    }
}

/// An interactive chat session bound to one completion client.
pub struct ChatSession<'a> {
    id: Uuid,
    llm: &'a dyn ChatCompletion,
    conversation: Conversation,
}

impl<'a> ChatSession<'a> {
    pub fn new(llm: &'a dyn ChatCompletion) -> Self {
        Self { id: Uuid::new_v4(), llm, conversation: Conversation::new() }
    }

    #[must_use]
    pub fn id(&self) -> Uuid {
        self.id
    }

    #[must_use]
    pub fn conversation(&self) -> &Conversation {
        &self.conversation
    }

    /// Append `text` as a user turn, fetch the reply and append it.
    /// Returns the assistant text as displayed.
    #[instrument(skip_all, fields(session = %self.id, prompt_len = text.len()))]
    pub async fn submit(&mut self, text: &str) -> String {
        self.conversation.push_user(text);
        let reply = display_text(respond(self.llm, self.conversation.messages()).await);
        self.conversation.push_assistant(reply.clone());
        reply
    }

    pub fn clear(&mut self) {
        info!(session = %self.id, dropped = self.conversation.len(), "session: history cleared");
        self.conversation.clear();
    }
}

#[cfg(test)]
#[path = "session_test.rs"]
mod tests;
