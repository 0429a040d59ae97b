use std::time::Duration;

use axum::http::StatusCode;

use super::*;
use crate::llm::LlmClient;
use crate::llm::config::LlmTimeouts;
use crate::llm::test_helpers::{MockCompletion, completion_body, spawn_fake_endpoint, spawn_slow_endpoint, test_config};
use crate::llm::types::{ErrorKind, Role};
use crate::services::prompt::{GENERAL_SYSTEM_PROMPT, RDS_SYSTEM_PROMPT};

// =========================================================================
// respond / display_text
// =========================================================================

#[tokio::test]
async fn respond_keeps_error_typed() {
    let mock = MockCompletion::new(vec![Err(LlmError::ApiResponse { status: 429, body: String::new() })]);
    let err = respond(&mock, &[Message::user("hi")]).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::RateLimited);
}

#[test]
fn display_text_passes_success_through() {
    assert_eq!(display_text(Ok("verbatim *markdown*".into())), "verbatim *markdown*");
}

#[test]
fn display_text_prefixes_errors() {
    let text = display_text(Err(LlmError::ApiRequest("connection reset".into())));
    assert_eq!(text, "Error: API request failed: connection reset");
}

// =========================================================================
// ChatSession with MockCompletion
// =========================================================================

#[tokio::test]
async fn rds_turn_uses_specialist_prompt_and_800_tokens() {
    let mock = MockCompletion::new(vec![Ok("Use CreateDBInstanceReadReplica.".into())]);
    let mut session = ChatSession::new(&mock);

    let reply = session.submit("How do I create an RDS read replica?").await;
    assert_eq!(reply, "Use CreateDBInstanceReadReplica.");

    let (messages, params) = mock.last_call();
    assert_eq!(params.max_output_tokens, 800);
    assert_eq!(messages[0].content(), RDS_SYSTEM_PROMPT);
    assert_eq!(messages[1], Message::user("How do I create an RDS read replica?"));
}

#[tokio::test]
async fn general_turn_uses_brief_prompt_and_300_tokens() {
    let mock = MockCompletion::new(vec![Ok("4".into())]);
    let mut session = ChatSession::new(&mock);

    session.submit("What's 2+2?").await;

    let (messages, params) = mock.last_call();
    assert_eq!(params.max_output_tokens, 300);
    assert_eq!(messages[0].content(), GENERAL_SYSTEM_PROMPT);
}

#[tokio::test]
async fn transcript_grows_by_user_then_assistant() {
    let mock = MockCompletion::new(vec![Ok("a1".into()), Ok("a2".into())]);
    let mut session = ChatSession::new(&mock);
    session.submit("q1").await;
    session.submit("q2").await;

    let messages = session.conversation().messages();
    assert_eq!(messages.len(), 4);
    assert_eq!(messages[3], Message::assistant("a2"));
    assert!(messages.iter().all(|m| m.role() != Role::System));

    // Second request carries the whole history behind one system prompt.
    let (sent, _) = mock.last_call();
    assert_eq!(sent.len(), 4);
    assert_eq!(sent.iter().filter(|m| m.role() == Role::System).count(), 1);
}

#[tokio::test]
async fn failure_becomes_error_message_and_session_continues() {
    let mock = MockCompletion::new(vec![Err(LlmError::ApiRequest("dns failure".into())), Ok("recovered".into())]);
    let mut session = ChatSession::new(&mock);

    let reply = session.submit("hello").await;
    assert!(reply.starts_with(ERROR_PREFIX));
    assert_eq!(session.conversation().messages()[1].content(), reply);

    assert_eq!(session.submit("again").await, "recovered");
    assert_eq!(mock.call_count(), 2);
}

#[tokio::test]
async fn clear_resets_history_and_next_turn_is_independent() {
    let mock = MockCompletion::new(vec![]);
    let mut session = ChatSession::new(&mock);
    session.submit("Tell me about Aurora").await;
    session.clear();
    assert!(session.conversation().is_empty());

    session.submit("What's 2+2?").await;
    let (sent, params) = mock.last_call();
    assert_eq!(sent.len(), 2);
    assert_eq!(params.max_output_tokens, 300);
}

// =========================================================================
// ChatSession over HTTP
// =========================================================================

#[tokio::test]
async fn end_to_end_rds_reply_is_verbatim() {
    let (base_url, captured) = spawn_fake_endpoint(StatusCode::OK, completion_body("Step 1: open the console.")).await;
    let client = LlmClient::from_config(test_config(&base_url)).unwrap();
    let mut session = ChatSession::new(&client);

    let reply = session.submit("How do I create an RDS read replica?").await;
    assert_eq!(reply, "Step 1: open the console.");

    let captured = captured.lock().unwrap();
    let (_, body) = &captured[0];
    assert_eq!(body["max_tokens"], 800);
    assert_eq!(body["messages"][0]["role"], "system");
    assert_eq!(body["messages"][0]["content"], RDS_SYSTEM_PROMPT);
    assert_eq!(body["messages"][1]["content"], "How do I create an RDS read replica?");
}

#[tokio::test]
async fn end_to_end_network_error_shows_error_text() {
    let client = LlmClient::from_config(test_config("http://127.0.0.1:1/v1")).unwrap();
    let mut session = ChatSession::new(&client);

    let reply = session.submit("What's 2+2?").await;
    assert!(reply.starts_with("Error: "), "unexpected reply: {reply}");
    assert_eq!(session.conversation().len(), 2);
}

#[tokio::test]
async fn end_to_end_timeout_shows_error_text() {
    let base_url = spawn_slow_endpoint(Duration::from_secs(3), completion_body("too late")).await;
    let mut config = test_config(&base_url);
    config.timeouts = LlmTimeouts { request_secs: 1, connect_secs: 1 };
    let client = LlmClient::from_config(config).unwrap();
    let mut session = ChatSession::new(&client);

    let reply = session.submit("How do I restore an RDS snapshot?").await;
    assert!(reply.starts_with("Error: API request timed out"), "unexpected reply: {reply}");
    assert_eq!(session.conversation().messages()[1].content(), reply);
}
