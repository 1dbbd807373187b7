//! Shared test harness for E2E integration tests.
//!
//! Runs the real `OpenAiClient` → `Dispatcher` stack against a wiremock
//! server standing in for the chat completions API. Each path's oracle
//! call is told apart by a phrase from its system instructions.

#![allow(dead_code)]

use std::sync::Arc;

use serde_json::{Value, json};
use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use feasure_agent::config::{API_KEY_VAR, AgentConfig, BASE_URL_VAR, TIMEOUT_VAR};
use feasure_agent::{Dispatcher, OpenAiClient, VocabularyRegistry};

/// Phrase unique to the intent classifier's instructions.
pub const INTENT_MARKER: &str = "intent router";
/// Phrase unique to the search builder's instructions.
pub const BUILDER_MARKER: &str = "designs NetSuite saved searches";
/// Phrase unique to the chat path's instructions.
pub const CHAT_MARKER: &str = "helps with ERP and NetSuite tasks";

pub struct TestHarness {
    pub server: MockServer,
    pub dispatcher: Dispatcher,
}

impl TestHarness {
    pub async fn start() -> Self {
        let server = MockServer::start().await;
        let base_url = format!("{}/v1", server.uri());

        let config = AgentConfig::from_lookup(|key| match key {
            API_KEY_VAR => Some("sk-e2e".to_string()),
            BASE_URL_VAR => Some(base_url.clone()),
            TIMEOUT_VAR => Some("2".to_string()),
            _ => None,
        })
        .expect("test config should load");

        let client = Arc::new(OpenAiClient::new(config.openai).expect("client should build"));
        let dispatcher = Dispatcher::new(client, Arc::new(VocabularyRegistry::standard()));

        Self { server, dispatcher }
    }

    /// Answer calls whose system prompt contains `marker` with `content`.
    pub async fn mount(&self, marker: &str, content: &str) {
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .and(body_string_contains(marker))
            .respond_with(ResponseTemplate::new(200).set_body_json(completion(content)))
            .mount(&self.server)
            .await;
    }

    /// Fail calls whose system prompt contains `marker` with `status`.
    pub async fn mount_status(&self, marker: &str, status: u16) {
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .and(body_string_contains(marker))
            .respond_with(ResponseTemplate::new(status))
            .mount(&self.server)
            .await;
    }

    pub async fn mount_intent(&self, intent: &str, confidence: f64) {
        let content = json!({
            "intent": intent,
            "confidence": confidence,
            "reasoning": "scripted"
        });
        self.mount(INTENT_MARKER, &content.to_string()).await;
    }

    /// Number of oracle calls whose body contained `marker`.
    pub async fn calls_containing(&self, marker: &str) -> usize {
        self.server
            .received_requests()
            .await
            .unwrap_or_default()
            .iter()
            .filter(|r| String::from_utf8_lossy(&r.body).contains(marker))
            .count()
    }

    pub async fn total_calls(&self) -> usize {
        self.server
            .received_requests()
            .await
            .map(|r| r.len())
            .unwrap_or(0)
    }
}

/// Wrap `content` in a chat completions response body.
pub fn completion(content: &str) -> Value {
    json!({
        "id": "chatcmpl-e2e",
        "object": "chat.completion",
        "model": "gpt-4.1-mini",
        "choices": [{
            "index": 0,
            "message": {"role": "assistant", "content": content},
            "finish_reason": "stop"
        }]
    })
}

/// A builder response for `record_type` with the given filters and columns.
pub fn builder_reply(record_type: &str, filters: Value, columns: Value) -> String {
    json!({
        "mode": "search_builder",
        "search_spec": {
            "action": "create_saved_search",
            "recordType": record_type,
            "searchTitle": "E2E search",
            "filters": filters,
            "columns": columns
        },
        "explanation": "Generated for an end-to-end test."
    })
    .to_string()
}
