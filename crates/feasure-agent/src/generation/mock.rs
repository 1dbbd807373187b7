//! Scripted generation client for testing.
//!
//! Replays queued responses in FIFO order and records every call so tests
//! can assert on what was sent (and how many oracle calls a request made).

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;

use super::{GenerationClient, ResponseFormat};
use crate::error::{AgentError, AgentResult};

/// One queued oracle outcome.
#[derive(Debug, Clone)]
enum Scripted {
    Reply(String),
    Unavailable(String),
}

/// A call received by the scripted client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedCall {
    pub system: String,
    pub user: String,
    pub format: ResponseFormat,
}

/// Generation client with scripted responses and call recording.
#[derive(Default)]
pub struct ScriptedGenerationClient {
    /// Outcomes returned by `generate` (FIFO order).
    script: Mutex<VecDeque<Scripted>>,
    /// Every call made to `generate` (for test assertions).
    calls: Mutex<Vec<RecordedCall>>,
}

impl ScriptedGenerationClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a client pre-loaded with response texts.
    pub fn with_replies<I, S>(replies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let client = Self::new();
        for reply in replies {
            client.queue_reply(reply);
        }
        client
    }

    /// Queue a successful response text.
    pub fn queue_reply(&self, text: impl Into<String>) {
        self.script
            .lock()
            .unwrap()
            .push_back(Scripted::Reply(text.into()));
    }

    /// Queue an oracle failure.
    pub fn queue_failure(&self, reason: impl Into<String>) {
        self.script
            .lock()
            .unwrap()
            .push_back(Scripted::Unavailable(reason.into()));
    }

    /// Copies of all calls received so far.
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl GenerationClient for ScriptedGenerationClient {
    async fn generate(
        &self,
        system: &str,
        user: &str,
        format: ResponseFormat,
    ) -> AgentResult<String> {
        self.calls.lock().unwrap().push(RecordedCall {
            system: system.to_string(),
            user: user.to_string(),
            format,
        });

        let next = self.script.lock().unwrap().pop_front();
        match next {
            Some(Scripted::Reply(text)) => Ok(text),
            Some(Scripted::Unavailable(reason)) => Err(AgentError::GenerationUnavailable(reason)),
            None => Err(AgentError::GenerationUnavailable(
                "no scripted response queued".into(),
            )),
        }
    }

    fn provider_name(&self) -> &str {
        "scripted"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn replays_in_order_and_records() {
        let client = ScriptedGenerationClient::with_replies(["first", "second"]);

        let a = client.generate("sys", "one", ResponseFormat::Json).await.unwrap();
        let b = client.generate("sys", "two", ResponseFormat::Text).await.unwrap();
        assert_eq!((a.as_str(), b.as_str()), ("first", "second"));

        let calls = client.calls();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0].user, "one");
        assert_eq!(calls[1].format, ResponseFormat::Text);
    }

    #[tokio::test]
    async fn queued_failure_surfaces() {
        let client = ScriptedGenerationClient::new();
        client.queue_failure("rate limited");

        let err = client.generate("s", "u", ResponseFormat::Json).await.unwrap_err();
        assert!(matches!(err, AgentError::GenerationUnavailable(ref r) if r == "rate limited"));
    }

    #[tokio::test]
    async fn exhausted_script_is_unavailable() {
        let client = ScriptedGenerationClient::new();
        let err = client.generate("s", "u", ResponseFormat::Json).await.unwrap_err();
        assert!(matches!(err, AgentError::GenerationUnavailable(_)));
        assert_eq!(client.call_count(), 1);
    }
}
