//! Structured generation against an external text-completion oracle.
//!
//! Every call sends exactly one system message and one user message and
//! gets back a single text blob. Failures surface as
//! `AgentError::GenerationUnavailable` and are never retried here.
//!
//! Two implementations:
//! - **OpenAI** (`OpenAiClient`): chat completions over HTTP.
//! - **Scripted** (`ScriptedGenerationClient`): canned responses for tests.

pub mod mock;
pub mod openai;

use async_trait::async_trait;

use crate::error::{AgentError, AgentResult};

/// Output mode requested from the oracle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseFormat {
    /// Constrain the output to a single JSON object.
    Json,
    /// Free-form text.
    Text,
}

/// Trait for oracles that turn (instructions, user text) into text.
#[async_trait]
pub trait GenerationClient: Send + Sync {
    /// Run one completion. Stateless across calls.
    async fn generate(
        &self,
        system: &str,
        user: &str,
        format: ResponseFormat,
    ) -> AgentResult<String>;

    /// Name of the backing provider (for logging).
    fn provider_name(&self) -> &str;
}

/// Parse oracle output as JSON. Anything that is not valid JSON is a
/// `MalformedResponse`; shape checks are left to the caller.
pub fn parse_json(raw: &str) -> AgentResult<serde_json::Value> {
    serde_json::from_str(raw).map_err(|e| {
        tracing::warn!(error = %e, raw = %raw, "model returned invalid JSON");
        AgentError::MalformedResponse(format!("invalid JSON from model: {e}"))
    })
}

pub use mock::ScriptedGenerationClient;
pub use openai::OpenAiClient;
