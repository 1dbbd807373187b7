//! Intent classification: `chat` vs `search_builder`, with confidence.
//!
//! The "prefer chat when unsure" bias lives in the instructions only; no
//! numeric cutoff is applied to the returned confidence.

use std::sync::Arc;

use feasure_protocol::IntentResult;

use crate::error::{AgentError, AgentResult};
use crate::generation::{GenerationClient, ResponseFormat, parse_json};

/// Fixed instructions defining the two labels and their decision criteria.
pub const INTENT_INSTRUCTIONS: &str = r#"You are Feasure's intent router. Your job is to classify what the user wants based ONLY on their latest message.

You MUST output a single JSON object with this exact structure:
{
  "intent": "chat" | "search_builder",
  "confidence": 0.0-1.0,
  "reasoning": "short explanation of why you chose this intent"
}

Definitions:
- "search_builder": The user is asking to see, filter, list, or report on NetSuite records (e.g., "show me all open purchase orders over 50k", "find sales orders from last week", "build a report of invoices by customer").
- "chat": General questions, explanations, or anything that is NOT asking to create a search or report (e.g., "what is a saved search?", "how do I set up NetSuite approvals?", "explain these results").

If you are unsure, prefer "chat" with a lower confidence.
Never include any text outside of the JSON object."#;

/// Classifies a prompt into an `IntentResult` via the generation oracle.
#[derive(Clone)]
pub struct IntentClassifier {
    client: Arc<dyn GenerationClient>,
}

impl IntentClassifier {
    pub fn new(client: Arc<dyn GenerationClient>) -> Self {
        Self { client }
    }

    /// One oracle call, no retries. Errors are `GenerationUnavailable`,
    /// `MalformedResponse` or `SchemaViolation`.
    pub async fn classify(&self, prompt: &str) -> AgentResult<IntentResult> {
        let raw = self
            .client
            .generate(INTENT_INSTRUCTIONS, prompt, ResponseFormat::Json)
            .await?;

        let value = parse_json(&raw)?;
        let result: IntentResult = serde_json::from_value(value).map_err(|e| {
            tracing::warn!(error = %e, "intent response failed validation");
            AgentError::SchemaViolation(format!("intent validation failed: {e}"))
        })?;

        tracing::debug!(
            intent = %result.intent,
            confidence = result.confidence.value(),
            reasoning = result.reasoning.as_deref().unwrap_or(""),
            provider = self.client.provider_name(),
            "intent classified"
        );
        Ok(result)
    }
}
