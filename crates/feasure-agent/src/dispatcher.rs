//! Request dispatcher: intent routing composed with the two handling paths.
//!
//! At most two oracle calls per request, strictly sequential: the intent
//! call, then either the search-builder call or the chat call. A forced
//! mode skips the intent call. Errors pass through untranslated.

use std::sync::Arc;

use tracing::Instrument;
use uuid::Uuid;

use feasure_protocol::{
    ChatResult, DispatchOutcome, DispatchRequest, DispatchResult, IntentLabel,
};

use crate::error::AgentResult;
use crate::generation::{GenerationClient, ResponseFormat};
use crate::intent::IntentClassifier;
use crate::search::SearchSpecBuilder;
use crate::vocabulary::VocabularyRegistry;

/// System instruction for the direct chat path.
pub const CHAT_INSTRUCTIONS: &str = "You are Feasure, an AI assistant that helps with ERP and NetSuite tasks. Answer clearly and concisely.";

/// Routes a prompt to the chat or search-builder path.
#[derive(Clone)]
pub struct Dispatcher {
    client: Arc<dyn GenerationClient>,
    classifier: IntentClassifier,
    builder: SearchSpecBuilder,
}

impl Dispatcher {
    /// Wire the classifier, builder and chat path to one oracle.
    pub fn new(client: Arc<dyn GenerationClient>, vocabulary: Arc<VocabularyRegistry>) -> Self {
        Self {
            classifier: IntentClassifier::new(client.clone()),
            builder: SearchSpecBuilder::new(client.clone(), vocabulary),
            client,
        }
    }

    /// Convenience wrapper over `handle` for a boundary request.
    pub async fn dispatch(&self, request: &DispatchRequest) -> AgentResult<DispatchOutcome> {
        self.handle(&request.prompt, request.force_mode).await
    }

    pub async fn handle(
        &self,
        prompt: &str,
        forced_mode: Option<IntentLabel>,
    ) -> AgentResult<DispatchOutcome> {
        let span = tracing::info_span!(
            "dispatch",
            request_id = %Uuid::now_v7(),
            forced = forced_mode.map(|m| m.as_str()).unwrap_or("none"),
        );
        self.route(prompt, forced_mode).instrument(span).await
    }

    async fn route(
        &self,
        prompt: &str,
        forced_mode: Option<IntentLabel>,
    ) -> AgentResult<DispatchOutcome> {
        let (mode, intent_confidence) = match forced_mode {
            Some(mode) => {
                tracing::info!(mode = %mode, "forced mode, skipping intent classification");
                (mode, None)
            }
            None => {
                let intent = self.classifier.classify(prompt).await?;
                tracing::info!(
                    intent = %intent.intent,
                    confidence = intent.confidence.value(),
                    "routing on classified intent"
                );
                (intent.intent, Some(intent.confidence))
            }
        };

        let result = match mode {
            IntentLabel::SearchBuilder => {
                DispatchResult::SearchBuilder(self.builder.build(prompt).await?)
            }
            IntentLabel::Chat => DispatchResult::Chat(self.chat(prompt).await?),
        };

        Ok(DispatchOutcome {
            result,
            intent_confidence,
        })
    }

    async fn chat(&self, prompt: &str) -> AgentResult<ChatResult> {
        let reply = self
            .client
            .generate(CHAT_INSTRUCTIONS, prompt, ResponseFormat::Text)
            .await?;
        Ok(ChatResult { reply })
    }
}
