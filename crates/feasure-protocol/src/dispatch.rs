use serde::{Deserialize, Serialize};

use crate::intent::{Confidence, IntentLabel};
use crate::search::SearchBuilderResult;

/// Inbound request handled by the dispatcher.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DispatchRequest {
    /// Natural-language prompt from the user.
    pub prompt: String,
    /// Skip intent classification and take this path directly.
    #[serde(
        rename = "forceMode",
        alias = "force_mode",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub force_mode: Option<IntentLabel>,
}

/// Conversational answer produced on the chat path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatResult {
    pub reply: String,
}

/// Result of one dispatch, tagged by `mode`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum DispatchResult {
    Chat(ChatResult),
    SearchBuilder(SearchBuilderResult),
}

impl DispatchResult {
    pub fn mode(&self) -> IntentLabel {
        match self {
            DispatchResult::Chat(_) => IntentLabel::Chat,
            DispatchResult::SearchBuilder(_) => IntentLabel::SearchBuilder,
        }
    }
}

/// Dispatch result plus the classifier confidence that routed it.
///
/// `intent_confidence` is absent when a forced mode bypassed classification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DispatchOutcome {
    #[serde(flatten)]
    pub result: DispatchResult,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub intent_confidence: Option<Confidence>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::{FilterExpression, FilterTriplet, Operator, RecordType, SearchAction, SearchSpec};
    use serde_json::json;

    #[test]
    fn deserialize_request_with_force_mode() {
        let req: DispatchRequest =
            serde_json::from_str(r#"{"prompt": "hi", "forceMode": "search_builder"}"#).unwrap();
        assert_eq!(req.force_mode, Some(IntentLabel::SearchBuilder));

        let req: DispatchRequest = serde_json::from_str(r#"{"prompt": "hi"}"#).unwrap();
        assert!(req.force_mode.is_none());
    }

    #[test]
    fn chat_outcome_shape() {
        let outcome = DispatchOutcome {
            result: DispatchResult::Chat(ChatResult {
                reply: "A saved search is...".into(),
            }),
            intent_confidence: Some(Confidence::new(0.8).unwrap()),
        };
        let value = serde_json::to_value(&outcome).unwrap();
        assert_eq!(
            value,
            json!({"mode": "chat", "reply": "A saved search is...", "intent_confidence": 0.8})
        );
        assert!(value.get("search_spec").is_none());
    }

    #[test]
    fn search_outcome_shape_without_confidence() {
        let spec = SearchSpec {
            action: SearchAction::CreateSavedSearch,
            record_type: RecordType::SalesOrder,
            search_title: "Big sales orders".into(),
            filters: FilterExpression::single(FilterTriplet::new(
                "amount",
                Operator::GreaterThan,
                "1000",
            )),
            columns: vec!["tranid".into()],
        };
        let outcome = DispatchOutcome {
            result: DispatchResult::SearchBuilder(SearchBuilderResult {
                search_spec: spec,
                explanation: None,
            }),
            intent_confidence: None,
        };
        assert_eq!(outcome.result.mode(), IntentLabel::SearchBuilder);

        let value = serde_json::to_value(&outcome).unwrap();
        assert_eq!(value["mode"], "search_builder");
        assert_eq!(value["search_spec"]["recordType"], "salesorder");
        assert!(value.get("intent_confidence").is_none());
        assert!(value.get("reply").is_none());

        let back: DispatchOutcome = serde_json::from_value(value).unwrap();
        assert_eq!(back, outcome);
    }
}
