//! Saved-search builder: prompt → oracle → validated `SearchSpec`.
//!
//! The vocabulary snapshot embedded in the instructions only steers the
//! oracle. Its output is always re-validated against the registry.

pub mod validate;

use std::sync::Arc;

use feasure_protocol::{RecordType, SearchBuilderResult};

use crate::error::AgentResult;
use crate::generation::{GenerationClient, ResponseFormat, parse_json};
use crate::vocabulary::VocabularyRegistry;

pub use validate::{TYPE_FIELD, validate_builder_response, validate_search_spec};

/// Render the builder's system instructions around a vocabulary snapshot.
pub fn builder_instructions(vocabulary: &VocabularyRegistry) -> String {
    let snapshot = serde_json::to_string_pretty(&vocabulary.snapshot())
        .unwrap_or_else(|_| vocabulary.snapshot().to_string());
    let record_types = RecordType::ALL
        .iter()
        .map(|rt| format!("\"{rt}\""))
        .collect::<Vec<_>>()
        .join(" | ");

    format!(
        r#"You are Feasure, an AI assistant that designs NetSuite saved searches.
Your job is to analyze the user's natural-language request and output a JSON object that describes a NetSuite saved search to create.

You have access to the following NetSuite vocabulary (field IDs, record types, etc.):
{snapshot}

CRITICAL RULES:
1. Output ONLY a single JSON object, no commentary, no markdown.
2. The JSON MUST conform to this structure:
{{
  "mode": "search_builder",
  "search_spec": {{
    "action": "create_saved_search",
    "recordType": {record_types},
    "searchTitle": "<short human-readable title>",
    "filters": [
       ["type", "anyof", "PurchOrd"],
       "AND",
       ["status", "anyof", "PurchOrd:A"],
       "AND",
       ["amount", "greaterthan", "50000"],
       "AND",
       ["trandate", "onorafter", "30d_ago"]
    ],
    "columns": ["tranid", "entity", "amount", "status", "trandate"]
  }},
  "explanation": "Short human-readable explanation of the search, in plain English."
}}

3. Do NOT invent record types beyond the allowed list.
4. Use the field IDs and status IDs from the vocabulary when possible.
5. Use reasonable default columns so the search is immediately useful.
6. When the user does not specify exact amounts or date ranges, infer sensible defaults.
7. For date filters, you may use placeholders like "30d_ago", "7d_ago", "today"; the backend will interpret them.
8. Never return JavaScript or any code, only the JSON object described above.
"#
    )
}

/// Builds validated saved-search specs from natural language.
#[derive(Clone)]
pub struct SearchSpecBuilder {
    client: Arc<dyn GenerationClient>,
    vocabulary: Arc<VocabularyRegistry>,
    instructions: Arc<str>,
}

impl SearchSpecBuilder {
    pub fn new(client: Arc<dyn GenerationClient>, vocabulary: Arc<VocabularyRegistry>) -> Self {
        let instructions = builder_instructions(&vocabulary).into();
        Self {
            client,
            vocabulary,
            instructions,
        }
    }

    pub fn instructions(&self) -> &str {
        &self.instructions
    }

    /// One oracle call, then structural and semantic validation. No
    /// partial results.
    pub async fn build(&self, prompt: &str) -> AgentResult<SearchBuilderResult> {
        let raw = self
            .client
            .generate(&self.instructions, prompt, ResponseFormat::Json)
            .await?;

        let value = parse_json(&raw)?;
        let result = validate_builder_response(value, &self.vocabulary)?;

        tracing::info!(
            record_type = %result.search_spec.record_type,
            title = %result.search_spec.search_title,
            columns = result.search_spec.columns.len(),
            conditions = result.search_spec.filters.conditions().count(),
            "search spec built"
        );
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AgentError;
    use crate::generation::ScriptedGenerationClient;
    use feasure_protocol::Operator;
    use serde_json::json;

    fn builder_with(reply: &str) -> (SearchSpecBuilder, Arc<ScriptedGenerationClient>) {
        let client = Arc::new(ScriptedGenerationClient::with_replies([reply]));
        let builder = SearchSpecBuilder::new(
            client.clone(),
            Arc::new(VocabularyRegistry::standard()),
        );
        (builder, client)
    }

    fn open_po_reply() -> String {
        json!({
            "mode": "search_builder",
            "search_spec": {
                "action": "create_saved_search",
                "recordType": "purchaseorder",
                "searchTitle": "Open POs over 50,000",
                "filters": [
                    ["type", "anyof", "PurchOrd"],
                    "AND",
                    ["status", "anyof", ["PurchOrd:A", "PurchOrd:B", "PurchOrd:C"]],
                    "AND",
                    ["amount", "greaterthan", "50000"]
                ],
                "columns": ["tranid", "entity", "amount", "status", "trandate"]
            },
            "explanation": "Open purchase orders with amount above 50,000."
        })
        .to_string()
    }

    #[test]
    fn instructions_embed_vocabulary() {
        let text = builder_instructions(&VocabularyRegistry::standard());
        assert!(text.contains("\"purchaseorderStatus\""));
        assert!(text.contains("PurchOrd:H"));
        assert!(text.contains("start_of_last_month"));
        assert!(text.contains(r#""recordType": "purchaseorder" | "salesorder" | "transaction""#));
        assert!(text.contains("Do NOT invent record types"));
    }

    #[tokio::test]
    async fn builds_open_purchase_order_search() {
        let (builder, client) = builder_with(&open_po_reply());

        let result = builder
            .build("show me all open purchase orders over 50000")
            .await
            .unwrap();
        let spec = &result.search_spec;
        assert_eq!(spec.record_type, RecordType::PurchaseOrder);
        assert!(spec.filters.conditions().any(|t| {
            t.field == "amount" && t.operator == Operator::GreaterThan && t.value == json!("50000")
        }));

        let calls = client.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].system, builder.instructions());
        assert_eq!(calls[0].format, ResponseFormat::Json);
    }

    #[tokio::test]
    async fn invalid_json_is_malformed_response() {
        let (builder, _) = builder_with("not json at all");
        let err = builder.build("show me POs").await.unwrap_err();
        assert!(matches!(err, AgentError::MalformedResponse(_)));
    }

    #[tokio::test]
    async fn disallowed_column_rejects_whole_spec() {
        let reply = open_po_reply().replace(r#""trandate"]"#, r#""secretfield"]"#);
        let (builder, _) = builder_with(&reply);
        let err = builder.build("show me POs").await.unwrap_err();
        assert!(matches!(err, AgentError::DisallowedField { ref field, .. } if field == "secretfield"));
    }

    #[tokio::test]
    async fn oracle_failure_propagates() {
        let client = Arc::new(ScriptedGenerationClient::new());
        client.queue_failure("upstream 500");
        let builder = SearchSpecBuilder::new(client, Arc::new(VocabularyRegistry::standard()));
        let err = builder.build("show me POs").await.unwrap_err();
        assert!(matches!(err, AgentError::GenerationUnavailable(_)));
    }
}
