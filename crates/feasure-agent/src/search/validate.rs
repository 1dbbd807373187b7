//! Validation of oracle-produced search specs.
//!
//! Two passes, all-or-nothing:
//! 1. **Structural**: JSON shape, literal values, record type membership,
//!    non-empty title/filters/columns, filter alternation. Failures are
//!    `SchemaViolation`.
//! 2. **Semantic**: every column and filter field must be in the
//!    registry's field list for the record type (filters may also use
//!    `type`); every operator must be allowed. Failures are
//!    `DisallowedField` / `DisallowedOperator`.
//!
//! Nothing is repaired or dropped: one bad entry rejects the whole spec.

use feasure_protocol::{
    Connector, FilterExpression, FilterNode, FilterShapeError, FilterTriplet, Operator,
    RecordType, SearchAction, SearchBuilderResult, SearchSpec,
};
use serde::Deserialize;
use serde_json::Value;

use crate::error::{AgentError, AgentResult, FieldLocation};
use crate::vocabulary::VocabularyRegistry;

/// Filter field addressing the record's transaction-type code. Allowed
/// even though it is not a registry field.
pub const TYPE_FIELD: &str = "type";

/// Expected top-level shape of the builder's oracle response.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct BuilderResponse {
    #[allow(dead_code)]
    mode: BuilderMode,
    search_spec: SpecDraft,
    #[serde(default)]
    explanation: Option<String>,
}

#[derive(Debug, Deserialize)]
enum BuilderMode {
    #[serde(rename = "search_builder")]
    SearchBuilder,
}

/// Search spec before semantic checks; operators are still text.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct SpecDraft {
    action: SearchAction,
    record_type: RecordType,
    search_title: String,
    filters: Vec<Value>,
    columns: Vec<String>,
}

#[derive(Debug)]
enum DraftNode {
    Condition {
        field: String,
        operator: String,
        value: Value,
    },
    Connector(Connector),
}

fn schema_violation(message: impl Into<String>) -> AgentError {
    let message = message.into();
    tracing::warn!(reason = %message, "search spec failed structural validation");
    AgentError::SchemaViolation(format!("search spec validation failed: {message}"))
}

/// Validate a parsed oracle response and produce a usable result.
pub fn validate_builder_response(
    value: Value,
    vocabulary: &VocabularyRegistry,
) -> AgentResult<SearchBuilderResult> {
    let response: BuilderResponse =
        serde_json::from_value(value).map_err(|e| schema_violation(e.to_string()))?;
    let draft = response.search_spec;

    if draft.search_title.trim().is_empty() {
        return Err(schema_violation("searchTitle cannot be empty"));
    }
    if draft.columns.is_empty() {
        return Err(schema_violation("columns cannot be empty for saved search"));
    }
    let nodes = structure_filters(draft.filters)?;

    for column in &draft.columns {
        check_column(vocabulary, draft.record_type, column)?;
    }

    let mut typed = Vec::with_capacity(nodes.len());
    for node in nodes {
        typed.push(match node {
            DraftNode::Condition {
                field,
                operator,
                value,
            } => {
                check_filter_field(vocabulary, draft.record_type, &field)?;
                let operator = check_operator(&operator)?;
                FilterNode::Condition(FilterTriplet {
                    field,
                    operator,
                    value,
                })
            }
            DraftNode::Connector(c) => FilterNode::Connector(c),
        });
    }
    let filters = FilterExpression::new(typed).map_err(|e| schema_violation(e.to_string()))?;

    Ok(SearchBuilderResult {
        search_spec: SearchSpec {
            action: draft.action,
            record_type: draft.record_type,
            search_title: draft.search_title,
            filters,
            columns: draft.columns,
        },
        explanation: response.explanation,
    })
}

/// Re-check an already-typed spec against the registry.
///
/// Accepts every spec produced by `validate_builder_response`.
pub fn validate_search_spec(spec: &SearchSpec, vocabulary: &VocabularyRegistry) -> AgentResult<()> {
    if spec.search_title.trim().is_empty() {
        return Err(schema_violation("searchTitle cannot be empty"));
    }
    if spec.columns.is_empty() {
        return Err(schema_violation("columns cannot be empty for saved search"));
    }
    for column in &spec.columns {
        check_column(vocabulary, spec.record_type, column)?;
    }
    for condition in spec.filters.conditions() {
        check_filter_field(vocabulary, spec.record_type, &condition.field)?;
    }
    Ok(())
}

/// Turn the raw filters array into alternating conditions and connectors.
fn structure_filters(raw: Vec<Value>) -> AgentResult<Vec<DraftNode>> {
    if raw.is_empty() {
        return Err(schema_violation(FilterShapeError::Empty.to_string()));
    }
    let len = raw.len();

    let nodes = raw
        .into_iter()
        .enumerate()
        .map(|(i, item)| {
            if i % 2 == 0 {
                structure_condition(i, item)
            } else {
                structure_connector(i, item)
            }
        })
        .collect::<AgentResult<Vec<_>>>()?;

    if len % 2 == 0 {
        return Err(schema_violation(FilterShapeError::TrailingConnector.to_string()));
    }
    Ok(nodes)
}

fn structure_condition(index: usize, item: Value) -> AgentResult<DraftNode> {
    let Value::Array(parts) = item else {
        return Err(schema_violation(
            FilterShapeError::ExpectedCondition(index).to_string(),
        ));
    };
    if parts.len() != 3 {
        return Err(schema_violation(format!(
            "filter at position {index} must have exactly 3 elements, got {}",
            parts.len()
        )));
    }

    let mut parts = parts.into_iter();
    match (parts.next(), parts.next(), parts.next()) {
        (Some(Value::String(field)), Some(Value::String(operator)), Some(value))
            if is_filter_value(&value) =>
        {
            Ok(DraftNode::Condition {
                field,
                operator,
                value,
            })
        }
        _ => Err(schema_violation(format!(
            "filter at position {index} must be [fieldId, operator, value]"
        ))),
    }
}

/// Strings, numbers, booleans, or arrays of those.
fn is_filter_value(value: &Value) -> bool {
    match value {
        Value::String(_) | Value::Number(_) | Value::Bool(_) => true,
        Value::Array(items) => items
            .iter()
            .all(|v| matches!(v, Value::String(_) | Value::Number(_) | Value::Bool(_))),
        Value::Null | Value::Object(_) => false,
    }
}

fn structure_connector(index: usize, item: Value) -> AgentResult<DraftNode> {
    match item.as_str() {
        Some("AND") => Ok(DraftNode::Connector(Connector::And)),
        Some("OR") => Ok(DraftNode::Connector(Connector::Or)),
        _ => Err(schema_violation(
            FilterShapeError::ExpectedConnector(index).to_string(),
        )),
    }
}

fn check_column(
    vocabulary: &VocabularyRegistry,
    record_type: RecordType,
    column: &str,
) -> AgentResult<()> {
    if vocabulary.is_allowed_field(record_type, column) {
        return Ok(());
    }
    tracing::warn!(column = %column, record_type = %record_type, "disallowed column");
    Err(AgentError::DisallowedField {
        field: column.to_string(),
        location: FieldLocation::Column,
    })
}

fn check_filter_field(
    vocabulary: &VocabularyRegistry,
    record_type: RecordType,
    field: &str,
) -> AgentResult<()> {
    if field == TYPE_FIELD || vocabulary.is_allowed_field(record_type, field) {
        return Ok(());
    }
    tracing::warn!(field = %field, record_type = %record_type, "disallowed filter field");
    Err(AgentError::DisallowedField {
        field: field.to_string(),
        location: FieldLocation::Filter,
    })
}

fn check_operator(operator: &str) -> AgentResult<Operator> {
    operator.parse::<Operator>().map_err(|_| {
        tracing::warn!(operator = %operator, "disallowed filter operator");
        AgentError::DisallowedOperator {
            operator: operator.to_string(),
        }
    })
}
