//! Agent error taxonomy.

use std::fmt;

use serde::Serialize;
use thiserror::Error;

/// Where a disallowed field id appeared in a search spec.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldLocation {
    Column,
    Filter,
}

impl fmt::Display for FieldLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldLocation::Column => f.write_str("column"),
            FieldLocation::Filter => f.write_str("filter field"),
        }
    }
}

/// Errors raised while classifying a request or building a search spec.
///
/// Every variant propagates unchanged from the component that detected it
/// up to the caller of the dispatcher.
#[derive(Debug, Error)]
pub enum AgentError {
    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("generation unavailable: {0}")]
    GenerationUnavailable(String),

    #[error("malformed response from model: {0}")]
    MalformedResponse(String),

    #[error("schema violation: {0}")]
    SchemaViolation(String),

    #[error("{location} '{field}' is not allowed / not in the search vocabulary")]
    DisallowedField {
        field: String,
        location: FieldLocation,
    },

    #[error("filter operator '{operator}' is not allowed")]
    DisallowedOperator { operator: String },
}

/// Logical signal a hosting layer translates into its own status codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorClass {
    /// Startup must abort.
    Fatal,
    /// The oracle failed; safe to retry at a higher layer.
    Upstream,
    /// The oracle answered with something unusable.
    Internal,
    /// The request was understood but cannot be fulfilled safely.
    ClientCorrectable,
}

impl AgentError {
    pub fn class(&self) -> ErrorClass {
        match self {
            AgentError::Configuration(_) => ErrorClass::Fatal,
            AgentError::GenerationUnavailable(_) => ErrorClass::Upstream,
            AgentError::MalformedResponse(_) | AgentError::SchemaViolation(_) => {
                ErrorClass::Internal
            }
            AgentError::DisallowedField { .. } | AgentError::DisallowedOperator { .. } => {
                ErrorClass::ClientCorrectable
            }
        }
    }

    pub fn is_retryable(&self) -> bool {
        matches!(self, AgentError::GenerationUnavailable(_))
    }
}

/// Convenience alias for agent results.
pub type AgentResult<T> = Result<T, AgentError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classes_follow_taxonomy() {
        assert_eq!(
            AgentError::Configuration("OPENAI_API_KEY".into()).class(),
            ErrorClass::Fatal
        );
        assert_eq!(
            AgentError::GenerationUnavailable("503".into()).class(),
            ErrorClass::Upstream
        );
        assert_eq!(
            AgentError::MalformedResponse("eof".into()).class(),
            ErrorClass::Internal
        );
        assert_eq!(
            AgentError::SchemaViolation("missing field".into()).class(),
            ErrorClass::Internal
        );
        assert_eq!(
            AgentError::DisallowedOperator {
                operator: "contains".into()
            }
            .class(),
            ErrorClass::ClientCorrectable
        );
    }

    #[test]
    fn only_generation_failures_are_retryable() {
        assert!(AgentError::GenerationUnavailable("timeout".into()).is_retryable());
        assert!(!AgentError::MalformedResponse("x".into()).is_retryable());
        assert!(
            !AgentError::DisallowedField {
                field: "secretfield".into(),
                location: FieldLocation::Column,
            }
            .is_retryable()
        );
    }

    #[test]
    fn disallowed_field_message_names_field() {
        let err = AgentError::DisallowedField {
            field: "custom_weird_field".into(),
            location: FieldLocation::Filter,
        };
        assert_eq!(
            err.to_string(),
            "filter field 'custom_weird_field' is not allowed / not in the search vocabulary"
        );
    }

    #[test]
    fn error_class_serializes_snake_case() {
        assert_eq!(
            serde_json::to_string(&ErrorClass::ClientCorrectable).unwrap(),
            "\"client_correctable\""
        );
    }
}
