use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Coarse-grained classification of what a user's request requires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntentLabel {
    /// General Q&A, explanations, how-to and meta questions.
    Chat,
    /// The user wants to see, filter, list or report on records.
    SearchBuilder,
}

impl IntentLabel {
    pub fn as_str(&self) -> &'static str {
        match self {
            IntentLabel::Chat => "chat",
            IntentLabel::SearchBuilder => "search_builder",
        }
    }
}

impl fmt::Display for IntentLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raised when a confidence score falls outside the closed unit interval.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
#[error("confidence must be between 0 and 1, got {0}")]
pub struct ConfidenceOutOfRange(pub f64);

/// Classifier confidence score, always within `[0.0, 1.0]`.
///
/// Out-of-range values are rejected at construction and during
/// deserialization; they are never clamped.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct Confidence(f64);

impl Confidence {
    pub fn new(value: f64) -> Result<Self, ConfidenceOutOfRange> {
        if (0.0..=1.0).contains(&value) {
            Ok(Self(value))
        } else {
            Err(ConfidenceOutOfRange(value))
        }
    }

    pub fn value(&self) -> f64 {
        self.0
    }
}

impl TryFrom<f64> for Confidence {
    type Error = ConfidenceOutOfRange;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Confidence> for f64 {
    fn from(confidence: Confidence) -> Self {
        confidence.0
    }
}

/// Output of the intent classifier: label, confidence and rationale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct IntentResult {
    pub intent: IntentLabel,
    pub confidence: Confidence,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reasoning: Option<String>,
}
