use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Record types a saved search may target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordType {
    PurchaseOrder,
    SalesOrder,
    Transaction,
}

impl RecordType {
    pub const ALL: [RecordType; 3] = [
        RecordType::PurchaseOrder,
        RecordType::SalesOrder,
        RecordType::Transaction,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RecordType::PurchaseOrder => "purchaseorder",
            RecordType::SalesOrder => "salesorder",
            RecordType::Transaction => "transaction",
        }
    }

    /// Name of the field group whose columns apply to this record type.
    /// All current record types are transactions.
    pub fn field_group(&self) -> &'static str {
        match self {
            RecordType::PurchaseOrder | RecordType::SalesOrder | RecordType::Transaction => {
                "transaction"
            }
        }
    }
}

impl fmt::Display for RecordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown record type '{0}'")]
pub struct UnknownRecordType(pub String);

impl FromStr for RecordType {
    type Err = UnknownRecordType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        RecordType::ALL
            .into_iter()
            .find(|rt| rt.as_str() == s)
            .ok_or_else(|| UnknownRecordType(s.to_string()))
    }
}

/// Comparison operators allowed inside a filter triplet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Operator {
    AnyOf,
    NoneOf,
    Is,
    IsNot,
    GreaterThan,
    LessThan,
    GreaterThanOrEqualTo,
    LessThanOrEqualTo,
    OnOrAfter,
    OnOrBefore,
    On,
}

impl Operator {
    pub const ALL: [Operator; 11] = [
        Operator::AnyOf,
        Operator::NoneOf,
        Operator::Is,
        Operator::IsNot,
        Operator::GreaterThan,
        Operator::LessThan,
        Operator::GreaterThanOrEqualTo,
        Operator::LessThanOrEqualTo,
        Operator::OnOrAfter,
        Operator::OnOrBefore,
        Operator::On,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Operator::AnyOf => "anyof",
            Operator::NoneOf => "noneof",
            Operator::Is => "is",
            Operator::IsNot => "isnot",
            Operator::GreaterThan => "greaterthan",
            Operator::LessThan => "lessthan",
            Operator::GreaterThanOrEqualTo => "greaterthanorequalto",
            Operator::LessThanOrEqualTo => "lessthanorequalto",
            Operator::OnOrAfter => "onorafter",
            Operator::OnOrBefore => "onorbefore",
            Operator::On => "on",
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown operator '{0}'")]
pub struct UnknownOperator(pub String);

impl FromStr for Operator {
    type Err = UnknownOperator;

    /// Exact, case-sensitive match against the wire names.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Operator::ALL
            .into_iter()
            .find(|op| op.as_str() == s)
            .ok_or_else(|| UnknownOperator(s.to_string()))
    }
}

/// Boolean connector joining two filter conditions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Connector {
    And,
    Or,
}

/// A single `[fieldId, operator, value]` condition.
///
/// Serialized as a 3-element JSON array to match the saved-search API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "(String, Operator, Value)", into = "(String, Operator, Value)")]
pub struct FilterTriplet {
    pub field: String,
    pub operator: Operator,
    pub value: Value,
}

impl FilterTriplet {
    pub fn new(field: impl Into<String>, operator: Operator, value: impl Into<Value>) -> Self {
        Self {
            field: field.into(),
            operator,
            value: value.into(),
        }
    }
}

impl From<(String, Operator, Value)> for FilterTriplet {
    fn from((field, operator, value): (String, Operator, Value)) -> Self {
        Self {
            field,
            operator,
            value,
        }
    }
}

impl From<FilterTriplet> for (String, Operator, Value) {
    fn from(t: FilterTriplet) -> Self {
        (t.field, t.operator, t.value)
    }
}

/// One element of a filter expression.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FilterNode {
    Condition(FilterTriplet),
    Connector(Connector),
}

/// Structural problems with a filter expression.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FilterShapeError {
    #[error("filters cannot be empty for saved search")]
    Empty,

    #[error("expected a filter condition at position {0}")]
    ExpectedCondition(usize),

    #[error("expected AND/OR at position {0}")]
    ExpectedConnector(usize),

    #[error("filters must not end with a connector")]
    TrailingConnector,
}

/// Conditions alternating with connectors, starting and ending with a
/// condition. Never empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<FilterNode>", into = "Vec<FilterNode>")]
pub struct FilterExpression(Vec<FilterNode>);

impl FilterExpression {
    pub fn new(nodes: Vec<FilterNode>) -> Result<Self, FilterShapeError> {
        if nodes.is_empty() {
            return Err(FilterShapeError::Empty);
        }
        for (i, node) in nodes.iter().enumerate() {
            match (i % 2 == 0, node) {
                (true, FilterNode::Condition(_)) | (false, FilterNode::Connector(_)) => {}
                (true, FilterNode::Connector(_)) => {
                    return Err(FilterShapeError::ExpectedCondition(i));
                }
                (false, FilterNode::Condition(_)) => {
                    return Err(FilterShapeError::ExpectedConnector(i));
                }
            }
        }
        if nodes.len() % 2 == 0 {
            return Err(FilterShapeError::TrailingConnector);
        }
        Ok(Self(nodes))
    }

    /// Expression holding a single condition.
    pub fn single(condition: FilterTriplet) -> Self {
        Self(vec![FilterNode::Condition(condition)])
    }

    pub fn and(mut self, condition: FilterTriplet) -> Self {
        self.0.push(FilterNode::Connector(Connector::And));
        self.0.push(FilterNode::Condition(condition));
        self
    }

    pub fn or(mut self, condition: FilterTriplet) -> Self {
        self.0.push(FilterNode::Connector(Connector::Or));
        self.0.push(FilterNode::Condition(condition));
        self
    }

    pub fn nodes(&self) -> &[FilterNode] {
        &self.0
    }

    pub fn conditions(&self) -> impl Iterator<Item = &FilterTriplet> {
        self.0.iter().filter_map(|node| match node {
            FilterNode::Condition(t) => Some(t),
            FilterNode::Connector(_) => None,
        })
    }
}

impl TryFrom<Vec<FilterNode>> for FilterExpression {
    type Error = FilterShapeError;

    fn try_from(nodes: Vec<FilterNode>) -> Result<Self, Self::Error> {
        Self::new(nodes)
    }
}

impl From<FilterExpression> for Vec<FilterNode> {
    fn from(expr: FilterExpression) -> Self {
        expr.0
    }
}

/// The only action a search spec can request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SearchAction {
    #[default]
    #[serde(rename = "create_saved_search")]
    CreateSavedSearch,
}

/// Structured description of a saved search over domain records.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct SearchSpec {
    pub action: SearchAction,
    pub record_type: RecordType,
    pub search_title: String,
    pub filters: FilterExpression,
    pub columns: Vec<String>,
}

/// A validated search spec plus the oracle's plain-English explanation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchBuilderResult {
    pub search_spec: SearchSpec,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
}
