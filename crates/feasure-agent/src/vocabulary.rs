//! Closed-world search vocabulary: record types, fields, operators, status
//! codes and date placeholders.
//!
//! Built once at startup and shared read-only (`Arc<VocabularyRegistry>`)
//! across requests. Ordered lists feed the prompt snapshot; hash indexes
//! back the O(1) membership checks used during validation.

use std::collections::{HashMap, HashSet};

use feasure_protocol::{Operator, RecordType};
use serde_json::{Map, Value, json};

/// Read-only search vocabulary.
#[derive(Debug, Clone)]
pub struct VocabularyRegistry {
    /// Record type → transaction type code, in display order.
    transaction_types: Vec<(RecordType, String)>,
    /// Field group name → ordered field ids.
    field_groups: Vec<(String, Vec<String>)>,
    field_index: HashMap<String, HashSet<String>>,
    /// Status name → status code, in display order.
    status_codes: Vec<(String, String)>,
    status_index: HashMap<String, String>,
    date_placeholders: Vec<String>,
    date_index: HashSet<String>,
}

impl VocabularyRegistry {
    fn new(
        transaction_types: Vec<(RecordType, String)>,
        field_groups: Vec<(String, Vec<String>)>,
        status_codes: Vec<(String, String)>,
        date_placeholders: Vec<String>,
    ) -> Self {
        let field_index = field_groups
            .iter()
            .map(|(group, fields)| (group.clone(), fields.iter().cloned().collect()))
            .collect();
        let status_index = status_codes.iter().cloned().collect();
        let date_index = date_placeholders.iter().cloned().collect();

        Self {
            transaction_types,
            field_groups,
            field_index,
            status_codes,
            status_index,
            date_placeholders,
            date_index,
        }
    }

    /// The NetSuite transaction vocabulary the agent ships with.
    pub fn standard() -> Self {
        let owned = |items: &[&str]| items.iter().map(|s| s.to_string()).collect::<Vec<_>>();
        let pairs = |items: &[(&str, &str)]| {
            items
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect::<Vec<_>>()
        };

        Self::new(
            vec![
                (RecordType::PurchaseOrder, "PurchOrd".into()),
                (RecordType::SalesOrder, "SalesOrd".into()),
            ],
            vec![(
                "transaction".into(),
                owned(&[
                    "tranid",
                    "entity",
                    "amount",
                    "status",
                    "trandate",
                    "department",
                    "class",
                    "location",
                ]),
            )],
            // "open" is usually any of pending approval / pending receipt /
            // partially received.
            pairs(&[
                ("pending_approval", "PurchOrd:A"),
                ("pending_receipt", "PurchOrd:B"),
                ("partially_received", "PurchOrd:C"),
                ("closed", "PurchOrd:H"),
            ]),
            owned(&[
                "today",
                "yesterday",
                "7d_ago",
                "30d_ago",
                "90d_ago",
                "start_of_month",
                "start_of_last_month",
            ]),
        )
    }

    pub fn record_types(&self) -> &'static [RecordType] {
        &RecordType::ALL
    }

    pub fn is_allowed_record_type(&self, name: &str) -> bool {
        name.parse::<RecordType>().is_ok()
    }

    /// Ordered field ids usable as columns or filter fields for `record_type`.
    pub fn allowed_fields(&self, record_type: RecordType) -> &[String] {
        let group = record_type.field_group();
        self.field_groups
            .iter()
            .find(|(name, _)| name == group)
            .map(|(_, fields)| fields.as_slice())
            .unwrap_or(&[])
    }

    pub fn is_allowed_field(&self, record_type: RecordType, field: &str) -> bool {
        self.field_index
            .get(record_type.field_group())
            .is_some_and(|fields| fields.contains(field))
    }

    pub fn is_allowed_operator(&self, op: &str) -> bool {
        op.parse::<Operator>().is_ok()
    }

    pub fn status_code(&self, name: &str) -> Option<&str> {
        self.status_index.get(name).map(String::as_str)
    }

    pub fn transaction_type_code(&self, name: &str) -> Option<&str> {
        let record_type = name.parse::<RecordType>().ok()?;
        self.transaction_types
            .iter()
            .find(|(rt, _)| *rt == record_type)
            .map(|(_, code)| code.as_str())
    }

    pub fn is_date_placeholder(&self, token: &str) -> bool {
        self.date_index.contains(token)
    }

    /// JSON snapshot embedded in the search builder's instructions.
    pub fn snapshot(&self) -> Value {
        let transaction_types: Map<String, Value> = self
            .transaction_types
            .iter()
            .map(|(rt, code)| (rt.as_str().to_string(), json!(code)))
            .collect();
        let fields: Map<String, Value> = self
            .field_groups
            .iter()
            .map(|(group, ids)| (group.clone(), json!(ids)))
            .collect();
        let statuses: Map<String, Value> = self
            .status_codes
            .iter()
            .map(|(name, code)| (name.clone(), json!(code)))
            .collect();
        let record_types: Vec<&str> = self.record_types().iter().map(RecordType::as_str).collect();

        json!({
            "recordTypes": record_types,
            "transactionTypes": transaction_types,
            "fields": fields,
            "purchaseorderStatus": statuses,
            "datePlaceholders": self.date_placeholders,
        })
    }
}

impl Default for VocabularyRegistry {
    fn default() -> Self {
        Self::standard()
    }
}
