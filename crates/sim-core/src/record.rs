//! Synthetic entity records.

use crate::kind::EntityKind;
use crate::value::Value;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Fields that satisfy the minimal shape check, in lookup order.
pub const IDENTIFIER_FIELDS: [&str; 3] = ["id", "txn_id", "position_id"];

/// A single generated record.
///
/// `Record` is produced by the data generator and handed to the mapping
/// pipeline as a [`Value::Object`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    /// Entity kind this record was generated as
    pub kind: EntityKind,

    /// Position within the generated batch
    pub index: u64,

    /// Field values (field name -> value)
    pub fields: BTreeMap<String, Value>,
}

impl Record {
    /// Create a new record.
    pub fn new(kind: EntityKind, index: u64, fields: BTreeMap<String, Value>) -> Self {
        Self {
            kind,
            index,
            fields,
        }
    }

    /// Create a new record with a builder pattern.
    pub fn builder(kind: EntityKind, index: u64) -> RecordBuilder {
        RecordBuilder {
            kind,
            index,
            fields: BTreeMap::new(),
        }
    }

    /// Get a field value by name.
    pub fn get_field(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    /// Get the number of fields.
    pub fn field_count(&self) -> usize {
        self.fields.len()
    }

    /// The first identifier field present, rendered as a string.
    pub fn identifier(&self) -> Option<String> {
        identifier_of(&Value::Object(self.fields.clone()))
    }

    /// Convert the record's fields into an object value.
    pub fn to_value(&self) -> Value {
        Value::Object(self.fields.clone())
    }

    /// Consume the record, keeping only its fields as an object value.
    pub fn into_value(self) -> Value {
        Value::Object(self.fields)
    }
}

/// Identifier of an arbitrary (possibly mapped) record value.
///
/// Null and empty-string identifiers do not count.
pub fn identifier_of(value: &Value) -> Option<String> {
    IDENTIFIER_FIELDS.iter().find_map(|field| match value.get(field) {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) if s.is_empty() => None,
        Some(v) => Some(v.to_plain_string()),
    })
}

/// Builder for `Record`.
pub struct RecordBuilder {
    kind: EntityKind,
    index: u64,
    fields: BTreeMap<String, Value>,
}

impl RecordBuilder {
    /// Add a field to the record.
    pub fn field(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(name.into(), value.into());
        self
    }

    /// Build the record.
    pub fn build(self) -> Record {
        Record {
            kind: self.kind,
            index: self.index,
            fields: self.fields,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_builder() {
        let record = Record::builder(EntityKind::Account, 3)
            .field("id", "acc_1")
            .field("balance", 10.5)
            .build();

        assert_eq!(record.kind, EntityKind::Account);
        assert_eq!(record.index, 3);
        assert_eq!(record.field_count(), 2);
        assert_eq!(record.get_field("id"), Some(&Value::from("acc_1")));
    }

    #[test]
    fn test_identifier_lookup_order() {
        let record = Record::builder(EntityKind::Transaction, 0)
            .field("txn_id", "txn_9")
            .build();
        assert_eq!(record.identifier(), Some("txn_9".to_string()));

        let record = Record::builder(EntityKind::Position, 0)
            .field("position_id", "pos_1")
            .field("id", "generic")
            .build();
        assert_eq!(record.identifier(), Some("generic".to_string()));
    }

    #[test]
    fn test_identifier_ignores_empty_values() {
        let mut value = Value::object();
        value.set_path("id", Value::from(""));
        value.set_path("txn_id", Value::Null);
        assert_eq!(identifier_of(&value), None);

        value.set_path("position_id", Value::Int(7));
        assert_eq!(identifier_of(&value), Some("7".to_string()));
    }
}
