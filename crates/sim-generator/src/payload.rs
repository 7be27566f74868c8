//! Connector payloads wrapping a generated batch.

use serde::{Deserialize, Serialize};
use sim_core::{EntityKind, Record};

/// A batch of records as a mock connector would return it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MockPayload {
    /// Connector the payload is attributed to
    pub connector_id: String,
    /// Kind of every record in the payload
    pub entity_kind: EntityKind,
    /// Seed the batch was generated from, if one was supplied
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u32>,
    /// Generated records in batch order
    pub records: Vec<Record>,
}

impl MockPayload {
    /// Create a new payload.
    pub fn new(
        connector_id: impl Into<String>,
        entity_kind: EntityKind,
        seed: Option<u32>,
        records: Vec<Record>,
    ) -> Self {
        Self {
            connector_id: connector_id.into(),
            entity_kind,
            seed,
            records,
        }
    }

    /// Identifiers of every record that has one.
    pub fn record_ids(&self) -> Vec<String> {
        self.records.iter().filter_map(Record::identifier).collect()
    }

    /// Number of records in the payload.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the payload holds no records.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
