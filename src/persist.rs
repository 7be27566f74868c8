//! Persistence collaborator
//!
//! The job runner hands every valid record to a [`RecordSink`] during the
//! saving phase. The sandbox never owns a datastore; real implementations
//! live in the surrounding application.

use anyhow::Result;
use async_trait::async_trait;
use sim_core::{EntityKind, Value};
use std::sync::{Mutex, PoisonError};

/// Trait for record persistence.
///
/// This trait abstracts the "create record" operation so the same job
/// logic works with:
/// - No storage at all (`NullRecordSink`)
/// - An in-memory collection (`MemoryRecordSink`)
/// - Whatever store the host application provides
#[async_trait]
pub trait RecordSink: Send + Sync {
    /// Persist one mapped record of `kind`.
    async fn create_record(&self, kind: EntityKind, record: &Value) -> Result<()>;
}

/// Sink that accepts and discards every record.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullRecordSink;

#[async_trait]
impl RecordSink for NullRecordSink {
    async fn create_record(&self, _kind: EntityKind, _record: &Value) -> Result<()> {
        Ok(())
    }
}

/// Sink that keeps every record in memory, in arrival order.
#[derive(Debug, Default)]
pub struct MemoryRecordSink {
    records: Mutex<Vec<(EntityKind, Value)>>,
}

impl MemoryRecordSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of everything stored so far.
    pub fn records(&self) -> Vec<(EntityKind, Value)> {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn len(&self) -> usize {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of stored records of `kind`.
    pub fn count_of(&self, kind: EntityKind) -> usize {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|(k, _)| *k == kind)
            .count()
    }
}

#[async_trait]
impl RecordSink for MemoryRecordSink {
    async fn create_record(&self, kind: EntityKind, record: &Value) -> Result<()> {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((kind, record.clone()));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_sink_keeps_order() {
        let sink = MemoryRecordSink::new();
        tokio_test::block_on(async {
            sink.create_record(EntityKind::Invoice, &Value::from("a"))
                .await
                .unwrap();
            sink.create_record(EntityKind::Contact, &Value::from("b"))
                .await
                .unwrap();
        });

        assert_eq!(sink.len(), 2);
        assert_eq!(sink.count_of(EntityKind::Invoice), 1);
        assert_eq!(sink.records()[1].1, Value::from("b"));
    }

    #[tokio::test]
    async fn test_null_sink_accepts_everything() {
        let sink: Box<dyn RecordSink> = Box::new(NullRecordSink);
        assert!(sink
            .create_record(EntityKind::Price, &Value::object())
            .await
            .is_ok());
    }
}
