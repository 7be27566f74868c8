//! Main data generator for producing synthetic records.

use crate::generators::{self, SynthContext};
use crate::lcg::Lcg;
use crate::payload::MockPayload;
use chrono::NaiveDate;
use sim_core::{EntityKind, Record, UnknownEntityKind};

/// Seed used when a generator is created without one.
pub const DEFAULT_SEED: u32 = 42;

/// Error type for generator operations.
#[derive(Debug, thiserror::Error)]
pub enum GeneratorError {
    /// Entity name did not match any known kind
    #[error(transparent)]
    UnknownEntity(#[from] UnknownEntityKind),
}

/// Default anchor for generated dates.
pub fn default_base_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 12, 31).unwrap_or(NaiveDate::MIN)
}

/// Data generator that produces deterministic synthetic records.
///
/// All randomness comes from a single [`Lcg`] stream. Supplying a seed to
/// [`DataGenerator::generate`] resets the stream first; omitting it continues
/// from wherever the previous call left off.
#[derive(Debug, Clone)]
pub struct DataGenerator {
    /// Seeded draw stream
    lcg: Lcg,
    /// Anchor date; generated dates are offsets back from it
    base_date: NaiveDate,
}

impl Default for DataGenerator {
    fn default() -> Self {
        Self::new(DEFAULT_SEED)
    }
}

impl DataGenerator {
    /// Create a new data generator with the given seed.
    pub fn new(seed: u32) -> Self {
        Self {
            lcg: Lcg::new(seed),
            base_date: default_base_date(),
        }
    }

    /// Anchor generated dates on a different base date.
    pub fn with_base_date(mut self, base_date: NaiveDate) -> Self {
        self.base_date = base_date;
        self
    }

    /// Reset the draw stream to `seed`.
    pub fn reset(&mut self, seed: u32) {
        self.lcg.reset(seed);
    }

    /// Seed of the current stream.
    pub fn seed(&self) -> u32 {
        self.lcg.seed()
    }

    /// Draws taken since the last reset.
    pub fn draws(&self) -> u64 {
        self.lcg.draws()
    }

    /// Draw one float in `[0, 1)` from the shared stream.
    ///
    /// Used by callers (such as error injection) that need to share the
    /// generator's stream rather than own one.
    pub fn next_draw(&mut self) -> f64 {
        self.lcg.next_f64()
    }

    /// Generate `count` records of `kind`.
    ///
    /// When `seed` is given the stream is reset to it before generating.
    pub fn generate(&mut self, kind: EntityKind, count: usize, seed: Option<u32>) -> Vec<Record> {
        if let Some(seed) = seed {
            self.reset(seed);
        }
        self.records(kind, count as u64).collect()
    }

    /// Generate a payload for a connector, parsing the entity name leniently
    /// (`"positions"` and `"position"` are both accepted).
    pub fn generate_mock_payload(
        &mut self,
        connector_id: &str,
        entity: &str,
        count: usize,
        seed: Option<u32>,
    ) -> Result<MockPayload, GeneratorError> {
        let kind: EntityKind = entity.parse()?;
        let records = self.generate(kind, count, seed);
        Ok(MockPayload::new(connector_id, kind, seed, records))
    }

    /// Synthesize the record at `index` of a batch.
    pub fn next_record(&mut self, kind: EntityKind, index: u64) -> Record {
        let mut ctx = SynthContext {
            lcg: &mut self.lcg,
            index,
            base_date: self.base_date,
        };
        generators::synthesize(kind, &mut ctx)
    }

    /// Generate multiple records lazily.
    pub fn records(&mut self, kind: EntityKind, count: u64) -> RecordIterator<'_> {
        RecordIterator {
            generator: self,
            kind,
            next_index: 0,
            count,
        }
    }
}

/// Iterator that lazily generates records.
pub struct RecordIterator<'a> {
    generator: &'a mut DataGenerator,
    kind: EntityKind,
    next_index: u64,
    count: u64,
}

impl Iterator for RecordIterator<'_> {
    type Item = Record;

    fn next(&mut self) -> Option<Self::Item> {
        if self.next_index >= self.count {
            return None;
        }

        let record = self.generator.next_record(self.kind, self.next_index);
        self.next_index += 1;
        Some(record)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = (self.count - self.next_index) as usize;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for RecordIterator<'_> {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generators::{draws_per_record, TICKERS};
    use sim_core::Value;

    #[test]
    fn test_generate_positions_cycle_tickers() {
        let mut generator = DataGenerator::default();
        let records = generator.generate(EntityKind::Position, 12, Some(12345));

        assert_eq!(records.len(), 12);
        for (i, record) in records.iter().enumerate() {
            assert_eq!(record.index, i as u64);
            assert_eq!(
                record.get_field("security_id"),
                Some(&Value::from(TICKERS[i % 10]))
            );
        }
    }

    #[test]
    fn test_deterministic_generation() {
        for kind in EntityKind::ALL {
            let mut gen1 = DataGenerator::new(1);
            let mut gen2 = DataGenerator::new(999);

            let first = serde_json::to_string(&gen1.generate(kind, 20, Some(777))).unwrap();
            let second = serde_json::to_string(&gen2.generate(kind, 20, Some(777))).unwrap();
            assert_eq!(first, second, "{kind} output differs for the same seed");
        }
    }

    #[test]
    fn test_stream_continues_without_seed() {
        let mut generator = DataGenerator::new(5);
        let first = generator.generate(EntityKind::Invoice, 3, None);
        let second = generator.generate(EntityKind::Invoice, 3, None);
        assert_ne!(first, second);
        assert_eq!(generator.draws(), 6 * draws_per_record(EntityKind::Invoice));

        // Continuing from seed 5 matches one long batch from seed 5
        let mut replay = DataGenerator::new(5);
        let long = replay.generate(EntityKind::Invoice, 6, None);
        assert_eq!(long[3].fields, second[0].fields);
    }

    #[test]
    fn test_seed_resets_stream() {
        let mut generator = DataGenerator::new(5);
        generator.generate(EntityKind::Contact, 4, None);
        let reseeded = generator.generate(EntityKind::Contact, 2, Some(5));

        let mut fresh = DataGenerator::new(5);
        assert_eq!(reseeded, fresh.generate(EntityKind::Contact, 2, None));
    }

    #[test]
    fn test_transaction_aliases_share_layout() {
        let mut generator = DataGenerator::default();
        let txn = generator.generate(EntityKind::Transaction, 1, Some(3));
        let trade = generator.generate(EntityKind::Trade, 1, Some(3));

        assert_eq!(txn[0].fields, trade[0].fields);
        assert_eq!(trade[0].kind, EntityKind::Trade);
        assert!(trade[0].get_field("txn_id").is_some());
    }

    #[test]
    fn test_mock_payload_parses_plural_entity() {
        let mut generator = DataGenerator::default();
        let payload = generator
            .generate_mock_payload("custodian_mock", "positions", 3, Some(12345))
            .unwrap();

        assert_eq!(payload.connector_id, "custodian_mock");
        assert_eq!(payload.entity_kind, EntityKind::Position);
        assert_eq!(payload.records.len(), 3);
        assert_eq!(payload.record_ids().len(), 3);
    }

    #[test]
    fn test_mock_payload_unknown_entity() {
        let mut generator = DataGenerator::default();
        let result = generator.generate_mock_payload("crm", "widgets", 1, None);
        assert!(matches!(result, Err(GeneratorError::UnknownEntity(_))));
    }

    #[test]
    fn test_base_date_anchors_dates() {
        let base = NaiveDate::from_ymd_opt(2020, 6, 30).unwrap();
        let mut generator = DataGenerator::new(1).with_base_date(base);
        let records = generator.generate(EntityKind::Position, 1, None);
        assert_eq!(
            records[0].get_field("as_of_date"),
            Some(&Value::from("2020-06-30"))
        );
    }

    #[test]
    fn test_iterator_size_hint() {
        let mut generator = DataGenerator::default();
        let mut iter = generator.records(EntityKind::Price, 4);
        assert_eq!(iter.len(), 4);
        iter.next();
        assert_eq!(iter.len(), 3);
    }
}
