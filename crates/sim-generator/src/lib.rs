//! Data generator for the sandbox-sim framework.
//!
//! This crate provides the `DataGenerator` which produces deterministic
//! synthetic business records. The generator draws from a 31-bit linear
//! congruential generator so the same seed yields byte-identical output,
//! independent of platform or `rand` version.
//!
//! # Architecture
//!
//! ```text
//! EntityKind + count + seed?
//!        │
//!        ▼
//! ┌─────────────────┐
//! │  DataGenerator  │
//! │                 │
//! │  - lcg (Lcg)    │
//! │  - base_date    │
//! └────────┬────────┘
//!          │
//!          ▼
//!    Record { kind, index, fields }
//! ```
//!
//! # Example
//!
//! ```rust
//! use sim_generator::DataGenerator;
//! use sim_core::EntityKind;
//!
//! let mut generator = DataGenerator::new(42);
//! let first = generator.generate(EntityKind::Position, 3, Some(12345));
//! let again = generator.generate(EntityKind::Position, 3, Some(12345));
//! assert_eq!(first, again);
//! ```
//!
//! # Entity kinds
//!
//! - `transaction` (also `trade` and `activity`) - carries `txn_id`
//! - `position` - carries `position_id`, ticker cycles by index
//! - `invoice`, `account`, `contact`, `document`, `price`, `tax_lot` - carry `id`

pub mod generator;
pub mod generators;
pub mod lcg;
pub mod payload;

// Re-exports for convenience
pub use generator::{DataGenerator, GeneratorError, RecordIterator};
pub use lcg::Lcg;
pub use payload::MockPayload;
