//! Core types for the sandbox-sim framework.
//!
//! This crate provides the foundational types shared by every other crate
//! in the workspace:
//!
//! - [`Value`] - Dynamic value used for record fields, rule defaults and lookups
//! - [`Record`] - A synthetic entity record tagged with its [`EntityKind`]
//! - [`EntityKind`] - The closed set of business entities the generator knows
//!
//! # Architecture
//!
//! ```text
//! sim-core (this crate)
//!    │
//!    ├─── sim-generator  (produces Records from a seeded LCG)
//!    ├─── sim-mapping    (maps/transforms/validates Values)
//!    └─── sandbox-sim    (job runner and replay engine)
//! ```
//!
//! # Example
//!
//! ```rust
//! use sim_core::Value;
//!
//! let mut value = Value::object();
//! value.set_path("account.owner.name", Value::from("Ada"));
//! assert_eq!(value.get_path("account.owner.name"), Some(&Value::from("Ada")));
//! ```

pub mod kind;
pub mod record;
pub mod value;

// Re-exports for convenience
pub use kind::{EntityKind, UnknownEntityKind};
pub use record::{identifier_of, Record, RecordBuilder, IDENTIFIER_FIELDS};
pub use value::Value;
