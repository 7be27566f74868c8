//! Field mapping pipeline for the sandbox-sim framework.
//!
//! Records pass through three ordered stages, each driven by declarative
//! rules:
//!
//! ```text
//! input ──► MappingRule* ──► TransformRule* ──► output ──► ValidationRule* ──► errors
//! ```
//!
//! Mapping and transforms are separate passes so a transform can be layered
//! onto an already-mapped field without redefining the mapping. Transforms
//! never fail: unparseable input degrades to a sentinel (`NaN`, `""` or
//! `null`). Validation evaluates every rule and reports every violation.
//!
//! # Example
//!
//! ```rust
//! use sim_core::Value;
//! use sim_mapping::{apply_mapping, MappingRule, Transform, TransformRule};
//!
//! let input = Value::from(serde_json::json!({ "amt": "1250" }));
//! let output = apply_mapping(
//!     &input,
//!     &[MappingRule::new("amt", "invoice.amount")],
//!     &[TransformRule::new(
//!         "invoice.amount",
//!         Transform::ToNumber { divide: Some(100.0), multiply: None },
//!     )],
//! );
//! assert_eq!(output.get_path("invoice.amount"), Some(&Value::Float(12.5)));
//! ```

pub mod pipeline;
pub mod rules;
pub mod transform;
pub mod validate;

pub use pipeline::{
    apply_mapping, preview_mapping, validate_mapping, MappingPreview, ValidationOutcome,
};
pub use rules::{
    Calculation, MappingError, MappingRule, RuleSet, Transform, TransformRule, ValidationKind,
    ValidationRule,
};
pub use validate::ValidationError;
