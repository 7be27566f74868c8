//! Declarative rule definitions.
//!
//! Rules deserialize from YAML or JSON. Transforms and validations are
//! internally tagged on `type`, the same way generator configs are:
//!
//! ```yaml
//! mappings:
//!   - source_field: amt
//!     target_field: invoice.amount
//!     required: true
//! transforms:
//!   - field: invoice.amount
//!     transform:
//!       type: to_number
//!       divide: 100
//! validations:
//!   - field: invoice.amount
//!     rule:
//!       type: positive
//! ```

use serde::{Deserialize, Serialize};
use sim_core::Value;
use std::collections::BTreeMap;

/// Error type for loading rule sets.
#[derive(Debug, thiserror::Error)]
pub enum MappingError {
    /// Error parsing YAML
    #[error("Failed to parse YAML rule set: {0}")]
    YamlError(#[from] serde_yaml::Error),

    /// Error parsing JSON
    #[error("Failed to parse JSON rule set: {0}")]
    JsonError(#[from] serde_json::Error),
}

/// Derive one output field from one input field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MappingRule {
    /// Dot path read from the input record
    pub source_field: String,

    /// Dot path written in the output record
    pub target_field: String,

    /// Whether a missing source should be reported as a warning
    #[serde(default)]
    pub required: bool,

    /// Substituted when the source is absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
}

impl MappingRule {
    /// Create an optional mapping with no default.
    pub fn new(source_field: impl Into<String>, target_field: impl Into<String>) -> Self {
        Self {
            source_field: source_field.into(),
            target_field: target_field.into(),
            required: false,
            default: None,
        }
    }

    /// Mark the mapping as required.
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Set the default used when the source is absent.
    pub fn with_default(mut self, default: impl Into<Value>) -> Self {
        self.default = Some(default.into());
        self
    }
}

/// Numeric operations available to [`Transform::Calculate`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Calculation {
    /// Absolute value
    Abs,
    /// Round to a number of decimal places
    Round {
        #[serde(default)]
        decimals: u32,
    },
}

/// The closed set of field transforms.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Transform {
    /// Coerce to a number, then optionally divide and multiply
    ToNumber {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        divide: Option<f64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        multiply: Option<f64>,
    },

    /// Normalize to an ISO-8601 timestamp, or `YYYY-MM-DD` when `date_only`
    ToDate {
        #[serde(default)]
        date_only: bool,
    },

    /// Coerce to a string
    #[serde(rename = "to_string")]
    Stringify,

    /// Coerce to a boolean
    ToBoolean,

    /// Wrap a number as `{ amount, currency }`
    Currency {
        #[serde(default = "default_currency")]
        currency: String,
    },

    /// Upper-case a string
    Uppercase,

    /// Lower-case a string
    Lowercase,

    /// Trim surrounding whitespace
    Trim,

    /// Split a string into an array
    Split {
        #[serde(default = "default_delimiter")]
        delimiter: String,
    },

    /// Join an array into a string
    Join {
        #[serde(default = "default_delimiter")]
        delimiter: String,
    },

    /// Replace a value through a dictionary
    Lookup {
        table: BTreeMap<String, Value>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        default: Option<Value>,
    },

    /// Numeric calculation
    Calculate { operation: Calculation },
}

fn default_currency() -> String {
    "USD".to_string()
}

fn default_delimiter() -> String {
    ",".to_string()
}

impl Transform {
    /// Name used in messages and logs.
    pub fn name(&self) -> &'static str {
        match self {
            Transform::ToNumber { .. } => "to_number",
            Transform::ToDate { .. } => "to_date",
            Transform::Stringify => "to_string",
            Transform::ToBoolean => "to_boolean",
            Transform::Currency { .. } => "currency",
            Transform::Uppercase => "uppercase",
            Transform::Lowercase => "lowercase",
            Transform::Trim => "trim",
            Transform::Split { .. } => "split",
            Transform::Join { .. } => "join",
            Transform::Lookup { .. } => "lookup",
            Transform::Calculate { .. } => "calculate",
        }
    }
}

/// Apply a transform to one output field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransformRule {
    /// Dot path in the output record
    pub field: String,

    /// Transform to run
    pub transform: Transform,
}

impl TransformRule {
    pub fn new(field: impl Into<String>, transform: Transform) -> Self {
        Self {
            field: field.into(),
            transform,
        }
    }
}

/// The closed set of validation checks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ValidationKind {
    /// Present, not null, not blank
    Required,
    /// Present and not null
    NotNull,
    /// Numeric and greater than zero
    Positive,
    /// Looks like an email address
    Email,
    /// Parseable as a date
    Date,
    /// Numeric or a numeric string
    Numeric,
    /// At least `min` characters or elements
    MinLength { min: usize },
    /// At most `max` characters or elements
    MaxLength { max: usize },
}

impl ValidationKind {
    /// Name used in validation errors.
    pub fn name(&self) -> &'static str {
        match self {
            ValidationKind::Required => "required",
            ValidationKind::NotNull => "not_null",
            ValidationKind::Positive => "positive",
            ValidationKind::Email => "email",
            ValidationKind::Date => "date",
            ValidationKind::Numeric => "numeric",
            ValidationKind::MinLength { .. } => "min_length",
            ValidationKind::MaxLength { .. } => "max_length",
        }
    }
}

/// Check one output field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationRule {
    /// Dot path in the output record
    pub field: String,

    /// Check to run
    pub rule: ValidationKind,

    /// Overrides the generated message
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ValidationRule {
    pub fn new(field: impl Into<String>, rule: ValidationKind) -> Self {
        Self {
            field: field.into(),
            rule,
            message: None,
        }
    }
}

/// The three rule lists that make up one mapping configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RuleSet {
    #[serde(default)]
    pub mappings: Vec<MappingRule>,
    #[serde(default)]
    pub transforms: Vec<TransformRule>,
    #[serde(default)]
    pub validations: Vec<ValidationRule>,
}

impl RuleSet {
    /// Parse a rule set from YAML.
    pub fn from_yaml(content: &str) -> Result<Self, MappingError> {
        Ok(serde_yaml::from_str(content)?)
    }

    /// Parse a rule set from JSON.
    pub fn from_json(content: &str) -> Result<Self, MappingError> {
        Ok(serde_json::from_str(content)?)
    }

    /// True when there are no mapping or transform rules to apply.
    pub fn is_passthrough(&self) -> bool {
        self.mappings.is_empty() && self.transforms.is_empty()
    }

    /// Total number of rules across the three lists.
    pub fn rule_count(&self) -> usize {
        self.mappings.len() + self.transforms.len() + self.validations.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rule_set_from_yaml() {
        let yaml = r#"
mappings:
  - source_field: amt
    target_field: invoice.amount
    required: true
  - source_field: ccy
    target_field: invoice.currency
    default: USD
transforms:
  - field: invoice.amount
    transform:
      type: to_number
      divide: 100
  - field: invoice.status
    transform:
      type: lookup
      table:
        P: paid
        O: open
  - field: invoice.total
    transform:
      type: calculate
      operation:
        op: round
        decimals: 2
  - field: invoice.memo
    transform:
      type: to_string
validations:
  - field: invoice.amount
    rule:
      type: positive
  - field: invoice.memo
    rule:
      type: max_length
      max: 20
"#;
        let rules = RuleSet::from_yaml(yaml).unwrap();

        assert_eq!(rules.mappings.len(), 2);
        assert!(rules.mappings[0].required);
        assert_eq!(rules.mappings[1].default, Some(Value::from("USD")));
        assert_eq!(
            rules.transforms[0].transform,
            Transform::ToNumber {
                divide: Some(100.0),
                multiply: None
            }
        );
        assert_eq!(rules.transforms[1].transform.name(), "lookup");
        assert_eq!(
            rules.transforms[2].transform,
            Transform::Calculate {
                operation: Calculation::Round { decimals: 2 }
            }
        );
        assert_eq!(rules.transforms[3].transform, Transform::Stringify);
        assert_eq!(rules.validations[1].rule, ValidationKind::MaxLength { max: 20 });
        assert_eq!(rules.rule_count(), 8);
        assert!(!rules.is_passthrough());
    }

    #[test]
    fn test_rule_set_defaults() {
        let json = r#"{ "transforms": [ { "field": "tags", "transform": { "type": "split" } } ] }"#;
        let rules = RuleSet::from_json(json).unwrap();
        assert!(rules.mappings.is_empty());
        assert_eq!(
            rules.transforms[0].transform,
            Transform::Split {
                delimiter: ",".to_string()
            }
        );
    }

    #[test]
    fn test_unknown_transform_is_rejected() {
        let result = RuleSet::from_json(
            r#"{ "transforms": [ { "field": "x", "transform": { "type": "explode" } } ] }"#,
        );
        assert!(matches!(result, Err(MappingError::JsonError(_))));
    }

    #[test]
    fn test_empty_rule_set_is_passthrough() {
        assert!(RuleSet::default().is_passthrough());
    }
}
