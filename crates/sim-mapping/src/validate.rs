//! Validation checks.
//!
//! Apart from `required` and `not_null`, checks pass on absent or null
//! fields; presence is the job of the two presence rules.

use crate::rules::{ValidationKind, ValidationRule};
use crate::transform::{parse_date, to_number};
use serde::{Deserialize, Serialize};
use sim_core::Value;

/// A single failed validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationError {
    /// Field the rule was evaluated against
    pub field: String,
    /// Rule name (e.g. `required`, `min_length`)
    pub rule: String,
    /// Human-readable explanation
    pub message: String,
}

impl ValidationRule {
    /// Evaluate the rule against a record, returning the error if it fails.
    pub fn check(&self, record: &Value) -> Option<ValidationError> {
        let value = record.get_path(&self.field);
        let failure = evaluate(&self.rule, &self.field, value)?;
        Some(ValidationError {
            field: self.field.clone(),
            rule: self.rule.name().to_string(),
            message: self.message.clone().unwrap_or(failure),
        })
    }
}

/// Returns the default failure message, or `None` when the check passes.
fn evaluate(kind: &ValidationKind, field: &str, value: Option<&Value>) -> Option<String> {
    match kind {
        ValidationKind::Required => match value {
            None | Some(Value::Null) => Some(format!("{field} is required")),
            Some(Value::String(s)) if s.trim().is_empty() => Some(format!("{field} is required")),
            Some(_) => None,
        },
        ValidationKind::NotNull => match value {
            None | Some(Value::Null) => Some(format!("{field} must not be null")),
            Some(_) => None,
        },
        _ => {
            let value = value.filter(|v| !v.is_null())?;
            evaluate_present(kind, field, value)
        }
    }
}

fn evaluate_present(kind: &ValidationKind, field: &str, value: &Value) -> Option<String> {
    match kind {
        ValidationKind::Required | ValidationKind::NotNull => None,
        ValidationKind::Positive => {
            let number = numeric_value(value);
            (!matches!(number, Some(n) if n > 0.0))
                .then(|| format!("{field} must be a positive number"))
        }
        ValidationKind::Email => {
            let valid = value.as_str().is_some_and(is_email_shaped);
            (!valid).then(|| format!("{field} must be a valid email address"))
        }
        ValidationKind::Date => parse_date(value)
            .is_none()
            .then(|| format!("{field} must be a valid date")),
        ValidationKind::Numeric => numeric_value(value)
            .is_none()
            .then(|| format!("{field} must be numeric")),
        ValidationKind::MinLength { min } => {
            let len = length_of(value);
            (len < *min).then(|| format!("{field} must be at least {min} characters (got {len})"))
        }
        ValidationKind::MaxLength { max } => {
            let len = length_of(value);
            (len > *max).then(|| format!("{field} must be at most {max} characters (got {len})"))
        }
    }
}

/// Finite numeric reading of a number or numeric string.
fn numeric_value(value: &Value) -> Option<f64> {
    match value {
        Value::Int(_) | Value::Float(_) | Value::String(_) => {
            Some(to_number(value)).filter(|n| n.is_finite())
        }
        _ => None,
    }
}

fn length_of(value: &Value) -> usize {
    match value {
        Value::Array(items) => items.len(),
        Value::Object(obj) => obj.len(),
        other => other.to_plain_string().chars().count(),
    }
}

/// `local@domain.tld` with no whitespace and exactly one `@`.
fn is_email_shaped(s: &str) -> bool {
    if s.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = s.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }
    match domain.rsplit_once('.') {
        Some((host, tld)) => !host.is_empty() && !tld.is_empty() && !domain.starts_with('.'),
        None => false,
    }
}
