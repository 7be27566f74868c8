//! Transform implementations.
//!
//! Every transform maps a `Value` to a `Value` without failing. Coercions
//! that cannot make sense of their input fall back to a sentinel: `NaN` for
//! numbers, an empty string for strings and `null` for dates.

use crate::rules::{Calculation, Transform};
use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, Utc};
use sim_core::Value;
use std::collections::BTreeMap;

const TRUTHY_STRINGS: [&str; 5] = ["true", "yes", "y", "1", "on"];

/// Decimal places beyond this exceed `f64` precision.
const MAX_ROUND_DECIMALS: u32 = 15;

const DATETIME_FORMATS: [&str; 3] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
];
const DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", "%m/%d/%Y", "%Y/%m/%d"];

impl Transform {
    /// Run the transform against the current value of a field.
    pub fn apply(&self, value: &Value) -> Value {
        match self {
            Transform::ToNumber { divide, multiply } => {
                let mut number = to_number(value);
                if let Some(divisor) = divide.filter(|d| *d != 0.0) {
                    number /= divisor;
                }
                if let Some(factor) = multiply {
                    number *= factor;
                }
                Value::Float(number)
            }
            Transform::ToDate { date_only } => match parse_date(value) {
                Some(dt) if *date_only => Value::String(dt.format("%Y-%m-%d").to_string()),
                Some(dt) => Value::String(dt.to_rfc3339_opts(SecondsFormat::Millis, true)),
                None => Value::Null,
            },
            Transform::Stringify => Value::String(value.to_plain_string()),
            Transform::ToBoolean => Value::Bool(is_truthy(value)),
            Transform::Currency { currency } => {
                let amount = match value {
                    Value::Object(obj) => obj.get("amount").map_or(f64::NAN, to_number),
                    other => to_number(other),
                };
                let mut wrapped = BTreeMap::new();
                wrapped.insert("amount".to_string(), Value::Float(amount));
                wrapped.insert("currency".to_string(), Value::from(currency.as_str()));
                Value::Object(wrapped)
            }
            Transform::Uppercase => Value::String(value.to_plain_string().to_uppercase()),
            Transform::Lowercase => Value::String(value.to_plain_string().to_lowercase()),
            Transform::Trim => Value::String(value.to_plain_string().trim().to_string()),
            Transform::Split { delimiter } => match value {
                Value::Array(_) => value.clone(),
                Value::Null => Value::Array(Vec::new()),
                other => Value::Array(
                    other
                        .to_plain_string()
                        .split(delimiter.as_str())
                        .map(|part| Value::from(part.trim()))
                        .collect(),
                ),
            },
            Transform::Join { delimiter } => match value {
                Value::Array(items) => Value::String(
                    items
                        .iter()
                        .map(Value::to_plain_string)
                        .collect::<Vec<_>>()
                        .join(delimiter),
                ),
                other => Value::String(other.to_plain_string()),
            },
            Transform::Lookup { table, default } => table
                .get(&value.to_plain_string())
                .or(default.as_ref())
                .cloned()
                .unwrap_or_else(|| value.clone()),
            Transform::Calculate { operation } => {
                let number = to_number(value);
                let result = match operation {
                    Calculation::Abs => number.abs(),
                    Calculation::Round { decimals } => {
                        let decimals = (*decimals).min(MAX_ROUND_DECIMALS);
                        let factor = 10f64.powi(decimals as i32);
                        (number * factor).round() / factor
                    }
                };
                Value::Float(result)
            }
        }
    }
}

/// Coerce to `f64`, yielding `NaN` when the value has no numeric reading.
pub fn to_number(value: &Value) -> f64 {
    match value {
        Value::Int(i) => *i as f64,
        Value::Float(f) => *f,
        Value::Bool(b) => f64::from(u8::from(*b)),
        Value::String(s) => s.trim().parse::<f64>().unwrap_or(f64::NAN),
        Value::Null | Value::Array(_) | Value::Object(_) => f64::NAN,
    }
}

/// Truthiness used by the boolean coercion.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Int(i) => *i != 0,
        Value::Float(f) => *f != 0.0 && !f.is_nan(),
        Value::String(s) => TRUTHY_STRINGS.contains(&s.trim().to_lowercase().as_str()),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Parse a value as a UTC timestamp.
///
/// Accepts RFC 3339, naive date-times and dates in a few common layouts, and
/// integers as epoch milliseconds.
pub fn parse_date(value: &Value) -> Option<DateTime<Utc>> {
    match value {
        Value::String(s) => parse_date_str(s.trim()),
        Value::Int(millis) => DateTime::from_timestamp_millis(*millis),
        Value::Float(millis) if millis.is_finite() => {
            DateTime::from_timestamp_millis(millis.trunc() as i64)
        }
        _ => None,
    }
}

fn parse_date_str(s: &str) -> Option<DateTime<Utc>> {
    if s.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Some(naive) = DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
    {
        return Some(naive.and_utc());
    }
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}
