//! Dynamic value representation for sandbox records.
//!
//! `Value` is the shape every record field, mapping default and lookup
//! entry takes. It deliberately allows non-finite floats so that numeric
//! coercion can degrade to `NaN` instead of failing.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// A dynamically-typed field value.
///
/// Objects use a `BTreeMap` so that serialized output is ordered and two
/// records built from the same draws serialize to identical bytes.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    /// Null or missing value
    #[default]
    Null,

    /// Boolean value
    Bool(bool),

    /// 64-bit signed integer
    Int(i64),

    /// 64-bit floating point (may be `NaN`)
    Float(f64),

    /// String value
    String(String),

    /// Ordered list of values
    Array(Vec<Value>),

    /// Nested object
    Object(BTreeMap<String, Value>),
}

impl Value {
    /// Create an empty object value.
    pub fn object() -> Self {
        Self::Object(BTreeMap::new())
    }

    /// Check if this value is null.
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Try to get this value as a boolean.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Try to get this value as an i64.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Try to get this value as an f64. Integers widen.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Float(f) => Some(*f),
            Self::Int(i) => Some(*i as f64),
            _ => None,
        }
    }

    /// Try to get this value as a string reference.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Try to get this value as an array.
    pub fn as_array(&self) -> Option<&Vec<Value>> {
        match self {
            Self::Array(arr) => Some(arr),
            _ => None,
        }
    }

    /// Try to get this value as an object.
    pub fn as_object(&self) -> Option<&BTreeMap<String, Value>> {
        match self {
            Self::Object(obj) => Some(obj),
            _ => None,
        }
    }

    /// Try to get this value as a mutable object.
    pub fn as_object_mut(&mut self) -> Option<&mut BTreeMap<String, Value>> {
        match self {
            Self::Object(obj) => Some(obj),
            _ => None,
        }
    }

    /// Get a direct child of an object.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.as_object().and_then(|obj| obj.get(key))
    }

    /// Resolve a dot-separated path such as `account.owner.name`.
    ///
    /// Numeric segments index into arrays.
    pub fn get_path(&self, path: &str) -> Option<&Value> {
        path.split('.').try_fold(self, |current, segment| match current {
            Self::Object(obj) => obj.get(segment),
            Self::Array(arr) => segment.parse::<usize>().ok().and_then(|i| arr.get(i)),
            _ => None,
        })
    }

    /// Mutable variant of [`Value::get_path`].
    pub fn get_path_mut(&mut self, path: &str) -> Option<&mut Value> {
        path.split('.')
            .try_fold(self, |current, segment| match current {
                Self::Object(obj) => obj.get_mut(segment),
                Self::Array(arr) => segment
                    .parse::<usize>()
                    .ok()
                    .and_then(move |i| arr.get_mut(i)),
                _ => None,
            })
    }

    /// Write `value` at a dot-separated path, creating intermediate objects.
    ///
    /// Any non-object found along the way (including `self`) is replaced
    /// by an empty object.
    pub fn set_path(&mut self, path: &str, value: Value) {
        let mut segments = path.split('.').peekable();
        let mut current = self;
        while let Some(segment) = segments.next() {
            if !matches!(current, Self::Object(_)) {
                *current = Self::object();
            }
            let Self::Object(obj) = current else {
                return;
            };
            if segments.peek().is_none() {
                obj.insert(segment.to_string(), value);
                return;
            }
            current = obj
                .entry(segment.to_string())
                .or_insert_with(Self::object);
        }
    }

    /// Remove the value at a dot-separated path, returning it.
    pub fn remove_path(&mut self, path: &str) -> Option<Value> {
        let (parent, key) = match path.rsplit_once('.') {
            Some((parent, key)) => (self.get_path_mut(parent)?, key),
            None => (self, path),
        };
        parent.as_object_mut()?.remove(key)
    }

    /// Render as a plain string the way string coercion expects:
    /// null becomes empty, composites become JSON.
    pub fn to_plain_string(&self) -> String {
        match self {
            Self::Null => String::new(),
            Self::Bool(b) => b.to_string(),
            Self::Int(i) => i.to_string(),
            Self::Float(f) => f.to_string(),
            Self::String(s) => s.clone(),
            Self::Array(_) | Self::Object(_) => serde_json::to_string(self).unwrap_or_default(),
        }
    }

    /// Convert into a `serde_json::Value`. Non-finite floats become null.
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::Value::from(self.clone())
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_plain_string())
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Self::Int(i64::from(value))
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<u32> for Value {
    fn from(value: u32) -> Self {
        Self::Int(i64::from(value))
    }
}

impl From<u64> for Value {
    fn from(value: u64) -> Self {
        Self::Int(i64::try_from(value).unwrap_or(i64::MAX))
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<Vec<Value>> for Value {
    fn from(value: Vec<Value>) -> Self {
        Self::Array(value)
    }
}

impl From<BTreeMap<String, Value>> for Value {
    fn from(value: BTreeMap<String, Value>) -> Self {
        Self::Object(value)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}

impl From<serde_json::Value> for Value {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => Self::Null,
            serde_json::Value::Bool(b) => Self::Bool(b),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => Self::Int(i),
                None => Self::Float(n.as_f64().unwrap_or(f64::NAN)),
            },
            serde_json::Value::String(s) => Self::String(s),
            serde_json::Value::Array(arr) => Self::Array(arr.into_iter().map(Into::into).collect()),
            serde_json::Value::Object(obj) => {
                Self::Object(obj.into_iter().map(|(k, v)| (k, v.into())).collect())
            }
        }
    }
}

impl From<Value> for serde_json::Value {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => serde_json::Value::Null,
            Value::Bool(b) => serde_json::Value::Bool(b),
            Value::Int(i) => serde_json::Value::from(i),
            Value::Float(f) => serde_json::Number::from_f64(f)
                .map_or(serde_json::Value::Null, serde_json::Value::Number),
            Value::String(s) => serde_json::Value::String(s),
            Value::Array(arr) => {
                serde_json::Value::Array(arr.into_iter().map(Into::into).collect())
            }
            Value::Object(obj) => {
                serde_json::Value::Object(obj.into_iter().map(|(k, v)| (k, v.into())).collect())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Value {
        let json = serde_json::json!({
            "id": "acc_1",
            "owner": { "name": "Ada", "tags": ["a", "b"] },
            "balance": 12.5
        });
        Value::from(json)
    }

    #[test]
    fn test_accessors() {
        assert_eq!(Value::Bool(true).as_bool(), Some(true));
        assert_eq!(Value::Int(42).as_i64(), Some(42));
        assert_eq!(Value::Int(42).as_f64(), Some(42.0));
        assert_eq!(Value::from("x").as_str(), Some("x"));
        assert_eq!(Value::Bool(true).as_i64(), None);
        assert!(Value::Null.is_null());
    }

    #[test]
    fn test_get_path_nested() {
        let value = sample();
        assert_eq!(value.get_path("owner.name"), Some(&Value::from("Ada")));
        assert_eq!(value.get_path("owner.tags.1"), Some(&Value::from("b")));
        assert_eq!(value.get_path("owner.missing"), None);
        assert_eq!(value.get_path("balance.deeper"), None);
    }

    #[test]
    fn test_set_path_auto_vivifies() {
        let mut value = Value::object();
        value.set_path("a.b.c", Value::Int(1));
        assert_eq!(value.get_path("a.b.c"), Some(&Value::Int(1)));

        // Scalars along the path are replaced by objects
        value.set_path("a.b.c.d", Value::Int(2));
        assert_eq!(value.get_path("a.b.c.d"), Some(&Value::Int(2)));
    }

    #[test]
    fn test_set_path_on_scalar_root() {
        let mut value = Value::Int(5);
        value.set_path("x", Value::Bool(true));
        assert_eq!(value.get("x"), Some(&Value::Bool(true)));
    }

    #[test]
    fn test_remove_path() {
        let mut value = sample();
        assert_eq!(value.remove_path("owner.name"), Some(Value::from("Ada")));
        assert_eq!(value.get_path("owner.name"), None);
        assert_eq!(value.remove_path("id"), Some(Value::from("acc_1")));
        assert_eq!(value.remove_path("nope.nothing"), None);
    }

    #[test]
    fn test_plain_string() {
        assert_eq!(Value::Null.to_plain_string(), "");
        assert_eq!(Value::Float(3.0).to_plain_string(), "3");
        assert_eq!(Value::Float(f64::NAN).to_plain_string(), "NaN");
        assert_eq!(
            Value::Array(vec![Value::Int(1), Value::from("a")]).to_plain_string(),
            r#"[1,"a"]"#
        );
    }

    #[test]
    fn test_json_conversion_nan_becomes_null() {
        let json = Value::Float(f64::NAN).to_json();
        assert!(json.is_null());
    }

    #[test]
    fn test_untagged_deserialize_from_yaml() {
        let value: Value = serde_yaml::from_str("{ amount: 10, label: fee, rate: 0.5, on: true }")
            .unwrap();
        assert_eq!(value.get("amount"), Some(&Value::Int(10)));
        assert_eq!(value.get("label"), Some(&Value::from("fee")));
        assert_eq!(value.get("rate"), Some(&Value::Float(0.5)));
        assert_eq!(value.get("on"), Some(&Value::Bool(true)));
    }
}
