//! # Values
//!
//! Column values bound into statements and returned in row sets.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A single column value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SqlValue {
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
    Blob(Vec<u8>),
}

impl SqlValue {
    /// Check whether this is SQL NULL
    pub fn is_null(&self) -> bool {
        matches!(self, SqlValue::Null)
    }

    /// Integer view, if this is an integer
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            SqlValue::Integer(n) => Some(*n),
            _ => None,
        }
    }

    /// Text view, if this is text
    pub fn as_str(&self) -> Option<&str> {
        match self {
            SqlValue::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Convert a JSON value into a column value.
    ///
    /// Objects and nested arrays have no column representation. Arrays of
    /// bytes are accepted as blobs.
    pub fn from_json(value: &Value) -> Option<Self> {
        match value {
            Value::Null => Some(SqlValue::Null),
            Value::Bool(b) => Some(SqlValue::Integer(i64::from(*b))),
            Value::Number(n) => n
                .as_i64()
                .map(SqlValue::Integer)
                .or_else(|| n.as_f64().map(SqlValue::Real)),
            Value::String(s) => Some(SqlValue::Text(s.clone())),
            Value::Array(items) => items
                .iter()
                .map(|v| v.as_u64().and_then(|b| u8::try_from(b).ok()))
                .collect::<Option<Vec<u8>>>()
                .map(SqlValue::Blob),
            Value::Object(_) => None,
        }
    }

    /// Convert into a JSON value for responses
    pub fn to_json(&self) -> Value {
        match self {
            SqlValue::Null => Value::Null,
            SqlValue::Integer(n) => Value::from(*n),
            SqlValue::Real(f) => serde_json::Number::from_f64(*f)
                .map(Value::Number)
                .unwrap_or(Value::Null),
            SqlValue::Text(s) => Value::String(s.clone()),
            SqlValue::Blob(b) => Value::Array(b.iter().map(|x| Value::from(*x)).collect()),
        }
    }
}

impl fmt::Display for SqlValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SqlValue::Null => write!(f, "NULL"),
            SqlValue::Integer(n) => write!(f, "{}", n),
            SqlValue::Real(x) => write!(f, "{}", x),
            SqlValue::Text(s) => write!(f, "{}", s),
            SqlValue::Blob(b) => write!(f, "<{} bytes>", b.len()),
        }
    }
}

impl From<i64> for SqlValue {
    fn from(n: i64) -> Self {
        SqlValue::Integer(n)
    }
}

impl From<f64> for SqlValue {
    fn from(x: f64) -> Self {
        SqlValue::Real(x)
    }
}

impl From<bool> for SqlValue {
    fn from(b: bool) -> Self {
        SqlValue::Integer(i64::from(b))
    }
}

impl From<&str> for SqlValue {
    fn from(s: &str) -> Self {
        SqlValue::Text(s.to_string())
    }
}

impl From<String> for SqlValue {
    fn from(s: String) -> Self {
        SqlValue::Text(s)
    }
}

impl From<Vec<u8>> for SqlValue {
    fn from(b: Vec<u8>) -> Self {
        SqlValue::Blob(b)
    }
}

impl<T: Into<SqlValue>> From<Option<T>> for SqlValue {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(SqlValue::Null)
    }
}

/// Column values for an insert or update, keyed by column name
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContentValues(BTreeMap<String, SqlValue>);

impl ContentValues {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a column value, replacing any previous one
    pub fn put(&mut self, column: impl Into<String>, value: impl Into<SqlValue>) {
        self.0.insert(column.into(), value.into());
    }

    /// Builder form of [`ContentValues::put`]
    pub fn with(mut self, column: impl Into<String>, value: impl Into<SqlValue>) -> Self {
        self.put(column, value);
        self
    }

    pub fn get(&self, column: &str) -> Option<&SqlValue> {
        self.0.get(column)
    }

    pub fn contains_key(&self, column: &str) -> bool {
        self.0.contains_key(column)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &SqlValue)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Build from a JSON object; `None` if any member has no column form
    pub fn from_json(value: &Value) -> Option<Self> {
        let obj = value.as_object()?;
        let mut values = ContentValues::new();
        for (key, v) in obj {
            values.put(key.clone(), SqlValue::from_json(v)?);
        }
        Some(values)
    }
}

impl FromIterator<(String, SqlValue)> for ContentValues {
    fn from_iter<I: IntoIterator<Item = (String, SqlValue)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_untagged_deserialization() {
        let values: Vec<SqlValue> = serde_json::from_value(json!([null, 7, 1.5, "a"])).unwrap();
        assert_eq!(
            values,
            vec![
                SqlValue::Null,
                SqlValue::Integer(7),
                SqlValue::Real(1.5),
                SqlValue::Text("a".to_string()),
            ]
        );
    }

    #[test]
    fn test_from_json() {
        assert_eq!(SqlValue::from_json(&json!(true)), Some(SqlValue::Integer(1)));
        assert_eq!(
            SqlValue::from_json(&json!([1, 2])),
            Some(SqlValue::Blob(vec![1, 2]))
        );
        assert_eq!(SqlValue::from_json(&json!([1, "x"])), None);
        assert_eq!(SqlValue::from_json(&json!({"a": 1})), None);
    }

    #[test]
    fn test_content_values_from_json() {
        let values = ContentValues::from_json(&json!({"title": "a", "rank": 3})).unwrap();
        assert_eq!(values.len(), 2);
        assert_eq!(values.get("title"), Some(&SqlValue::Text("a".to_string())));
        assert_eq!(values.get("rank"), Some(&SqlValue::Integer(3)));

        assert!(ContentValues::from_json(&json!("not an object")).is_none());
        assert!(ContentValues::from_json(&json!({"nested": {"x": 1}})).is_none());
    }

    #[test]
    fn test_option_conversion() {
        let none: Option<&str> = None;
        assert_eq!(SqlValue::from(none), SqlValue::Null);
        assert_eq!(SqlValue::from(Some(3i64)), SqlValue::Integer(3));
    }
}
