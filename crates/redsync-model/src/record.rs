//! Capture-platform records: one subject row keyed by variable name.

use std::borrow::Cow;
use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// A scalar cell of a capture-platform record.
///
/// The platform stores every value as text; numeric variants exist because
/// relational sources hand back typed cells.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Option<ScalarRepr>", into = "String")]
pub enum Value {
    #[default]
    Empty,
    Text(String),
    Integer(i64),
    Float(f64),
}

impl Value {
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Empty => true,
            Self::Text(text) => text.is_empty(),
            Self::Integer(_) | Self::Float(_) => false,
        }
    }

    /// Text form of the value as the platform would store it.
    pub fn as_text(&self) -> Cow<'_, str> {
        match self {
            Self::Empty => Cow::Borrowed(""),
            Self::Text(text) => Cow::Borrowed(text),
            Self::Integer(value) => Cow::Owned(value.to_string()),
            Self::Float(value) => Cow::Owned(value.to_string()),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_text())
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::from(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        if value.is_empty() {
            Self::Empty
        } else {
            Self::Text(value)
        }
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<Value> for String {
    fn from(value: Value) -> Self {
        value.as_text().into_owned()
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ScalarRepr {
    Bool(bool),
    Integer(i64),
    Float(f64),
    Text(String),
}

impl From<Option<ScalarRepr>> for Value {
    fn from(repr: Option<ScalarRepr>) -> Self {
        match repr {
            None => Self::Empty,
            Some(ScalarRepr::Bool(flag)) => Self::Text(if flag { "1" } else { "0" }.to_string()),
            Some(ScalarRepr::Integer(value)) => Self::Integer(value),
            Some(ScalarRepr::Float(value)) => Self::Float(value),
            Some(ScalarRepr::Text(text)) => Self::from(text),
        }
    }
}

/// One record, keyed by variable name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record(BTreeMap<String, Value>);

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, variable: &str) -> Option<&Value> {
        self.0.get(variable)
    }

    /// Value for a variable, treating absent variables as empty.
    pub fn value(&self, variable: &str) -> Cow<'_, str> {
        self.0
            .get(variable)
            .map_or(Cow::Borrowed(""), Value::as_text)
    }

    pub fn insert(&mut self, variable: impl Into<String>, value: impl Into<Value>) {
        self.0.insert(variable.into(), value.into());
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.0.iter().map(|(name, value)| (name.as_str(), value))
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Record {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(name, value)| (name.into(), value.into()))
                .collect(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_variable_reads_as_empty() {
        let record: Record = [("study_id", "7")].into_iter().collect();
        assert_eq!(record.value("study_id"), "7");
        assert_eq!(record.value("age"), "");
    }

    #[test]
    fn deserializes_mixed_scalars() {
        let json = r#"{"study_id": 3, "weight": 71.5, "sex": "1", "notes": "", "flag": true, "x": null}"#;
        let record: Record = serde_json::from_str(json).unwrap();
        assert_eq!(record.get("study_id"), Some(&Value::Integer(3)));
        assert_eq!(record.get("weight"), Some(&Value::Float(71.5)));
        assert_eq!(record.get("sex"), Some(&Value::Text("1".to_string())));
        assert_eq!(record.get("notes"), Some(&Value::Empty));
        assert_eq!(record.value("flag"), "1");
        assert_eq!(record.get("x"), Some(&Value::Empty));
    }

    #[test]
    fn serializes_every_value_as_text() {
        let record: Record = [("a", Value::Integer(5)), ("b", Value::Empty)]
            .into_iter()
            .collect();
        let json = serde_json::to_string(&record).unwrap();
        assert_eq!(json, r#"{"a":"5","b":""}"#);
    }
}
