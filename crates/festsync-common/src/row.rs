use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::ser::{Serialize, SerializeMap, Serializer};

/// A single value as SQLite stores it.
#[derive(Debug, Clone, PartialEq)]
pub enum SourceValue {
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
    Blob(Vec<u8>),
}

impl SourceValue {
    pub fn is_null(&self) -> bool {
        matches!(self, SourceValue::Null)
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            SourceValue::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Plain JSON rendering with no column-specific decoding. Blobs become
    /// base64 strings; non-finite reals become `null`.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            SourceValue::Null => serde_json::Value::Null,
            SourceValue::Integer(n) => serde_json::Value::from(*n),
            SourceValue::Real(f) => serde_json::Number::from_f64(*f)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            SourceValue::Text(s) => serde_json::Value::String(s.clone()),
            SourceValue::Blob(b) => serde_json::Value::String(STANDARD.encode(b)),
        }
    }
}

impl Serialize for SourceValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}

/// One row read from a source table, columns kept in `SELECT *` order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SourceRow {
    columns: Vec<(String, SourceValue)>,
}

impl SourceRow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, column: impl Into<String>, value: SourceValue) {
        self.columns.push((column.into(), value));
    }

    /// Builder form of [`SourceRow::push`], handy when seeding rows by hand.
    pub fn with(mut self, column: impl Into<String>, value: SourceValue) -> Self {
        self.push(column, value);
        self
    }

    pub fn get(&self, column: &str) -> Option<&SourceValue> {
        self.columns
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, value)| value)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &SourceValue)> {
        self.columns.iter().map(|(name, value)| (name.as_str(), value))
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

impl Serialize for SourceRow {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.columns.len()))?;
        for (name, value) in &self.columns {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}
