use festsync_common::{Error, Result, SourceRow, SourceValue};
use serde::Serialize;
use serde_json::{Map, Value};

use crate::table::TableSpec;

/// A row reshaped for the destination, serialized as a flat JSON object.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct DestinationRecord {
    fields: Map<String, Value>,
}

impl DestinationRecord {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, field: impl Into<String>, value: Value) {
        self.fields.insert(field.into(), value);
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }

    /// The value of `field` as a key string. `None` for missing, null or
    /// empty values and for structured values.
    pub fn key_value(&self, field: &str) -> Option<String> {
        match self.fields.get(field)? {
            Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            _ => None,
        }
    }
}

impl From<Map<String, Value>> for DestinationRecord {
    fn from(fields: Map<String, Value>) -> Self {
        Self { fields }
    }
}

/// Field mapping from a source row to a destination record.
pub trait RowMapper: Send + Sync {
    fn map_row(&self, spec: &TableSpec, row: &SourceRow) -> Result<DestinationRecord>;
}

/// Mapping driven entirely by the [`TableSpec`]: JSON columns are decoded,
/// boolean columns coerced, everything else carried over as-is.
#[derive(Debug, Clone, Copy, Default)]
pub struct SchemaMapper;

impl RowMapper for SchemaMapper {
    fn map_row(&self, spec: &TableSpec, row: &SourceRow) -> Result<DestinationRecord> {
        let mut record = DestinationRecord::new();
        for (column, value) in row.iter() {
            let mapped = if spec.is_json(column) {
                decode_json(column, value)?
            } else if spec.is_bool(column) {
                coerce_bool(value)
            } else {
                value.to_json()
            };
            record.insert(spec.field_name(column), mapped);
        }
        Ok(record)
    }
}

/// Decode a JSON-encoded text column. Null and blank text map to `null`
/// without attempting a parse.
pub fn decode_json(column: &str, value: &SourceValue) -> Result<Value> {
    match value {
        SourceValue::Null => Ok(Value::Null),
        SourceValue::Text(text) if text.trim().is_empty() => Ok(Value::Null),
        SourceValue::Text(text) => serde_json::from_str(text)
            .map_err(|e| Error::Mapping(format!("column `{column}` is not valid JSON: {e}"))),
        // Already a scalar; nothing to decode.
        other => Ok(other.to_json()),
    }
}

/// Coerce a 0/1 integer flag by equality to 1. Other integers are not
/// range-checked and map to `false`.
pub fn coerce_bool(value: &SourceValue) -> Value {
    match value {
        SourceValue::Null => Value::Null,
        SourceValue::Integer(n) => Value::Bool(*n == 1),
        SourceValue::Real(f) => Value::Bool(*f == 1.0),
        SourceValue::Text(s) => Value::Bool(s.trim() == "1"),
        SourceValue::Blob(_) => Value::Bool(false),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn users_spec() -> TableSpec {
        TableSpec::upsert("users", "email")
            .json_columns(["interests"])
            .bool_columns(["is_verified"])
    }

    #[test]
    fn decodes_json_text_into_structured_value() {
        let value = decode_json("meta", &SourceValue::Text(r#"{"a":1}"#.into())).unwrap();
        assert_eq!(value, json!({"a": 1}));
    }

    #[test]
    fn null_and_empty_json_columns_map_to_null() {
        assert_eq!(decode_json("meta", &SourceValue::Null).unwrap(), Value::Null);
        assert_eq!(
            decode_json("meta", &SourceValue::Text(String::new())).unwrap(),
            Value::Null
        );
        assert_eq!(
            decode_json("meta", &SourceValue::Text("  ".into())).unwrap(),
            Value::Null
        );
    }

    #[test]
    fn invalid_json_is_a_mapping_error() {
        let err = decode_json("tags", &SourceValue::Text("[oops".into())).unwrap_err();
        assert!(matches!(err, Error::Mapping(_)));
        assert!(err.to_string().contains("`tags`"));
    }

    #[test]
    fn booleans_coerce_by_equality_to_one() {
        assert_eq!(coerce_bool(&SourceValue::Integer(1)), Value::Bool(true));
        assert_eq!(coerce_bool(&SourceValue::Integer(0)), Value::Bool(false));
        assert_eq!(coerce_bool(&SourceValue::Integer(2)), Value::Bool(false));
        assert_eq!(coerce_bool(&SourceValue::Integer(-1)), Value::Bool(false));
        assert_eq!(coerce_bool(&SourceValue::Null), Value::Null);
        assert_eq!(coerce_bool(&SourceValue::Text("1".into())), Value::Bool(true));
    }

    #[test]
    fn schema_mapper_maps_every_column() {
        let row = SourceRow::new()
            .with("email", SourceValue::Text("ada@example.com".into()))
            .with("name", SourceValue::Text("Ada".into()))
            .with("year", SourceValue::Integer(3))
            .with("interests", SourceValue::Text(r#"["music","robotics"]"#.into()))
            .with("is_verified", SourceValue::Integer(1))
            .with("phone", SourceValue::Null);

        let record = SchemaMapper.map_row(&users_spec(), &row).unwrap();
        assert_eq!(
            serde_json::to_value(&record).unwrap(),
            json!({
                "email": "ada@example.com",
                "name": "Ada",
                "year": 3,
                "interests": ["music", "robotics"],
                "is_verified": true,
                "phone": null
            })
        );
        assert_eq!(record.fields().len(), row.len());
    }

    #[test]
    fn schema_mapper_applies_renames() {
        let spec = users_spec().rename("mail", "email");
        let row = SourceRow::new().with("mail", SourceValue::Text("a@x.io".into()));
        let record = SchemaMapper.map_row(&spec, &row).unwrap();
        assert_eq!(record.key_value("email").as_deref(), Some("a@x.io"));
        assert!(record.get("mail").is_none());
    }

    #[test]
    fn key_value_rejects_blank_and_structured_values() {
        let mut record = DestinationRecord::new();
        record.insert("blank", json!("  "));
        record.insert("null", Value::Null);
        record.insert("object", json!({"a": 1}));
        record.insert("number", json!(42));

        assert!(record.key_value("blank").is_none());
        assert!(record.key_value("null").is_none());
        assert!(record.key_value("object").is_none());
        assert!(record.key_value("missing").is_none());
        assert_eq!(record.key_value("number").as_deref(), Some("42"));
    }
}
