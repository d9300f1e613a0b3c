use serde::Serialize;

/// How mapped records are written to the destination table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WriteMode {
    /// Insert-or-update on the spec's key column. Safe to re-run.
    Upsert,
    /// Plain insert. Re-running duplicates rows.
    AppendOnly,
}

/// Describes one source table and how its rows reach the destination.
#[derive(Debug, Clone)]
pub struct TableSpec {
    pub label: String,
    pub source_table: String,
    pub destination_table: String,
    /// Natural key for upsert tables; for append-only tables only used to
    /// identify rows in logs and failure reports.
    pub key_column: String,
    pub write_mode: WriteMode,
    pub json_columns: Vec<String>,
    pub bool_columns: Vec<String>,
    /// `(source column, destination field)` pairs; unlisted columns keep
    /// their name.
    pub renames: Vec<(String, String)>,
}

impl TableSpec {
    pub fn upsert(table: &str, natural_key: &str) -> Self {
        Self::new(table, natural_key, WriteMode::Upsert)
    }

    pub fn append_only(table: &str, log_key: &str) -> Self {
        Self::new(table, log_key, WriteMode::AppendOnly)
    }

    fn new(table: &str, key_column: &str, write_mode: WriteMode) -> Self {
        Self {
            label: table.to_string(),
            source_table: table.to_string(),
            destination_table: table.to_string(),
            key_column: key_column.to_string(),
            write_mode,
            json_columns: Vec::new(),
            bool_columns: Vec::new(),
            renames: Vec::new(),
        }
    }

    pub fn label(mut self, label: &str) -> Self {
        self.label = label.to_string();
        self
    }

    pub fn into_table(mut self, destination_table: &str) -> Self {
        self.destination_table = destination_table.to_string();
        self
    }

    pub fn json_columns<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.json_columns.extend(columns.into_iter().map(Into::into));
        self
    }

    pub fn bool_columns<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.bool_columns.extend(columns.into_iter().map(Into::into));
        self
    }

    pub fn rename(mut self, source_column: &str, destination_field: &str) -> Self {
        self.renames
            .push((source_column.to_string(), destination_field.to_string()));
        self
    }

    pub fn is_json(&self, column: &str) -> bool {
        self.json_columns.iter().any(|c| c == column)
    }

    pub fn is_bool(&self, column: &str) -> bool {
        self.bool_columns.iter().any(|c| c == column)
    }

    /// Destination field name for a source column.
    pub fn field_name<'a>(&'a self, column: &'a str) -> &'a str {
        self.renames
            .iter()
            .find(|(from, _)| from == column)
            .map(|(_, to)| to.as_str())
            .unwrap_or(column)
    }

    /// The key column as it is named in the destination.
    pub fn destination_key(&self) -> &str {
        self.field_name(&self.key_column)
    }
}
