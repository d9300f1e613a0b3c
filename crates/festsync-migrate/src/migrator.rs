use chrono::Utc;
use festsync_common::{Result, SourceRow, SourceValue};

use crate::destination::Destination;
use crate::mapping::{RowMapper, SchemaMapper};
use crate::report::{FailureStage, MigrationObserver, MigrationReport, RowFailure, TracingObserver};
use crate::source::SourceReader;
use crate::table::{TableSpec, WriteMode};

/// Copies one source table into the destination, row by row.
///
/// Rows are mapped and written strictly in source order, one request at a
/// time. A failing row is recorded in the report and never stops the rest
/// of the table; only a failure to read the source table aborts the run.
pub struct TableMigrator<'a> {
    spec: &'a TableSpec,
    destination: &'a dyn Destination,
    mapper: &'a dyn RowMapper,
    observer: &'a dyn MigrationObserver,
}

impl<'a> TableMigrator<'a> {
    pub fn new(spec: &'a TableSpec, destination: &'a dyn Destination) -> Self {
        Self {
            spec,
            destination,
            mapper: &SchemaMapper,
            observer: &TracingObserver,
        }
    }

    pub fn with_mapper(mut self, mapper: &'a dyn RowMapper) -> Self {
        self.mapper = mapper;
        self
    }

    pub fn with_observer(mut self, observer: &'a dyn MigrationObserver) -> Self {
        self.observer = observer;
        self
    }

    pub async fn run<S>(&self, source: &S) -> Result<MigrationReport>
    where
        S: SourceReader + ?Sized,
    {
        let rows = source.read_table(&self.spec.source_table)?;
        let mut report = MigrationReport::new(self.spec);

        if rows.is_empty() {
            self.observer.nothing_to_migrate(self.spec);
            report.finished_at = Utc::now();
            return Ok(report);
        }

        self.observer.table_started(self.spec, rows.len());
        for (row_index, row) in rows.iter().enumerate() {
            match self.migrate_row(row_index, row).await {
                Ok(key) => {
                    self.observer
                        .row_succeeded(self.spec, row_index, key.as_deref());
                    report.record_success(key.as_deref());
                }
                Err(failure) => {
                    self.observer.row_failed(self.spec, &failure);
                    report.record_failure(failure);
                }
            }
        }

        report.finished_at = Utc::now();
        self.observer.table_finished(&report);
        Ok(report)
    }

    async fn migrate_row(
        &self,
        row_index: usize,
        row: &SourceRow,
    ) -> std::result::Result<Option<String>, RowFailure> {
        let failure = |key: Option<String>, stage: FailureStage, message: String| RowFailure {
            row_index,
            key,
            stage,
            message,
        };

        let record = self.mapper.map_row(self.spec, row).map_err(|e| {
            failure(
                source_key(row, &self.spec.key_column),
                FailureStage::Map,
                e.to_string(),
            )
        })?;

        let key_field = self.spec.destination_key();
        let key = record.key_value(key_field);

        let written = match self.spec.write_mode {
            WriteMode::Upsert => {
                if key.is_none() {
                    return Err(failure(
                        None,
                        FailureStage::Map,
                        format!("natural key `{key_field}` is missing or empty"),
                    ));
                }
                self.destination
                    .upsert(&self.spec.destination_table, key_field, &record)
                    .await
            }
            WriteMode::AppendOnly => {
                self.destination
                    .insert(&self.spec.destination_table, &record)
                    .await
            }
        };

        match written {
            Ok(()) => Ok(key),
            Err(e) => Err(failure(key, FailureStage::Write, e.to_string())),
        }
    }
}

/// Key value straight from the source row, for rows that failed to map.
fn source_key(row: &SourceRow, column: &str) -> Option<String> {
    match row.get(column)? {
        SourceValue::Text(s) if !s.trim().is_empty() => Some(s.clone()),
        SourceValue::Integer(n) => Some(n.to_string()),
        _ => None,
    }
}
