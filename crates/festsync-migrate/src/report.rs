use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::table::{TableSpec, WriteMode};

/// Where a row failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureStage {
    Map,
    Write,
}

#[derive(Debug, Clone, Serialize)]
pub struct RowFailure {
    /// Zero-based position of the row in the source table.
    pub row_index: usize,
    pub key: Option<String>,
    pub stage: FailureStage,
    pub message: String,
}

impl RowFailure {
    pub fn key_display(&self) -> &str {
        self.key.as_deref().unwrap_or("<no key>")
    }
}

/// Outcome of migrating one table.
#[derive(Debug, Clone, Serialize)]
pub struct MigrationReport {
    pub label: String,
    pub source_table: String,
    pub destination_table: String,
    pub write_mode: WriteMode,
    pub attempted: usize,
    pub succeeded: usize,
    pub failures: Vec<RowFailure>,
    /// Distinct key values of successfully written rows.
    pub written_keys: BTreeSet<String>,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl MigrationReport {
    pub fn new(spec: &TableSpec) -> Self {
        let now = Utc::now();
        Self {
            label: spec.label.clone(),
            source_table: spec.source_table.clone(),
            destination_table: spec.destination_table.clone(),
            write_mode: spec.write_mode,
            attempted: 0,
            succeeded: 0,
            failures: Vec::new(),
            written_keys: BTreeSet::new(),
            started_at: now,
            finished_at: now,
        }
    }

    pub fn record_success(&mut self, key: Option<&str>) {
        self.attempted += 1;
        self.succeeded += 1;
        if let Some(key) = key {
            self.written_keys.insert(key.to_string());
        }
    }

    pub fn record_failure(&mut self, failure: RowFailure) {
        self.attempted += 1;
        self.failures.push(failure);
    }

    pub fn failed(&self) -> usize {
        self.failures.len()
    }

    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }

    /// Lower bound on the destination row count this run guarantees.
    pub fn expected_minimum(&self) -> u64 {
        match self.write_mode {
            WriteMode::Upsert => self.written_keys.len() as u64,
            WriteMode::AppendOnly => self.succeeded as u64,
        }
    }
}

/// Receives progress events from a table migration. All methods default
/// to no-ops.
pub trait MigrationObserver: Send + Sync {
    fn table_started(&self, _spec: &TableSpec, _rows: usize) {}

    fn nothing_to_migrate(&self, _spec: &TableSpec) {}

    fn row_succeeded(&self, _spec: &TableSpec, _row_index: usize, _key: Option<&str>) {}

    fn row_failed(&self, _spec: &TableSpec, _failure: &RowFailure) {}

    fn table_finished(&self, _report: &MigrationReport) {}
}

/// Reports progress through `tracing`: one event per row, one summary per
/// table.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver;

impl MigrationObserver for TracingObserver {
    fn table_started(&self, spec: &TableSpec, rows: usize) {
        info!(
            "migrating {} ({} -> {}): {rows} rows",
            spec.label, spec.source_table, spec.destination_table
        );
    }

    fn nothing_to_migrate(&self, spec: &TableSpec) {
        info!("{}: nothing to migrate", spec.label);
    }

    fn row_succeeded(&self, spec: &TableSpec, row_index: usize, key: Option<&str>) {
        debug!(
            "{}: row {row_index} ({}) migrated",
            spec.label,
            key.unwrap_or("<no key>")
        );
    }

    fn row_failed(&self, spec: &TableSpec, failure: &RowFailure) {
        warn!(
            "{}: row {} ({}) failed: {}",
            spec.label,
            failure.row_index,
            failure.key_display(),
            failure.message
        );
    }

    fn table_finished(&self, report: &MigrationReport) {
        info!(
            "{}: {}/{} rows migrated, {} failed",
            report.label,
            report.succeeded,
            report.attempted,
            report.failed()
        );
    }
}
