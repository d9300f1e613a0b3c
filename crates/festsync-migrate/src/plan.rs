use festsync_common::Result;
use serde::Serialize;
use tracing::{error, info};

use crate::destination::Destination;
use crate::migrator::TableMigrator;
use crate::report::{MigrationObserver, MigrationReport};
use crate::source::SourceReader;
use crate::table::TableSpec;

/// Result of one step of a plan.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum TableOutcome {
    Completed(MigrationReport),
    /// The source table could not be read at all.
    SourceUnavailable { label: String, error: String },
}

impl TableOutcome {
    pub fn label(&self) -> &str {
        match self {
            TableOutcome::Completed(report) => &report.label,
            TableOutcome::SourceUnavailable { label, .. } => label,
        }
    }

    pub fn report(&self) -> Option<&MigrationReport> {
        match self {
            TableOutcome::Completed(report) => Some(report),
            TableOutcome::SourceUnavailable { .. } => None,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct PlanOutcome {
    pub tables: Vec<TableOutcome>,
}

impl PlanOutcome {
    pub fn reports(&self) -> impl Iterator<Item = &MigrationReport> {
        self.tables.iter().filter_map(TableOutcome::report)
    }

    /// True when any table could not be read from the source.
    pub fn has_fatal(&self) -> bool {
        self.tables
            .iter()
            .any(|t| matches!(t, TableOutcome::SourceUnavailable { .. }))
    }

    pub fn total_attempted(&self) -> usize {
        self.reports().map(|r| r.attempted).sum()
    }

    pub fn total_succeeded(&self) -> usize {
        self.reports().map(|r| r.succeeded).sum()
    }

    pub fn total_failed(&self) -> usize {
        self.reports().map(|r| r.failed()).sum()
    }
}

/// An ordered list of table migrations run one after another.
#[derive(Debug, Clone)]
pub struct MigrationPlan {
    specs: Vec<TableSpec>,
}

impl MigrationPlan {
    pub fn new(specs: Vec<TableSpec>) -> Self {
        Self { specs }
    }

    /// The six fest-management tables, referenced tables first.
    pub fn standard() -> Self {
        Self::new(vec![
            TableSpec::upsert("users", "email")
                .label("Users")
                .json_columns(["interests"])
                .bool_columns(["is_verified"]),
            TableSpec::upsert("events", "event_id")
                .label("Events")
                .json_columns(["tags", "schedule"])
                .bool_columns(["is_team_event", "is_published"]),
            TableSpec::upsert("fests", "fest_id")
                .label("Fests")
                .json_columns(["sponsors", "contacts"])
                .bool_columns(["is_active"]),
            TableSpec::upsert("registrations", "registration_id")
                .label("Registrations")
                .json_columns(["team_members", "custom_answers"])
                .bool_columns(["is_checked_in"]),
            TableSpec::append_only("attendance_status", "registration_id")
                .label("Attendance")
                .bool_columns(["is_present"]),
            TableSpec::append_only("qr_scan_logs", "registration_id")
                .label("QR scan logs")
                .json_columns(["scan_metadata"])
                .bool_columns(["is_valid"]),
        ])
    }

    pub fn specs(&self) -> &[TableSpec] {
        &self.specs
    }

    /// Run every table in order. A table whose source cannot be read is
    /// recorded and the remaining tables still run.
    pub async fn run<S>(
        &self,
        source: &S,
        destination: &dyn Destination,
        observer: &dyn MigrationObserver,
    ) -> PlanOutcome
    where
        S: SourceReader + ?Sized,
    {
        info!(
            "running {} table migrations against {}",
            self.specs.len(),
            destination.name()
        );

        let mut outcome = PlanOutcome::default();
        for spec in &self.specs {
            let result = TableMigrator::new(spec, destination)
                .with_observer(observer)
                .run(source)
                .await;
            match result {
                Ok(report) => outcome.tables.push(TableOutcome::Completed(report)),
                Err(e) => {
                    error!("{}: cannot read source table {}: {e}", spec.label, spec.source_table);
                    outcome.tables.push(TableOutcome::SourceUnavailable {
                        label: spec.label.clone(),
                        error: e.to_string(),
                    });
                }
            }
        }
        outcome
    }

    /// Source tables no spec in this plan reads, with their row counts.
    pub fn unmigrated_tables<S>(&self, source: &S) -> Result<Vec<(String, usize)>>
    where
        S: SourceReader + ?Sized,
    {
        let mut skipped = Vec::new();
        for table in source.table_names()? {
            if self.specs.iter().any(|s| s.source_table == table) {
                continue;
            }
            let rows = source.count_rows(&table)?;
            skipped.push((table, rows));
        }
        Ok(skipped)
    }
}
