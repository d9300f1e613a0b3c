use festsync_migrate::{MigrationObserver, MigrationReport, RowFailure, TableSpec};

/// Prints per-row progress to stdout for the operator.
#[derive(Debug, Default)]
pub struct ConsoleObserver;

impl MigrationObserver for ConsoleObserver {
    fn table_started(&self, spec: &TableSpec, rows: usize) {
        println!();
        println!("{}", table_header(spec, rows));
    }

    fn nothing_to_migrate(&self, spec: &TableSpec) {
        println!();
        println!("{}: nothing to migrate", spec.label);
    }

    fn row_succeeded(&self, _spec: &TableSpec, _row_index: usize, key: Option<&str>) {
        println!("  ok    {}", key.unwrap_or("<no key>"));
    }

    fn row_failed(&self, _spec: &TableSpec, failure: &RowFailure) {
        println!("{}", failure_line(failure));
    }

    fn table_finished(&self, report: &MigrationReport) {
        println!(
            "  {}/{} rows migrated, {} failed",
            report.succeeded,
            report.attempted,
            report.failed()
        );
    }
}

fn table_header(spec: &TableSpec, rows: usize) -> String {
    let plural = if rows == 1 { "" } else { "s" };
    format!(
        "{} ({} -> {}, {rows} row{plural})",
        spec.label, spec.source_table, spec.destination_table
    )
}

fn failure_line(failure: &RowFailure) -> String {
    format!(
        "  FAIL  {} (row {}): {}",
        failure.key_display(),
        failure.row_index,
        failure.message
    )
}
