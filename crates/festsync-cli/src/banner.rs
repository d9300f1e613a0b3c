use festsync_migrate::{PlanOutcome, TableOutcome, TableVerification};

const WIDTH: usize = 72;

/// Print the end-of-run summary box followed by any failed rows.
pub fn print_summary(
    destination: &str,
    outcome: &PlanOutcome,
    checks: &[TableVerification],
    unmigrated: &[(String, usize)],
) {
    println!();
    for line in render_summary(destination, outcome, checks, unmigrated) {
        println!("{line}");
    }

    let failures: Vec<_> = outcome
        .reports()
        .flat_map(|r| r.failures.iter().map(move |f| (&r.label, f)))
        .collect();
    if !failures.is_empty() {
        println!();
        println!("Failed rows (fix and re-run; attendance and scan logs will duplicate):");
        for (label, failure) in failures {
            println!("  {label} {}: {}", failure.key_display(), failure.message);
        }
    }
    for (label, error) in outcome.tables.iter().filter_map(|t| match t {
        TableOutcome::SourceUnavailable { label, error } => Some((label, error)),
        TableOutcome::Completed(_) => None,
    }) {
        println!("  {label}: source table unreadable: {error}");
    }
}

fn render_summary(
    destination: &str,
    outcome: &PlanOutcome,
    checks: &[TableVerification],
    unmigrated: &[(String, usize)],
) -> Vec<String> {
    let version = env!("CARGO_PKG_VERSION");
    let inner = WIDTH - 3; // "│ " + "│"

    let title = format!("festsync v{version}");
    let title_dashes = WIDTH - 2 - title.chars().count() - 5; // 2 for ╭╮, 5 for "─── " + " "
    let top = format!("╭─── {title} {}╮", "─".repeat(title_dashes));
    let bottom = format!("╰{}╯", "─".repeat(WIDTH - 2));
    let row = |text: &str| {
        let text: String = text.chars().take(inner).collect();
        format!("│ {text:<inner$}│")
    };
    let columns = |table: &str, migrated: &str, failed: &str, present: &str, status: &str| {
        format!("{table:<18}{migrated:>10}{failed:>8}{present:>10}  {status}")
    };

    let mut lines = vec![top, row(""), row(&format!("Destination  {destination}")), row("")];
    lines.push(row(&columns("Table", "Migrated", "Failed", "Present", "Status")));
    lines.push(row(&"─".repeat(inner - 1)));

    for table in &outcome.tables {
        let line = match table {
            TableOutcome::Completed(report) => {
                let check = checks.iter().find(|c| c.table == report.destination_table);
                let present = check
                    .and_then(|c| c.present)
                    .map_or_else(|| "-".to_string(), |n| n.to_string());
                let status = match check {
                    Some(c) if c.present.is_none() => "count failed",
                    Some(c) if c.is_mismatch() => "MISMATCH",
                    _ if report.attempted == 0 => "empty",
                    _ if !report.is_clean() => "partial",
                    _ => "ok",
                };
                columns(
                    &report.label,
                    &format!("{}/{}", report.succeeded, report.attempted),
                    &report.failed().to_string(),
                    &present,
                    status,
                )
            }
            TableOutcome::SourceUnavailable { label, .. } => {
                columns(label, "-", "-", "-", "UNREADABLE")
            }
        };
        lines.push(row(&line));
    }

    lines.push(row(""));
    lines.push(row(&format!(
        "Total        {}/{} rows migrated, {} failed",
        outcome.total_succeeded(),
        outcome.total_attempted(),
        outcome.total_failed()
    )));
    for (table, rows) in unmigrated {
        lines.push(row(&format!("Not migrated {table} ({rows} rows, no migration defined)")));
    }
    lines.push(row(""));
    lines.push(bottom);
    lines
}

#[cfg(test)]
mod tests {
    use festsync_migrate::{MigrationReport, TableSpec};

    use super::*;

    fn sample_outcome() -> PlanOutcome {
        let mut users = MigrationReport::new(&TableSpec::upsert("users", "email").label("Users"));
        users.record_success(Some("a@x.io"));
        users.record_success(Some("b@x.io"));
        PlanOutcome {
            tables: vec![
                TableOutcome::Completed(users),
                TableOutcome::SourceUnavailable {
                    label: "Fests".into(),
                    error: "no such table: fests".into(),
                },
            ],
        }
    }

    fn users_check(present: u64) -> TableVerification {
        TableVerification {
            label: "Users".into(),
            table: "users".into(),
            attempted: 2,
            expected_minimum: 2,
            present: Some(present),
            error: None,
        }
    }

    #[test]
    fn every_line_has_the_same_width() {
        let lines = render_summary(
            "https://demo.supabase.co",
            &sample_outcome(),
            &[users_check(2)],
            &[("notifications".into(), 4)],
        );
        for line in &lines {
            assert_eq!(line.chars().count(), WIDTH, "{line}");
        }
    }

    #[test]
    fn shows_statuses_and_unmigrated_tables() {
        let lines = render_summary(
            "memory",
            &sample_outcome(),
            &[users_check(2)],
            &[("notifications".into(), 4)],
        )
        .join("\n");

        assert!(lines.contains("2/2"));
        assert!(lines.contains("UNREADABLE"));
        assert!(lines.contains("notifications (4 rows"));
        assert!(lines.contains(" ok"));
    }

    #[test]
    fn long_destination_is_clipped_to_the_box() {
        let url = format!("https://{}.supabase.co", "x".repeat(120));
        let lines = render_summary(&url, &sample_outcome(), &[], &[]);
        assert!(lines.iter().all(|l| l.chars().count() == WIDTH));
    }

    #[test]
    fn short_destination_is_flagged() {
        let lines = render_summary("memory", &sample_outcome(), &[users_check(1)], &[]).join("\n");
        assert!(lines.contains("MISMATCH"));
    }
}
