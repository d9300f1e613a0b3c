use std::path::Path;

use anyhow::{Context, Result};
use festsync_migrate::{PlanOutcome, TableVerification};
use serde::Serialize;

/// Machine-readable record of one `festsync migrate` run.
#[derive(Debug, Serialize)]
pub struct RunReport<'a> {
    pub destination: &'a str,
    pub outcome: &'a PlanOutcome,
    pub verification: &'a [TableVerification],
    pub unmigrated: Vec<UnmigratedTable<'a>>,
}

#[derive(Debug, Serialize)]
pub struct UnmigratedTable<'a> {
    pub table: &'a str,
    pub rows: usize,
}

impl<'a> RunReport<'a> {
    pub fn new(
        destination: &'a str,
        outcome: &'a PlanOutcome,
        verification: &'a [TableVerification],
        unmigrated: &'a [(String, usize)],
    ) -> Self {
        Self {
            destination,
            outcome,
            verification,
            unmigrated: unmigrated
                .iter()
                .map(|(table, rows)| UnmigratedTable { table, rows: *rows })
                .collect(),
        }
    }

    pub fn write(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self).context("failed to serialize run report")?;
        std::fs::write(path, json)
            .with_context(|| format!("failed to write report to {}", path.display()))
    }
}
