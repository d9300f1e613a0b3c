use festsync_common::{Result, SourceRow};
use serde::Serialize;

use crate::source_store::SourceStore;

pub const DEFAULT_SAMPLE_ROWS: usize = 3;

/// Row count and a handful of sample rows for one source table.
#[derive(Debug, Clone, Serialize)]
pub struct TableSummary {
    pub name: String,
    pub row_count: usize,
    pub samples: Vec<SourceRow>,
}

/// Summarise every table in the source database. Read-only.
pub fn inspect_source(store: &SourceStore, samples: usize) -> Result<Vec<TableSummary>> {
    let mut summaries = Vec::new();
    for name in store.list_tables()? {
        let row_count = store.row_count(&name)?;
        let samples = if row_count == 0 || samples == 0 {
            Vec::new()
        } else {
            store.sample_rows(&name, samples)?
        };
        summaries.push(TableSummary {
            name,
            row_count,
            samples,
        });
    }
    Ok(summaries)
}
