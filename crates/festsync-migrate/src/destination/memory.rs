use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use festsync_common::{Error, Result};

use super::Destination;
use crate::mapping::DestinationRecord;

/// In-process destination used for dry runs. Mirrors upsert semantics of
/// the hosted backend: a matching conflict value replaces the whole row.
#[derive(Default)]
pub struct MemoryDestination {
    tables: Mutex<HashMap<String, Vec<DestinationRecord>>>,
}

impl MemoryDestination {
    pub fn new() -> Self {
        Self::default()
    }

    fn tables(&self) -> Result<MutexGuard<'_, HashMap<String, Vec<DestinationRecord>>>> {
        self.tables
            .lock()
            .map_err(|_| Error::Destination("memory destination lock poisoned".into()))
    }

    /// Snapshot of the rows stored in `table`.
    pub fn rows(&self, table: &str) -> Result<Vec<DestinationRecord>> {
        Ok(self.tables()?.get(table).cloned().unwrap_or_default())
    }
}

#[async_trait]
impl Destination for MemoryDestination {
    fn name(&self) -> &str {
        "memory"
    }

    async fn upsert(
        &self,
        table: &str,
        conflict_column: &str,
        record: &DestinationRecord,
    ) -> Result<()> {
        let key = record.key_value(conflict_column).ok_or_else(|| {
            Error::Destination(format!(
                "record has no value for conflict column `{conflict_column}`"
            ))
        })?;

        let mut tables = self.tables()?;
        let rows = tables.entry(table.to_string()).or_default();
        match rows
            .iter_mut()
            .find(|row| row.key_value(conflict_column).as_deref() == Some(key.as_str()))
        {
            Some(existing) => *existing = record.clone(),
            None => rows.push(record.clone()),
        }
        Ok(())
    }

    async fn insert(&self, table: &str, record: &DestinationRecord) -> Result<()> {
        self.tables()?
            .entry(table.to_string())
            .or_default()
            .push(record.clone());
        Ok(())
    }

    async fn count(&self, table: &str) -> Result<u64> {
        Ok(self.tables()?.get(table).map_or(0, |rows| rows.len() as u64))
    }
}
