use festsync_common::{Result, SourceRow};
use festsync_db::SourceStore;

/// Whole-table reads from the legacy store.
pub trait SourceReader {
    fn read_table(&self, table: &str) -> Result<Vec<SourceRow>>;

    fn table_names(&self) -> Result<Vec<String>>;

    fn count_rows(&self, table: &str) -> Result<usize>;
}

impl SourceReader for SourceStore {
    fn read_table(&self, table: &str) -> Result<Vec<SourceRow>> {
        self.read_all(table)
    }

    fn table_names(&self) -> Result<Vec<String>> {
        self.list_tables()
    }

    fn count_rows(&self, table: &str) -> Result<usize> {
        self.row_count(table)
    }
}
