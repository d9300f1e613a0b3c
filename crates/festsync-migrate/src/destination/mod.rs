pub mod memory;
pub mod supabase;

use async_trait::async_trait;
use festsync_common::Result;

use crate::mapping::DestinationRecord;

pub use memory::MemoryDestination;
pub use supabase::SupabaseDestination;

/// A hosted table store the migrator writes into.
#[async_trait]
pub trait Destination: Send + Sync {
    /// Short name for logs.
    fn name(&self) -> &str;

    /// Insert `record`, or overwrite the existing row whose
    /// `conflict_column` holds the same value.
    async fn upsert(
        &self,
        table: &str,
        conflict_column: &str,
        record: &DestinationRecord,
    ) -> Result<()>;

    /// Insert `record` with no deduplication.
    async fn insert(&self, table: &str, record: &DestinationRecord) -> Result<()>;

    /// Number of rows currently in `table`.
    async fn count(&self, table: &str) -> Result<u64>;
}
