pub mod inspector;
pub mod source_store;

pub use inspector::{DEFAULT_SAMPLE_ROWS, TableSummary, inspect_source};
pub use source_store::SourceStore;
