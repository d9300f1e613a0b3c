//! Schema-driven migration of the fest management SQLite tables into a
//! Supabase project.
//!
//! A [`TableSpec`] describes one table: where it comes from, which text
//! columns hold JSON, which integer columns are 0/1 flags, and whether rows
//! are upserted on a natural key or appended. [`TableMigrator`] runs one
//! spec; [`MigrationPlan`] runs the standard six in order.

pub mod destination;
pub mod mapping;
pub mod migrator;
pub mod plan;
pub mod report;
pub mod schema;
pub mod source;
pub mod table;
pub mod verify;

pub use destination::{Destination, MemoryDestination, SupabaseDestination};
pub use mapping::{DestinationRecord, RowMapper, SchemaMapper, coerce_bool, decode_json};
pub use migrator::TableMigrator;
pub use plan::{MigrationPlan, PlanOutcome, TableOutcome};
pub use report::{FailureStage, MigrationObserver, MigrationReport, RowFailure, TracingObserver};
pub use schema::{DESTINATION_SCHEMA, write_schema_script};
pub use source::SourceReader;
pub use table::{TableSpec, WriteMode};
pub use verify::{TableVerification, verify};
