pub mod error;
pub mod row;

pub use error::{Error, Result};
pub use row::{SourceRow, SourceValue};
