use serde::Serialize;
use tracing::{info, warn};

use crate::destination::Destination;
use crate::plan::PlanOutcome;

/// Destination row count for one migrated table.
#[derive(Debug, Clone, Serialize)]
pub struct TableVerification {
    pub label: String,
    pub table: String,
    pub attempted: usize,
    pub expected_minimum: u64,
    /// `None` when the count request itself failed.
    pub present: Option<u64>,
    pub error: Option<String>,
}

impl TableVerification {
    pub fn is_mismatch(&self) -> bool {
        match self.present {
            Some(present) => present < self.expected_minimum,
            None => true,
        }
    }
}

/// Count every migrated destination table and compare it with what the run
/// wrote. Mismatches are logged, never retried.
pub async fn verify(destination: &dyn Destination, outcome: &PlanOutcome) -> Vec<TableVerification> {
    let mut results = Vec::new();
    for report in outcome.reports() {
        let counted = destination.count(&report.destination_table).await;
        let (present, error) = match counted {
            Ok(n) => (Some(n), None),
            Err(e) => (None, Some(e.to_string())),
        };

        let verification = TableVerification {
            label: report.label.clone(),
            table: report.destination_table.clone(),
            attempted: report.attempted,
            expected_minimum: report.expected_minimum(),
            present,
            error,
        };

        match (&verification.present, &verification.error) {
            (Some(present), _) if verification.is_mismatch() => warn!(
                "{}: destination has {present} rows, expected at least {}",
                verification.table, verification.expected_minimum
            ),
            (Some(present), _) => info!("{}: {present} rows present", verification.table),
            (None, Some(e)) => warn!("{}: row count failed: {e}", verification.table),
            (None, None) => {}
        }
        results.push(verification);
    }
    results
}
