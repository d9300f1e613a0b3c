use std::io::IsTerminal;
use std::path::Path;

use anyhow::{Context, Result};
use dialoguer::Confirm;

/// Ask the operator before any row is written. Returns `false` when the
/// operator declines or stdin is not a terminal.
pub fn confirm_migration(source: &Path, destination: &str, schema_path: &Path) -> Result<bool> {
    if !std::io::stdin().is_terminal() {
        println!("Non-interactive environment detected.");
        println!("Re-run with --yes to migrate without the confirmation prompt.");
        return Ok(false);
    }

    println!();
    println!("  Source:       {}", source.display());
    println!("  Destination:  {destination}");
    println!("  Schema file:  {}", schema_path.display());
    println!();
    println!("  The schema file must already be applied to the destination.");
    println!("  Re-running duplicates attendance and scan-log rows.");
    println!();

    Confirm::new()
        .with_prompt("Start the migration?")
        .default(false)
        .interact()
        .context("confirmation prompt cancelled")
}
