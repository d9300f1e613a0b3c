use anyhow::{Context, Result};
use festsync_db::TableSummary;

/// Print each table's row count and its sample rows as pretty JSON.
pub fn print_inspection(summaries: &[TableSummary]) -> Result<()> {
    if summaries.is_empty() {
        println!("Source database has no tables.");
        return Ok(());
    }
    for summary in summaries {
        println!("{}", render_table(summary)?);
    }
    Ok(())
}

fn render_table(summary: &TableSummary) -> Result<String> {
    let plural = if summary.row_count == 1 { "" } else { "s" };
    let mut out = format!("== {} ({} row{plural})\n", summary.name, summary.row_count);
    for sample in &summary.samples {
        let json = serde_json::to_string_pretty(sample)
            .with_context(|| format!("failed to render sample row from {}", summary.name))?;
        out.push_str(&json);
        out.push('\n');
    }
    Ok(out)
}
