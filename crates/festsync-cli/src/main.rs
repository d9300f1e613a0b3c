mod banner;
mod inspect;
mod progress;
mod prompt;
mod report;

use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use festsync_config::{AppConfig, ConfigLoader, DestinationTarget};
use festsync_db::{DEFAULT_SAMPLE_ROWS, SourceStore, inspect_source};
use festsync_migrate::{
    Destination, MemoryDestination, MigrationPlan, SupabaseDestination, verify,
    write_schema_script,
};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::progress::ConsoleObserver;
use crate::report::RunReport;

#[derive(Parser)]
#[command(
    name = "festsync",
    version,
    about = "Copy the fest management SQLite database into Supabase"
)]
struct Cli {
    /// Config file (YAML or TOML). Defaults to ./festsync.{yml,yaml,toml} if present.
    #[arg(long, global = true, env = "FESTSYNC_CONFIG")]
    config: Option<PathBuf>,

    /// Source SQLite database; overrides config and FESTSYNC_SOURCE_DB.
    #[arg(long, global = true)]
    source: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Write the schema script, confirm, then migrate all tables
    Migrate {
        /// Skip the confirmation prompt
        #[arg(long, short)]
        yes: bool,

        /// Map every row but write into memory instead of Supabase
        #[arg(long)]
        dry_run: bool,

        /// Where to write the destination schema script
        #[arg(long)]
        schema_out: Option<PathBuf>,

        /// Also write the run summary as JSON to this path
        #[arg(long)]
        report: Option<PathBuf>,
    },
    /// Only write the destination schema script
    Schema {
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Print row counts and sample rows for every source table
    Inspect {
        #[arg(long, default_value_t = DEFAULT_SAMPLE_ROWS)]
        samples: usize,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let cli = Cli::parse();
    let mut config = ConfigLoader::new(cli.config)
        .load()
        .context("failed to load configuration")?;
    if let Some(source) = cli.source {
        config.source.path = source;
    }

    match cli.command {
        Command::Migrate {
            yes,
            dry_run,
            schema_out,
            report,
        } => {
            let options = MigrateOptions {
                yes,
                dry_run,
                schema_out,
                report,
            };
            run_migrate(&config, options).await
        }
        Command::Schema { out } => {
            let path = out.unwrap_or_else(|| config.schema_output());
            write_schema_script(&path)
                .with_context(|| format!("failed to write {}", path.display()))?;
            println!("Schema written to {}", path.display());
            println!("Apply it in the Supabase SQL editor before running `festsync migrate`.");
            Ok(())
        }
        Command::Inspect { samples } => {
            let store = SourceStore::open(&config.source.path)
                .context("cannot open source database")?;
            let summaries = inspect_source(&store, samples)?;
            inspect::print_inspection(&summaries)
        }
    }
}

struct MigrateOptions {
    yes: bool,
    dry_run: bool,
    schema_out: Option<PathBuf>,
    report: Option<PathBuf>,
}

/// Everything that can fail before the operator is asked to confirm.
fn open_inputs(
    config: &AppConfig,
    dry_run: bool,
) -> Result<(Option<DestinationTarget>, SourceStore)> {
    let target = if dry_run {
        None
    } else {
        Some(config.destination().context("destination is not configured")?)
    };
    let store = SourceStore::open(&config.source.path).context("cannot open source database")?;
    Ok((target, store))
}

async fn run_migrate(config: &AppConfig, options: MigrateOptions) -> Result<()> {
    let (target, store) = open_inputs(config, options.dry_run)?;
    let destination_label = target
        .as_ref()
        .map_or_else(|| "memory (dry run)".to_string(), |t| t.url.to_string());

    let schema_path = options.schema_out.unwrap_or_else(|| config.schema_output());
    write_schema_script(&schema_path)
        .with_context(|| format!("failed to write {}", schema_path.display()))?;
    println!("Destination schema written to {}", schema_path.display());

    if !options.yes
        && !prompt::confirm_migration(&config.source.path, &destination_label, &schema_path)?
    {
        println!("Migration cancelled.");
        return Ok(());
    }

    let destination: Box<dyn Destination> = match &target {
        Some(target) => Box::new(
            SupabaseDestination::new(&target.url, &target.service_key, target.timeout)
                .context("failed to set up Supabase client")?,
        ),
        None => Box::new(MemoryDestination::new()),
    };

    let plan = MigrationPlan::standard();
    let outcome = plan
        .run(&store, destination.as_ref(), &ConsoleObserver)
        .await;

    info!("verifying destination row counts");
    let checks = verify(destination.as_ref(), &outcome).await;

    // Rows are already written; a listing failure only loses the report line.
    let unmigrated = match plan.unmigrated_tables(&store) {
        Ok(unmigrated) => unmigrated,
        Err(e) => {
            warn!("could not list unmigrated source tables: {e}");
            Vec::new()
        }
    };
    for (table, rows) in &unmigrated {
        warn!("{table} has {rows} rows and no migration; left in the source");
    }
    drop(store);

    banner::print_summary(&destination_label, &outcome, &checks, &unmigrated);

    if let Some(path) = &options.report {
        RunReport::new(&destination_label, &outcome, &checks, &unmigrated).write(path)?;
        println!("Run report written to {}", path.display());
    }

    if outcome.has_fatal() {
        bail!("one or more source tables could not be read");
    }
    Ok(())
}
