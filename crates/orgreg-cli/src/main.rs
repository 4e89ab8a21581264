//! `orgreg` — admin tool for the orgreg staff registry.
//!
//! Ad-hoc batch operations against the store: apply a file of directory
//! change records, reconcile an HR extract, or write the flat staff report.
//!
//! # Usage
//!
//! ```
//! orgreg --store orgreg.db sync-file changes.json
//! orgreg --store orgreg.db import-hr extract.csv
//! orgreg --store orgreg.db export-users report.csv
//! ```

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use orgreg_core::{
  person::DirectoryRecord,
  store::{PersonQuery, PersonStore as _},
};
use orgreg_store_sqlite::SqliteStore;
use orgreg_sync::TracingAudit;
use orgreg_tabular::{ReportSchema, Sheet, report};
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

// ─── CLI args ─────────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "orgreg", about = "Admin tool for the orgreg staff registry")]
struct Args {
  /// Path to the SQLite store.
  #[arg(long, env = "ORGREG_STORE", default_value = "orgreg.db")]
  store: PathBuf,

  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
  /// Apply a JSON file of directory change records (an array of payloads).
  SyncFile {
    records: PathBuf,
  },
  /// Reconcile an HR spreadsheet extract (CSV, header row first).
  ImportHr {
    sheet: PathBuf,
    /// Header column holding the employee number.
    #[arg(long, default_value = "EMPLOYEE_NO")]
    employee_column: String,
  },
  /// Write the flat staff report as CSV.
  ExportUsers {
    output: PathBuf,
  },
}

// ─── Entry point ──────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let args = Args::parse();

  let store = SqliteStore::open(&args.store)
    .await
    .with_context(|| format!("failed to open store at {}", args.store.display()))?;

  match args.command {
    Command::SyncFile { records } => sync_file(&store, &records).await,
    Command::ImportHr { sheet, employee_column } => {
      import_hr(&store, &sheet, &employee_column).await
    }
    Command::ExportUsers { output } => export_users(&store, &output).await,
  }
}

// ─── Commands ─────────────────────────────────────────────────────────────────

/// Apply every change record in the file; one bad record does not stop the
/// batch.
async fn sync_file(store: &SqliteStore, path: &Path) -> Result<()> {
  let raw = std::fs::read_to_string(path)
    .with_context(|| format!("reading {}", path.display()))?;
  let records: Vec<DirectoryRecord> =
    serde_json::from_str(&raw).context("parsing directory change records")?;

  let audit = TracingAudit;
  let mut applied = 0usize;
  let mut failed = 0usize;

  for record in &records {
    match orgreg_sync::upsert(store, &audit, record).await {
      Ok(report) => {
        tracing::info!(email = %report.person.email, action = ?report.action, "applied");
        applied += 1;
      }
      Err(e) => {
        tracing::error!(email = %record.email, "failed to apply: {e}");
        failed += 1;
      }
    }
  }

  println!("{applied}/{} records applied, {failed} failed", records.len());
  Ok(())
}

async fn import_hr(
  store: &SqliteStore,
  path: &Path,
  employee_column: &str,
) -> Result<()> {
  let sheet = Sheet::from_path(path)
    .with_context(|| format!("reading {}", path.display()))?;

  let summary = orgreg_sync::reconcile_sheet(store, &sheet, employee_column)
    .await
    .context("reconciling HR extract")?;

  println!(
    "{} rows: {} updated, {} unmatched, {} ambiguous",
    summary.rows, summary.updates, summary.unmatched, summary.multi_matched
  );
  Ok(())
}

async fn export_users(store: &SqliteStore, output: &Path) -> Result<()> {
  let people = store
    .list_people(&PersonQuery::default())
    .await
    .context("listing person records")?;

  let csv_text = report::people_csv(&people, &ReportSchema::default())
    .context("building staff report")?;
  std::fs::write(output, csv_text)
    .with_context(|| format!("writing {}", output.display()))?;

  println!("{} records exported to {}", people.len(), output.display());
  Ok(())
}
