//! HR spreadsheet reconciliation.
//!
//! Merges a tabular HR extract into existing person records by employee
//! number. Never creates records; ambiguous and unmatched rows are counted
//! and skipped so one bad row cannot block the rest of the sheet.

use orgreg_core::store::PersonStore;
use orgreg_tabular::Sheet;
use serde::Serialize;
use serde_json::Value;

use crate::{Error, Result};

/// Aggregate counters for one reconciliation run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ReconcileSummary {
  /// Data rows consumed (the header row is not counted).
  pub rows:          usize,
  pub updates:       usize,
  pub unmatched:     usize,
  pub multi_matched: usize,
}

/// Reconcile `sheet` against the store.
///
/// `employee_column` names the header column holding the employee number.
/// Each matched row replaces that record's HR attribute bag wholesale with
/// the row's field mapping and persists it in one call.
pub async fn reconcile_sheet<S: PersonStore>(
  store: &S,
  sheet: &Sheet,
  employee_column: &str,
) -> Result<ReconcileSummary, S::Error> {
  let Some(column) = sheet.column(employee_column) else {
    return Err(Error::MissingColumn(employee_column.to_string()));
  };

  let mut summary = ReconcileSummary::default();

  for row in &sheet.rows {
    summary.rows += 1;

    let employee_no = row.get(column).map(String::as_str).unwrap_or("");
    if employee_no.is_empty() {
      summary.unmatched += 1;
      continue;
    }

    let mut matches = store
      .find_by_employee_id(employee_no)
      .await
      .map_err(Error::Store)?;

    if matches.len() > 1 {
      summary.multi_matched += 1;
    } else if let Some(mut person) = matches.pop() {
      person.hr_data = Some(Value::Object(sheet.row_record(row)));
      store.update_person(&person).await.map_err(Error::Store)?;
      tracing::info!("HR data updated for {}", person.email.to_lowercase());
      summary.updates += 1;
    } else {
      summary.unmatched += 1;
    }
  }

  if summary.updates > 0 {
    tracing::info!(
      "HR data for {} person records was updated",
      summary.updates
    );
  }
  if summary.unmatched > 0 {
    tracing::warn!(
      "employee number was not matched for {} rows",
      summary.unmatched
    );
  }
  if summary.multi_matched > 0 {
    tracing::error!(
      "employee number matched more than one person record for {} rows",
      summary.multi_matched
    );
  }

  Ok(summary)
}

// ─── Tests ───────────────────────────────────────────────────────────────────
