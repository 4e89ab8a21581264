//! Row-oriented spreadsheet parsing.
//!
//! A sheet is a header row naming fields, followed by data rows holding
//! values positionally. Datetime-looking cells are normalised to ISO 8601 at
//! parse time so downstream consumers store a single representation.

use std::{fs::File, io::Read, path::Path};

use chrono::NaiveDateTime;
use serde_json::{Map, Value};

use crate::{Error, Result};

/// Cell formats the HR system is known to emit for timestamps. RFC 3339
/// cells are already ISO 8601 and pass through untouched.
const SHEET_DATETIME_FORMATS: &[&str] =
  &["%Y-%m-%d %H:%M:%S", "%d/%m/%Y %H:%M:%S", "%d/%m/%Y %H:%M"];

// ─── Sheet ───────────────────────────────────────────────────────────────────

/// A parsed tabular extract: one header row plus zero or more data rows.
#[derive(Debug, Clone)]
pub struct Sheet {
  pub header: Vec<String>,
  pub rows:   Vec<Vec<String>>,
}

impl Sheet {
  /// Parse a CSV byte stream. The first record is the header; rows may be
  /// ragged (shorter rows simply lack trailing fields).
  pub fn from_csv(reader: impl Read) -> Result<Self> {
    let mut rdr = csv::ReaderBuilder::new()
      .has_headers(false)
      .flexible(true)
      .from_reader(reader);

    let mut records = rdr.records();
    let header: Vec<String> = match records.next() {
      Some(record) => record?.iter().map(str::to_string).collect(),
      None => return Err(Error::EmptySheet),
    };

    let mut rows = Vec::new();
    for record in records {
      let record = record?;
      rows.push(record.iter().map(normalise_cell).collect());
    }

    Ok(Self { header, rows })
  }

  pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
    Self::from_csv(File::open(path)?)
  }

  /// Position of a named header column, if present.
  pub fn column(&self, name: &str) -> Option<usize> {
    self.header.iter().position(|h| h == name)
  }

  /// Build the field-name → value mapping for one data row, zipping the
  /// header positionally. Short rows omit their missing trailing fields.
  pub fn row_record(&self, row: &[String]) -> Map<String, Value> {
    self
      .header
      .iter()
      .zip(row.iter())
      .map(|(key, cell)| (key.clone(), Value::String(cell.clone())))
      .collect()
  }
}

/// Rewrite datetime-looking cells to ISO 8601; all other cells pass through
/// verbatim.
pub fn normalise_cell(raw: &str) -> String {
  for format in SHEET_DATETIME_FORMATS {
    if let Ok(dt) = NaiveDateTime::parse_from_str(raw, format) {
      return dt.format("%Y-%m-%dT%H:%M:%S").to_string();
    }
  }
  raw.to_string()
}

// ─── Tests ───────────────────────────────────────────────────────────────────
