//! Error types for `orgreg-tabular`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("csv error: {0}")]
  Csv(#[from] csv::Error),

  #[error("io error: {0}")]
  Io(#[from] std::io::Error),

  #[error("sheet has no header row")]
  EmptySheet,

  #[error("csv write error: {0}")]
  Write(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
