//! Error types for `orgreg-core`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("unknown account type code: {0}")]
  UnknownAccountType(i64),

  #[error("unknown position type code: {0}")]
  UnknownPositionType(i64),

  #[error("unknown org unit type code: {0}")]
  UnknownUnitType(i64),

  #[error("unknown system status code: {0}")]
  UnknownSystemStatus(i64),

  #[error("serialization error: {0}")]
  Serialization(#[from] serde_json::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
