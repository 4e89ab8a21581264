//! Error types for `orgreg-sync`.
//!
//! The enum is generic over the backing store's error type so engines can
//! surface persistence failures without boxing them.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error<E>
where
  E: std::error::Error + Send + Sync + 'static,
{
  /// No person record matches any resolution key of the payload.
  #[error("no person record matches the directory payload")]
  NotFound,

  /// A create was requested but resolution found an existing record.
  #[error("a person record already exists: {0}")]
  AlreadyExists(String),

  #[error("directory payload missing required field: {0}")]
  MissingField(&'static str),

  #[error("sheet header has no {0:?} column")]
  MissingColumn(String),

  #[error("store error: {0}")]
  Store(#[source] E),

  #[error("core error: {0}")]
  Core(#[from] orgreg_core::Error),

  #[error("serialization error: {0}")]
  Serialization(#[from] serde_json::Error),
}

pub type Result<T, E> = std::result::Result<T, Error<E>>;
