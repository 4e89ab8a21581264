//! API error type and [`axum::response::IntoResponse`] implementation.

use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error("not found: {0}")]
  NotFound(String),

  #[error("bad request: {0}")]
  BadRequest(String),

  #[error("conflict: {0}")]
  Conflict(String),

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),

  #[error("report error: {0}")]
  Report(String),
}

impl ApiError {
  /// Map a sync-engine outcome onto the API surface.
  pub fn from_sync<E>(err: orgreg_sync::Error<E>) -> Self
  where
    E: std::error::Error + Send + Sync + 'static,
  {
    use orgreg_sync::Error;
    match err {
      Error::NotFound => Self::NotFound("person record does not exist".to_string()),
      Error::AlreadyExists(email) => {
        Self::Conflict(format!("person record already exists: {email}"))
      }
      Error::MissingField(field) => {
        Self::BadRequest(format!("payload missing required field: {field}"))
      }
      Error::MissingColumn(column) => {
        Self::BadRequest(format!("sheet missing column: {column}"))
      }
      Error::Store(e) => Self::Store(Box::new(e)),
      Error::Core(e) => Self::Store(Box::new(e)),
      Error::Serialization(e) => Self::Store(Box::new(e)),
    }
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let (status, message) = match &self {
      ApiError::NotFound(m) => (StatusCode::NOT_FOUND, m.clone()),
      ApiError::BadRequest(m) => (StatusCode::BAD_REQUEST, m.clone()),
      ApiError::Conflict(m) => (StatusCode::CONFLICT, m.clone()),
      ApiError::Store(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
      ApiError::Report(m) => (StatusCode::INTERNAL_SERVER_ERROR, m.clone()),
    };
    if status.is_server_error() {
      tracing::error!("api error: {message}");
    }
    (status, Json(json!({ "error": message }))).into_response()
  }
}
