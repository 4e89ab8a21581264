//! CSV download endpoints.
//!
//! Each endpoint renders a register through `orgreg-tabular` and returns the
//! bytes as an attachment.

use axum::{
  extract::State,
  http::header,
  response::{IntoResponse, Response},
};
use orgreg_core::store::{PersonQuery, PersonStore};
use orgreg_tabular::report;

use crate::{AppState, error::ApiError};

/// `GET /api/users.csv` — the flat staff report.
pub async fn users_csv<S>(
  State(state): State<AppState<S>>,
) -> Result<Response, ApiError>
where
  S: PersonStore + Clone + Send + Sync + 'static,
{
  let people = state
    .store
    .list_people(&PersonQuery::default())
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;

  let body = report::people_csv(&people, &state.config.report_schema)
    .map_err(|e| ApiError::Report(e.to_string()))?;
  Ok(csv_response("users.csv", body))
}

/// `GET /api/itsystems.csv`
pub async fn it_systems_csv<S>(
  State(state): State<AppState<S>>,
) -> Result<Response, ApiError>
where
  S: PersonStore + Clone + Send + Sync + 'static,
{
  let systems = state
    .store
    .list_it_systems(None)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;

  let body = report::it_systems_csv(&systems)
    .map_err(|e| ApiError::Report(e.to_string()))?;
  Ok(csv_response("itsystems.csv", body))
}

/// `GET /api/locations.csv`
pub async fn locations_csv<S>(
  State(state): State<AppState<S>>,
) -> Result<Response, ApiError>
where
  S: PersonStore + Clone + Send + Sync + 'static,
{
  let locations = state
    .store
    .list_locations()
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;

  let body = report::locations_csv(&locations)
    .map_err(|e| ApiError::Report(e.to_string()))?;
  Ok(csv_response("locations.csv", body))
}

fn csv_response(filename: &str, body: String) -> Response {
  (
    [
      (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
      (
        header::CONTENT_DISPOSITION,
        format!("attachment; filename=\"{filename}\""),
      ),
    ],
    body,
  )
    .into_response()
}
