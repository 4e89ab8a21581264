//! Handlers for the organisational and IT-system register listings.

use axum::{
  Json,
  extract::{Query, State},
};
use orgreg_core::{
  org::{ItSystem, Location, SystemStatus},
  store::PersonStore,
};
use serde::Deserialize;

use crate::{AppState, error::ApiError};

// ─── IT systems ───────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize, Default)]
pub struct ItSystemParams {
  /// Numeric status code filter.
  pub status: Option<i64>,
}

/// `GET /api/itsystems[?status=<code>]`
pub async fn it_systems<S>(
  State(state): State<AppState<S>>,
  Query(params): Query<ItSystemParams>,
) -> Result<Json<Vec<ItSystem>>, ApiError>
where
  S: PersonStore + Clone + Send + Sync + 'static,
{
  let status = params
    .status
    .map(SystemStatus::from_code)
    .transpose()
    .map_err(|e| ApiError::BadRequest(e.to_string()))?;

  let systems = state
    .store
    .list_it_systems(status)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;
  Ok(Json(systems))
}

// ─── Locations ────────────────────────────────────────────────────────────────

/// `GET /api/locations`
pub async fn locations<S>(
  State(state): State<AppState<S>>,
) -> Result<Json<Vec<Location>>, ApiError>
where
  S: PersonStore + Clone + Send + Sync + 'static,
{
  let locations = state
    .store
    .list_locations()
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;
  Ok(Json(locations))
}
