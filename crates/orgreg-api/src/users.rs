//! Handlers for `/api/users` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/api/users` | `?all=true`, `?deleted=true\|false`, or one of `?email=` / `?guid=` / `?cost_centre=` |
//! | `GET`  | `/api/users/:id` | 404 if not found |
//! | `PUT`  | `/api/users` | directory update/delete payload; 404 if nothing resolves |
//! | `POST` | `/api/users` | directory create payload; 409 if resolution succeeds |

use axum::{
  Json,
  extract::{Path, Query, State},
  http::StatusCode,
  response::IntoResponse,
};
use orgreg_core::{
  person::{DirectoryRecord, Person},
  store::{PersonQuery, PersonStore},
};
use orgreg_sync::UpsertReport;
use serde::Deserialize;
use uuid::Uuid;

use crate::{AppState, error::ApiError};

// ─── List ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize, Default)]
pub struct ListParams {
  pub all:         Option<bool>,
  pub deleted:     Option<bool>,
  pub email:       Option<String>,
  pub guid:        Option<String>,
  pub cost_centre: Option<String>,
}

impl ListParams {
  fn into_query(self) -> PersonQuery {
    PersonQuery {
      include_inactive:  self.all.unwrap_or(false),
      directory_deleted: self.deleted,
      email:             self.email,
      guid_suffix:       self.guid,
      cost_centre:       self.cost_centre,
    }
  }
}

/// `GET /api/users` — active records by default.
pub async fn list<S>(
  State(state): State<AppState<S>>,
  Query(params): Query<ListParams>,
) -> Result<Json<Vec<Person>>, ApiError>
where
  S: PersonStore + Clone + Send + Sync + 'static,
{
  let people = state
    .store
    .list_people(&params.into_query())
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;
  Ok(Json(people))
}

// ─── Get one ──────────────────────────────────────────────────────────────────

/// `GET /api/users/:id`
pub async fn get_one<S>(
  State(state): State<AppState<S>>,
  Path(id): Path<Uuid>,
) -> Result<Json<Person>, ApiError>
where
  S: PersonStore + Clone + Send + Sync + 'static,
{
  let person = state
    .store
    .get_person(id)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?
    .ok_or_else(|| ApiError::NotFound(format!("person {id} not found")))?;
  Ok(Json(person))
}

// ─── Directory upsert endpoints ───────────────────────────────────────────────

/// `PUT /api/users` — apply a directory change to an existing record.
pub async fn put_directory<S>(
  State(state): State<AppState<S>>,
  Json(record): Json<DirectoryRecord>,
) -> Result<Json<UpsertReport>, ApiError>
where
  S: PersonStore + Clone + Send + Sync + 'static,
{
  let report =
    orgreg_sync::update_existing(state.store.as_ref(), state.audit.as_ref(), &record)
      .await
      .map_err(ApiError::from_sync)?;
  Ok(Json(report))
}

/// `POST /api/users` — create a record from a directory payload.
pub async fn post_directory<S>(
  State(state): State<AppState<S>>,
  Json(record): Json<DirectoryRecord>,
) -> Result<impl IntoResponse, ApiError>
where
  S: PersonStore + Clone + Send + Sync + 'static,
{
  let report =
    orgreg_sync::create_new(state.store.as_ref(), state.audit.as_ref(), &record)
      .await
      .map_err(ApiError::from_sync)?;
  Ok((StatusCode::CREATED, Json(report)))
}
