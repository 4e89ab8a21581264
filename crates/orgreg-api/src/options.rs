//! `GET /api/options?list=<name>` — serialised option lists for admin forms.
//!
//! Mirrors the form-facing lists the registry serves: org units, cost
//! centres, locations, active staff emails and registered IT systems.

use axum::{
  Json,
  extract::{Query, State},
};
use orgreg_core::store::{PersonQuery, PersonStore};
use serde::Deserialize;
use serde_json::{Value, json};

use crate::{AppState, error::ApiError};

#[derive(Debug, Deserialize)]
pub struct OptionParams {
  pub list: String,
}

pub async fn handler<S>(
  State(state): State<AppState<S>>,
  Query(params): Query<OptionParams>,
) -> Result<Json<Value>, ApiError>
where
  S: PersonStore + Clone + Send + Sync + 'static,
{
  let store = state.store.as_ref();
  let into_store_err = |e: S::Error| ApiError::Store(Box::new(e));

  let options: Value = match params.list.as_str() {
    "org_unit" => {
      let units = store.list_org_units().await.map_err(into_store_err)?;
      units
        .iter()
        .map(|u| json!({ "id": u.id, "name": u.name }))
        .collect()
    }
    "cost_centre" => {
      let centres = store.list_cost_centres().await.map_err(into_store_err)?;
      centres
        .iter()
        .map(|c| Value::String(format!("CC{} / {}", c.code, c.name)))
        .collect()
    }
    "location" => {
      let locations = store.list_locations().await.map_err(into_store_err)?;
      locations
        .iter()
        .map(|l| Value::String(l.name.clone()))
        .collect()
    }
    "dept_user" => {
      let people = store
        .list_people(&PersonQuery::default())
        .await
        .map_err(into_store_err)?;
      people
        .iter()
        .map(|p| Value::String(p.email.clone()))
        .collect()
    }
    "it_system" => {
      let systems = store.list_it_systems(None).await.map_err(into_store_err)?;
      systems
        .iter()
        .map(|s| Value::String(format!("{} {}", s.system_id, s.name)))
        .collect()
    }
    other => {
      return Err(ApiError::BadRequest(format!("unknown option list: {other}")));
    }
  };

  Ok(Json(options))
}
