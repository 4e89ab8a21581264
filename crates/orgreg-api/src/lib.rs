//! JSON REST API and CSV export surface for the orgreg registry.
//!
//! Exposes an axum [`Router`] backed by any [`orgreg_core::store::PersonStore`].
//! Auth, TLS, and transport concerns are the caller's responsibility.

pub mod error;
pub mod options;
pub mod registers;
pub mod reports;
pub mod users;

use std::{path::PathBuf, sync::Arc};

use axum::{
  Router,
  routing::get,
};
use orgreg_core::store::PersonStore;
use orgreg_sync::AuditSink;
use orgreg_tabular::ReportSchema;
use serde::Deserialize;

pub use error::ApiError;

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml` and the
/// `ORGREG_*` environment.
#[derive(Deserialize, Clone)]
pub struct ServerConfig {
  #[serde(default = "default_host")]
  pub host:               String,
  #[serde(default = "default_port")]
  pub port:               u16,
  #[serde(default = "default_store_path")]
  pub store_path:         PathBuf,
  /// Header column holding the employee number in HR extracts.
  #[serde(default = "default_employee_column")]
  pub hr_employee_column: String,
  /// Declared attribute-bag keys for the flat staff report.
  #[serde(default)]
  pub report_schema:      ReportSchema,
}

fn default_host() -> String { "127.0.0.1".to_string() }
fn default_port() -> u16 { 8080 }
fn default_store_path() -> PathBuf { PathBuf::from("orgreg.db") }
fn default_employee_column() -> String { "EMPLOYEE_NO".to_string() }

impl Default for ServerConfig {
  fn default() -> Self {
    Self {
      host:               default_host(),
      port:               default_port(),
      store_path:         default_store_path(),
      hr_employee_column: default_employee_column(),
      report_schema:      ReportSchema::default(),
    }
  }
}

// ─── Application state ────────────────────────────────────────────────────────

/// Shared state threaded through all axum handlers.
#[derive(Clone)]
pub struct AppState<S: PersonStore> {
  pub store:  Arc<S>,
  pub audit:  Arc<dyn AuditSink>,
  pub config: Arc<ServerConfig>,
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build an axum [`Router`] for the registry API.
pub fn router<S>(state: AppState<S>) -> Router
where
  S: PersonStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  Router::new()
    .route(
      "/api/users",
      get(users::list::<S>)
        .put(users::put_directory::<S>)
        .post(users::post_directory::<S>),
    )
    .route("/api/users/{id}", get(users::get_one::<S>))
    .route("/api/users.csv", get(reports::users_csv::<S>))
    .route("/api/itsystems", get(registers::it_systems::<S>))
    .route("/api/itsystems.csv", get(reports::it_systems_csv::<S>))
    .route("/api/locations", get(registers::locations::<S>))
    .route("/api/locations.csv", get(reports::locations_csv::<S>))
    .route("/api/options", get(options::handler::<S>))
    .with_state(state)
}

// ─── Integration tests ────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use super::*;

  use axum::{
    body::Body,
    http::{Request, StatusCode, header},
  };
  use orgreg_core::org::{CostCentre, ItSystem, SystemStatus};
  use orgreg_store_sqlite::SqliteStore;
  use orgreg_sync::TracingAudit;
  use serde_json::{Value, json};
  use tower::ServiceExt as _;
  use uuid::Uuid;

  async fn make_state() -> AppState<SqliteStore> {
    AppState {
      store:  Arc::new(SqliteStore::open_in_memory().await.unwrap()),
      audit:  Arc::new(TracingAudit),
      config: Arc::new(ServerConfig::default()),
    }
  }

  async fn oneshot(
    state: AppState<SqliteStore>,
    method: &str,
    uri: &str,
    body: Option<Value>,
  ) -> (StatusCode, Value, axum::http::HeaderMap) {
    let mut builder = Request::builder().method(method).uri(uri);
    let request = match body {
      Some(value) => {
        builder = builder.header(header::CONTENT_TYPE, "application/json");
        builder.body(Body::from(value.to_string())).unwrap()
      }
      None => builder.body(Body::empty()).unwrap(),
    };

    let response = router(state).oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
      .await
      .unwrap();
    let value = serde_json::from_slice(&bytes)
      .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).to_string()));
    (status, value, headers)
  }

  fn directory_payload(guid: &str, email: &str) -> Value {
    json!({
      "ObjectGUID": guid,
      "EmailAddress": email,
      "DistinguishedName": format!("CN={guid},OU=Staff,DC=example,DC=org"),
      "SamAccountName": email.split('@').next().unwrap(),
      "Name": "Jo Bloggs",
      "GivenName": "Jo",
      "Surname": "Bloggs",
      "Title": "Ranger",
      "Enabled": true,
      "Modified": "2016-05-09T13:13:00Z",
    })
  }

  // ── Users ───────────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn list_users_empty_store() {
    let state = make_state().await;
    let (status, body, _) = oneshot(state, "GET", "/api/users", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([]));
  }

  #[tokio::test]
  async fn post_creates_and_get_returns_person() {
    let state = make_state().await;
    let (status, body, _) = oneshot(
      state.clone(),
      "POST",
      "/api/users",
      Some(directory_payload("g-1", "jo@example.org")),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["action"], "created");

    let id = body["person"]["id"].as_str().unwrap().to_string();
    let (status, body, _) =
      oneshot(state, "GET", &format!("/api/users/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["email"], "jo@example.org");
  }

  #[tokio::test]
  async fn post_duplicate_identity_conflicts() {
    let state = make_state().await;
    let payload = directory_payload("g-1", "jo@example.org");
    oneshot(state.clone(), "POST", "/api/users", Some(payload.clone())).await;

    let (status, body, _) =
      oneshot(state, "POST", "/api/users", Some(payload)).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(body["error"].as_str().unwrap().contains("already exists"));
  }

  #[tokio::test]
  async fn put_unknown_identity_is_404() {
    let state = make_state().await;
    let (status, body, _) = oneshot(
      state,
      "PUT",
      "/api/users",
      Some(directory_payload("g-9", "ghost@example.org")),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"].as_str().is_some());
  }

  #[tokio::test]
  async fn put_deletion_soft_deletes_the_record() {
    let state = make_state().await;
    oneshot(
      state.clone(),
      "POST",
      "/api/users",
      Some(directory_payload("g-1", "jo@example.org")),
    )
    .await;

    let mut deletion = directory_payload("g-1", "jo@example.org");
    deletion["Deleted"] = json!(true);
    let (status, body, _) =
      oneshot(state.clone(), "PUT", "/api/users", Some(deletion)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["action"], "deleted");
    assert_eq!(body["person"]["active"], false);
    assert_eq!(body["person"]["directory_deleted"], true);

    // The default listing no longer includes the record...
    let (_, body, _) = oneshot(state.clone(), "GET", "/api/users", None).await;
    assert_eq!(body, json!([]));
    // ...but the deleted filter does.
    let (_, body, _) =
      oneshot(state, "GET", "/api/users?deleted=true", None).await;
    assert_eq!(body.as_array().unwrap().len(), 1);
  }

  #[tokio::test]
  async fn get_unknown_person_is_404() {
    let state = make_state().await;
    let id = Uuid::new_v4();
    let (status, _, _) =
      oneshot(state, "GET", &format!("/api/users/{id}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
  }

  // ── CSV reports ─────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn users_csv_is_a_csv_attachment() {
    let state = make_state().await;
    oneshot(
      state.clone(),
      "POST",
      "/api/users",
      Some(directory_payload("g-1", "jo@example.org")),
    )
    .await;

    let (status, body, headers) =
      oneshot(state, "GET", "/api/users.csv", None).await;
    assert_eq!(status, StatusCode::OK);
    let content_type = headers
      .get(header::CONTENT_TYPE)
      .unwrap()
      .to_str()
      .unwrap();
    assert!(content_type.contains("text/csv"), "Content-Type: {content_type}");

    let text = body.as_str().unwrap();
    assert!(text.starts_with("email,username,"), "header row: {text}");
    assert!(text.contains("jo@example.org"));
  }

  // ── Registers and options ───────────────────────────────────────────────────

  #[tokio::test]
  async fn it_systems_filter_and_bad_status() {
    let state = make_state().await;
    state
      .store
      .add_it_system(ItSystem {
        id:              Uuid::new_v4(),
        system_id:       "S001".to_string(),
        name:            "Payroll".to_string(),
        acronym:         None,
        status:          SystemStatus::Production,
        owner_email:     None,
        custodian_email: None,
        description:     None,
      })
      .await
      .unwrap();

    let (status, body, _) =
      oneshot(state.clone(), "GET", "/api/itsystems?status=0", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 1);

    let (status, _, _) =
      oneshot(state, "GET", "/api/itsystems?status=42", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
  }

  #[tokio::test]
  async fn cost_centre_options_are_formatted() {
    let state = make_state().await;
    state
      .store
      .add_cost_centre(CostCentre {
        id:            Uuid::new_v4(),
        code:          "042".to_string(),
        name:          "Wetlands".to_string(),
        manager_email: None,
      })
      .await
      .unwrap();

    let (status, body, _) =
      oneshot(state, "GET", "/api/options?list=cost_centre", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!(["CC042 / Wetlands"]));
  }

  #[tokio::test]
  async fn unknown_option_list_is_400() {
    let state = make_state().await;
    let (status, _, _) =
      oneshot(state, "GET", "/api/options?list=bogus", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
  }
}
