//! The `PersonStore` trait and supporting query types.
//!
//! The trait is implemented by storage backends (e.g. `orgreg-store-sqlite`).
//! Higher layers (`orgreg-sync`, `orgreg-api`, `orgreg-cli`) depend on this
//! abstraction, not on any concrete backend.

use std::future::Future;

use uuid::Uuid;

use crate::{
  org::{CostCentre, ItSystem, Location, OrgUnit, SystemStatus},
  person::Person,
};

// ─── Query type ──────────────────────────────────────────────────────────────

/// Parameters for [`PersonStore::list_people`].
///
/// `include_inactive` disables the default active-only filter entirely.
/// Otherwise, when `directory_deleted` is set the listing filters on that
/// flag alone; when it is not, the active-only filter applies together with
/// at most one of the exclusive key filters.
#[derive(Debug, Clone, Default)]
pub struct PersonQuery {
  /// Return every record, including inactive and directory-deleted ones.
  pub include_inactive:  bool,
  /// Filter on the directory-deleted flag (ignores the active filter).
  pub directory_deleted: Option<bool>,
  /// Exact, case-insensitive email filter.
  pub email:             Option<String>,
  /// Directory-identifier suffix filter.
  pub guid_suffix:       Option<String>,
  /// Cost-centre code filter.
  pub cost_centre:       Option<String>,
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Abstraction over an orgreg storage backend.
///
/// Keyed lookups that can legally match more than one row (GUID suffix,
/// employee id, and email/DN on a drifted store) resolve "first" as the
/// oldest row: ordered by creation timestamp, then id. Each write method is
/// one transaction-scoped statement; there is no cross-call coordination.
///
/// All methods return `Send` futures so the trait can be used in
/// multi-threaded async runtimes (e.g. tokio with `axum`).
pub trait PersonStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── People — writes ───────────────────────────────────────────────────

  /// Persist a new person record. `created_at`/`updated_at` are set by the
  /// store; the returned record carries them.
  fn create_person(
    &self,
    person: Person,
  ) -> impl Future<Output = Result<Person, Self::Error>> + Send + '_;

  /// Persist every field of an existing record in a single statement.
  /// `updated_at` is set by the store; the returned record carries it.
  fn update_person<'a>(
    &'a self,
    person: &'a Person,
  ) -> impl Future<Output = Result<Person, Self::Error>> + Send + 'a;

  // ── People — keyed lookups ────────────────────────────────────────────

  fn get_person(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Person>, Self::Error>> + Send + '_;

  /// Exact, case-insensitive email match.
  fn find_by_email<'a>(
    &'a self,
    email: &'a str,
  ) -> impl Future<Output = Result<Option<Person>, Self::Error>> + Send + 'a;

  /// Directory-identifier suffix match.
  fn find_by_guid_suffix<'a>(
    &'a self,
    suffix: &'a str,
  ) -> impl Future<Output = Result<Option<Person>, Self::Error>> + Send + 'a;

  /// Exact distinguished-name match.
  fn find_by_dn<'a>(
    &'a self,
    dn: &'a str,
  ) -> impl Future<Output = Result<Option<Person>, Self::Error>> + Send + 'a;

  /// Every record with the given employee number, oldest first. Employee
  /// numbers are not unique, so the caller decides what multiple matches
  /// mean.
  fn find_by_employee_id<'a>(
    &'a self,
    employee_id: &'a str,
  ) -> impl Future<Output = Result<Vec<Person>, Self::Error>> + Send + 'a;

  /// List records matching `query`, ordered by display name.
  fn list_people<'a>(
    &'a self,
    query: &'a PersonQuery,
  ) -> impl Future<Output = Result<Vec<Person>, Self::Error>> + Send + 'a;

  // ── Organisational registers ──────────────────────────────────────────

  fn add_org_unit(
    &self,
    unit: OrgUnit,
  ) -> impl Future<Output = Result<OrgUnit, Self::Error>> + Send + '_;

  /// All org units, ordered by name.
  fn list_org_units(
    &self,
  ) -> impl Future<Output = Result<Vec<OrgUnit>, Self::Error>> + Send + '_;

  fn add_cost_centre(
    &self,
    centre: CostCentre,
  ) -> impl Future<Output = Result<CostCentre, Self::Error>> + Send + '_;

  /// All cost centres, ordered by code.
  fn list_cost_centres(
    &self,
  ) -> impl Future<Output = Result<Vec<CostCentre>, Self::Error>> + Send + '_;

  fn add_location(
    &self,
    location: Location,
  ) -> impl Future<Output = Result<Location, Self::Error>> + Send + '_;

  /// All locations, ordered by name.
  fn list_locations(
    &self,
  ) -> impl Future<Output = Result<Vec<Location>, Self::Error>> + Send + '_;

  // ── IT-system register ────────────────────────────────────────────────

  fn add_it_system(
    &self,
    system: ItSystem,
  ) -> impl Future<Output = Result<ItSystem, Self::Error>> + Send + '_;

  /// IT systems, optionally filtered by status, ordered by system id.
  fn list_it_systems(
    &self,
    status: Option<SystemStatus>,
  ) -> impl Future<Output = Result<Vec<ItSystem>, Self::Error>> + Send + '_;
}
