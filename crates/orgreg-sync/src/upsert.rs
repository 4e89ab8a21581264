//! The directory upsert engine.
//!
//! One call reconciles one directory change record against the store:
//! resolve, then soft-delete, freshness-gated update, or create. Field
//! merging is two-tier — system-of-record fields always follow the
//! directory; curated identity fields are first-write-wins.

use chrono::{DateTime, Utc};
use orgreg_core::{
  person::{DirectoryRecord, Person},
  store::PersonStore,
};
use serde::Serialize;

use crate::{
  Error, Result,
  audit::AuditSink,
  resolve::resolve,
};

// ─── Outcomes ────────────────────────────────────────────────────────────────

/// What the engine did with the payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum UpsertAction {
  Created,
  Updated,
  Deleted,
  /// The record was already synced from a payload at least this new; nothing
  /// was modified.
  SkippedStale,
}

/// Before-image of the traceable fields, kept for the audit line.
#[derive(Debug, Clone, Serialize)]
pub struct FieldSnapshot {
  pub email:              String,
  pub username:           String,
  pub directory_guid:     String,
  pub distinguished_name: String,
  pub name:               String,
  pub title:              Option<String>,
  pub given_name:         Option<String>,
  pub surname:            Option<String>,
  pub active:             bool,
  pub directory_deleted:  bool,
  pub expiry_date:        Option<DateTime<Utc>>,
}

impl FieldSnapshot {
  pub fn of(person: &Person) -> Self {
    Self {
      email:              person.email.clone(),
      username:           person.username.clone(),
      directory_guid:     person.directory_guid.clone(),
      distinguished_name: person.distinguished_name.clone(),
      name:               person.name.clone(),
      title:              person.title.clone(),
      given_name:         person.given_name.clone(),
      surname:            person.surname.clone(),
      active:             person.active,
      directory_deleted:  person.directory_deleted,
      expiry_date:        person.expiry_date,
    }
  }
}

/// The engine's result: the persisted record, what happened to it, and the
/// prior field snapshot when an existing record was touched.
#[derive(Debug, Clone, Serialize)]
pub struct UpsertReport {
  pub action:   UpsertAction,
  pub person:   Person,
  pub previous: Option<FieldSnapshot>,
}

// ─── Entry points ────────────────────────────────────────────────────────────

/// Full upsert: resolve, then delete/update/create as the payload dictates.
/// A deletion payload that resolves nothing is a [`Error::NotFound`].
pub async fn upsert<S, A>(
  store: &S,
  audit: &A,
  record: &DirectoryRecord,
) -> Result<UpsertReport, S::Error>
where
  S: PersonStore,
  A: AuditSink + ?Sized,
{
  validate(record)?;
  match resolve(store, record).await? {
    Some((key, person)) => {
      tracing::debug!(email = %record.email, ?key, "resolved existing record");
      apply_existing(store, audit, record, person).await
    }
    None if record.deleted => Err(Error::NotFound),
    None => create(store, audit, record).await,
  }
}

/// Update-only variant: the payload must resolve to an existing record.
pub async fn update_existing<S, A>(
  store: &S,
  audit: &A,
  record: &DirectoryRecord,
) -> Result<UpsertReport, S::Error>
where
  S: PersonStore,
  A: AuditSink + ?Sized,
{
  validate(record)?;
  match resolve(store, record).await? {
    Some((_, person)) => apply_existing(store, audit, record, person).await,
    None => Err(Error::NotFound),
  }
}

/// Create-only variant: the payload must not resolve to an existing record.
pub async fn create_new<S, A>(
  store: &S,
  audit: &A,
  record: &DirectoryRecord,
) -> Result<UpsertReport, S::Error>
where
  S: PersonStore,
  A: AuditSink + ?Sized,
{
  validate(record)?;
  match resolve(store, record).await? {
    Some((_, person)) => Err(Error::AlreadyExists(person.email)),
    None => create(store, audit, record).await,
  }
}

// ─── Steps ───────────────────────────────────────────────────────────────────

fn validate<E>(record: &DirectoryRecord) -> Result<(), E>
where
  E: std::error::Error + Send + Sync + 'static,
{
  let required: [(&'static str, &str); 4] = [
    ("ObjectGUID", &record.object_guid),
    ("EmailAddress", &record.email),
    ("DistinguishedName", &record.distinguished_name),
    ("SamAccountName", &record.sam_account_name),
  ];
  for (field, value) in required {
    if value.trim().is_empty() {
      return Err(Error::MissingField(field));
    }
  }
  Ok(())
}

async fn apply_existing<S, A>(
  store: &S,
  audit: &A,
  record: &DirectoryRecord,
  person: Person,
) -> Result<UpsertReport, S::Error>
where
  S: PersonStore,
  A: AuditSink + ?Sized,
{
  let previous = FieldSnapshot::of(&person);

  if record.deleted {
    // Deletion always applies; the staleness gate does not.
    let mut updated = person;
    updated.active = false;
    updated.directory_deleted = true;
    updated.directory_synced = true;
    let updated = store
      .update_person(&updated)
      .await
      .map_err(Error::Store)?;

    emit_audit(audit, UpsertAction::Deleted, &updated, Some(&previous));
    tracing::info!(email = %updated.email, "marked person record deleted in directory");
    return Ok(UpsertReport {
      action:   UpsertAction::Deleted,
      person:   updated,
      previous: Some(previous),
    });
  }

  // Apply only when the record has never been synced from the directory, or
  // the payload is strictly newer than the last applied sync.
  let stale = person.directory_synced
    && person
      .last_directory_sync
      .is_some_and(|last| record.modified <= last);
  if stale {
    tracing::debug!(
      email = %person.email,
      modified = %record.modified,
      "stale directory payload; record unchanged"
    );
    return Ok(UpsertReport {
      action:   UpsertAction::SkippedStale,
      person,
      previous: None,
    });
  }

  let mut updated = person;
  merge_directory_fields(&mut updated, record)?;
  let updated = store
    .update_person(&updated)
    .await
    .map_err(Error::Store)?;

  emit_audit(audit, UpsertAction::Updated, &updated, Some(&previous));
  tracing::info!(email = %updated.email, "updated person record from directory");
  Ok(UpsertReport {
    action:   UpsertAction::Updated,
    person:   updated,
    previous: Some(previous),
  })
}

async fn create<S, A>(
  store: &S,
  audit: &A,
  record: &DirectoryRecord,
) -> Result<UpsertReport, S::Error>
where
  S: PersonStore,
  A: AuditSink + ?Sized,
{
  let mut person = Person::new(&record.object_guid);
  merge_directory_fields(&mut person, record)?;
  let person = store.create_person(person).await.map_err(Error::Store)?;

  emit_audit(audit, UpsertAction::Created, &person, None);
  tracing::info!(email = %person.email, "created person record from directory");
  Ok(UpsertReport {
    action:   UpsertAction::Created,
    person,
    previous: None,
  })
}

/// The two-tier merge.
///
/// System-of-record fields always follow the external source; curated
/// identity fields are protected once populated.
fn merge_directory_fields<E>(
  person: &mut Person,
  record: &DirectoryRecord,
) -> Result<(), E>
where
  E: std::error::Error + Send + Sync + 'static,
{
  // System-of-record group.
  person.email = record.email.clone();
  person.directory_guid = record.object_guid.clone();
  person.distinguished_name = record.distinguished_name.clone();
  person.username = record.sam_account_name.clone();
  person.expiry_date = record.account_expiry;
  person.active = record.enabled;
  person.directory_deleted = false;
  person.directory_data = Some(record.as_bag()?);

  // Curated group: first write wins.
  if person.name.is_empty() {
    person.name = record.name.clone();
  }
  if is_blank(&person.title) {
    person.title = record.title.clone();
  }
  if is_blank(&person.given_name) {
    person.given_name = record.given_name.clone();
  }
  if is_blank(&person.surname) {
    person.surname = record.surname.clone();
  }

  person.directory_synced = true;
  person.last_directory_sync = Some(record.modified);
  Ok(())
}

fn is_blank(value: &Option<String>) -> bool {
  value.as_deref().is_none_or(str::is_empty)
}

fn emit_audit(
  audit: &(impl AuditSink + ?Sized),
  action: UpsertAction,
  person: &Person,
  previous: Option<&FieldSnapshot>,
) {
  let line = serde_json::json!({
    "person_id": person.id,
    "action": action,
    "before": previous,
    "after": FieldSnapshot::of(person),
  });
  audit.append(&line.to_string());
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use chrono::TimeZone;
  use orgreg_store_sqlite::SqliteStore;

  use super::*;
  use crate::audit::MemoryAudit;

  fn ts(seconds: i64) -> DateTime<Utc> {
    Utc.timestamp_opt(1_000_000 + seconds, 0).unwrap()
  }

  fn record(guid: &str, email: &str, modified: DateTime<Utc>) -> DirectoryRecord {
    DirectoryRecord {
      object_guid:        guid.to_string(),
      email:              email.to_string(),
      distinguished_name: format!("CN={guid},OU=Staff,DC=example,DC=org"),
      sam_account_name:   email.split('@').next().unwrap().to_string(),
      name:               "Jo Bloggs".to_string(),
      given_name:         Some("Jo".to_string()),
      surname:            Some("Bloggs".to_string()),
      title:              Some("Ranger".to_string()),
      enabled:            true,
      deleted:            false,
      modified,
      account_expiry:     None,
      extra:              serde_json::Map::new(),
    }
  }

  async fn store() -> SqliteStore {
    SqliteStore::open_in_memory().await.unwrap()
  }

  #[tokio::test]
  async fn unknown_identity_is_created() {
    let s = store().await;
    let audit = MemoryAudit::default();

    let report = upsert(&s, &audit, &record("g-1", "jo@example.org", ts(0)))
      .await
      .unwrap();

    assert_eq!(report.action, UpsertAction::Created);
    assert!(report.previous.is_none());
    assert_eq!(report.person.email, "jo@example.org");
    assert_eq!(report.person.username, "jo");
    assert!(report.person.directory_synced);
    assert_eq!(report.person.last_directory_sync, Some(ts(0)));

    let stored = s.find_by_email("jo@example.org").await.unwrap().unwrap();
    assert_eq!(stored.id, report.person.id);
    assert_eq!(audit.lines().len(), 1);
  }

  #[tokio::test]
  async fn deletion_applies_regardless_of_timestamps() {
    let s = store().await;
    let audit = MemoryAudit::default();
    upsert(&s, &audit, &record("g-1", "jo@example.org", ts(100)))
      .await
      .unwrap();

    // A deletion payload older than the last sync still applies.
    let mut deletion = record("g-1", "jo@example.org", ts(0));
    deletion.deleted = true;
    let report = upsert(&s, &audit, &deletion).await.unwrap();

    assert_eq!(report.action, UpsertAction::Deleted);
    assert!(!report.person.active);
    assert!(report.person.directory_deleted);
    assert!(report.person.directory_synced);
    assert!(report.previous.is_some());
    assert!(report.previous.unwrap().active);
  }

  #[tokio::test]
  async fn deletion_of_unknown_identity_is_not_found() {
    let s = store().await;
    let audit = MemoryAudit::default();
    let mut deletion = record("g-9", "ghost@example.org", ts(0));
    deletion.deleted = true;

    let err = upsert(&s, &audit, &deletion).await.unwrap_err();
    assert!(matches!(err, Error::NotFound));
    assert!(audit.lines().is_empty());
  }

  #[tokio::test]
  async fn never_synced_record_always_updates() {
    let s = store().await;
    let audit = MemoryAudit::default();

    // Seed a record that has never been touched by the directory feed.
    let mut seeded = orgreg_core::person::Person::new("g-1");
    seeded.email = "jo@example.org".to_string();
    seeded.username = "jo".to_string();
    seeded.distinguished_name = "CN=old".to_string();
    seeded.name = "Jo Bloggs".to_string();
    seeded.directory_synced = false;
    seeded.last_directory_sync = Some(ts(500));
    let seeded = s.create_person(seeded).await.unwrap();

    // Payload far older than last_directory_sync; applies anyway because the
    // record was never directory-synced.
    let report = upsert(&s, &audit, &record("g-1", "jo@example.org", ts(0)))
      .await
      .unwrap();
    assert_eq!(report.action, UpsertAction::Updated);
    assert_eq!(report.person.id, seeded.id);
    assert!(report.person.directory_synced);
  }

  #[tokio::test]
  async fn stale_payload_modifies_nothing() {
    let s = store().await;
    let audit = MemoryAudit::default();
    let first = upsert(&s, &audit, &record("g-1", "jo@example.org", ts(100)))
      .await
      .unwrap();

    // Same timestamp: not strictly newer, so nothing changes.
    let mut stale = record("g-1", "jo@example.org", ts(100));
    stale.title = Some("Director General".to_string());
    stale.enabled = false;
    let report = upsert(&s, &audit, &stale).await.unwrap();

    assert_eq!(report.action, UpsertAction::SkippedStale);
    let stored = s.get_person(first.person.id).await.unwrap().unwrap();
    assert!(stored.active);
    assert_eq!(stored.title.as_deref(), Some("Ranger"));
    assert_eq!(stored.last_directory_sync, Some(ts(100)));
    // Only the initial create produced an audit line.
    assert_eq!(audit.lines().len(), 1);
  }

  #[tokio::test]
  async fn newer_payload_updates_system_of_record_fields() {
    let s = store().await;
    let audit = MemoryAudit::default();
    let first = upsert(&s, &audit, &record("g-1", "jo@example.org", ts(0)))
      .await
      .unwrap();

    let mut newer = record("g-1", "jo.bloggs@example.org", ts(60));
    newer.object_guid = "g-1".to_string();
    newer.sam_account_name = "jbloggs".to_string();
    newer.enabled = false;
    newer
      .extra
      .insert("Department".to_string(), "Science".into());
    let report = upsert(&s, &audit, &newer).await.unwrap();

    assert_eq!(report.action, UpsertAction::Updated);
    assert_eq!(report.person.id, first.person.id);
    assert_eq!(report.person.email, "jo.bloggs@example.org");
    assert_eq!(report.person.username, "jbloggs");
    assert!(!report.person.active);
    assert_eq!(report.person.last_directory_sync, Some(ts(60)));
    // The directory bag is replaced wholesale.
    let bag = report.person.directory_data.unwrap();
    assert_eq!(bag["Department"], "Science");
    // The audit line carries before and after values.
    let last_line = audit.lines().pop().unwrap();
    assert!(last_line.contains("jo@example.org"));
    assert!(last_line.contains("jo.bloggs@example.org"));
  }

  #[tokio::test]
  async fn curated_fields_are_first_write_wins() {
    let s = store().await;
    let audit = MemoryAudit::default();
    upsert(&s, &audit, &record("g-1", "jo@example.org", ts(0)))
      .await
      .unwrap();

    let mut newer = record("g-1", "jo@example.org", ts(60));
    newer.name = "J. Bloggs (Renamed)".to_string();
    newer.title = Some("Director".to_string());
    newer.given_name = Some("Josephine".to_string());
    let report = upsert(&s, &audit, &newer).await.unwrap();

    // Already populated on first sync; later payloads do not overwrite.
    assert_eq!(report.person.name, "Jo Bloggs");
    assert_eq!(report.person.title.as_deref(), Some("Ranger"));
    assert_eq!(report.person.given_name.as_deref(), Some("Jo"));
  }

  #[tokio::test]
  async fn curated_fields_fill_when_empty() {
    let s = store().await;
    let audit = MemoryAudit::default();

    let mut bare = record("g-1", "jo@example.org", ts(0));
    bare.title = None;
    bare.given_name = None;
    upsert(&s, &audit, &bare).await.unwrap();

    let report = upsert(&s, &audit, &record("g-1", "jo@example.org", ts(60)))
      .await
      .unwrap();
    assert_eq!(report.person.title.as_deref(), Some("Ranger"));
    assert_eq!(report.person.given_name.as_deref(), Some("Jo"));
  }

  #[tokio::test]
  async fn resolution_falls_back_from_email_to_guid_suffix() {
    let s = store().await;
    let audit = MemoryAudit::default();
    let first = upsert(&s, &audit, &record("guid-abc-123", "jo@example.org", ts(0)))
      .await
      .unwrap();

    // Email changed in the directory; the GUID suffix still resolves the
    // same record, and the system-of-record merge adopts the new email.
    let moved = record("abc-123", "jo.new@example.org", ts(60));
    let report = upsert(&s, &audit, &moved).await.unwrap();
    assert_eq!(report.action, UpsertAction::Updated);
    assert_eq!(report.person.id, first.person.id);
    assert_eq!(report.person.email, "jo.new@example.org");
  }

  #[tokio::test]
  async fn update_existing_requires_a_match() {
    let s = store().await;
    let audit = MemoryAudit::default();
    let err = update_existing(&s, &audit, &record("g-1", "jo@example.org", ts(0)))
      .await
      .unwrap_err();
    assert!(matches!(err, Error::NotFound));
  }

  #[tokio::test]
  async fn create_new_rejects_an_existing_identity() {
    let s = store().await;
    let audit = MemoryAudit::default();
    create_new(&s, &audit, &record("g-1", "jo@example.org", ts(0)))
      .await
      .unwrap();

    let err = create_new(&s, &audit, &record("g-1", "jo@example.org", ts(60)))
      .await
      .unwrap_err();
    assert!(matches!(err, Error::AlreadyExists(email) if email == "jo@example.org"));
  }

  #[tokio::test]
  async fn missing_required_field_is_an_explicit_error() {
    let s = store().await;
    let audit = MemoryAudit::default();
    let mut bad = record("g-1", "jo@example.org", ts(0));
    bad.sam_account_name = String::new();

    let err = upsert(&s, &audit, &bad).await.unwrap_err();
    assert!(matches!(err, Error::MissingField("SamAccountName")));
    assert!(s.find_by_email("jo@example.org").await.unwrap().is_none());
  }
}
