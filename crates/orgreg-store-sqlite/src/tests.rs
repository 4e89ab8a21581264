//! Integration tests for `SqliteStore` against an in-memory database.

use orgreg_core::{
  org::{CostCentre, ItSystem, Location, OrgUnit, SystemStatus, UnitType},
  person::{AccountType, Person},
  store::{PersonQuery, PersonStore},
};
use uuid::Uuid;

use crate::SqliteStore;

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

fn person(email: &str, username: &str, guid: &str) -> Person {
  let mut p = Person::new(guid);
  p.email = email.to_string();
  p.username = username.to_string();
  p.distinguished_name = format!("CN={username},OU=Staff,DC=example,DC=org");
  p.name = username.to_string();
  p
}

// ─── People — writes and lookups ─────────────────────────────────────────────

#[tokio::test]
async fn create_and_get_person() {
  let s = store().await;

  let created = s
    .create_person(person("alice@example.org", "alice", "guid-alice"))
    .await
    .unwrap();

  let fetched = s.get_person(created.id).await.unwrap().unwrap();
  assert_eq!(fetched.email, "alice@example.org");
  assert_eq!(fetched.directory_guid, "guid-alice");
  assert_eq!(fetched.created_at, created.created_at);
}

#[tokio::test]
async fn get_person_missing_returns_none() {
  let s = store().await;
  assert!(s.get_person(Uuid::new_v4()).await.unwrap().is_none());
}

#[tokio::test]
async fn update_person_persists_all_fields() {
  let s = store().await;
  let mut p = s
    .create_person(person("bob@example.org", "bob", "guid-bob"))
    .await
    .unwrap();

  p.title = Some("Ranger".to_string());
  p.account_type = Some(AccountType::Permanent);
  p.hr_data = Some(serde_json::json!({"EMPLOYEE_NO": "000123"}));
  p.active = false;
  let updated = s.update_person(&p).await.unwrap();
  assert!(updated.updated_at >= p.created_at);

  let fetched = s.get_person(p.id).await.unwrap().unwrap();
  assert_eq!(fetched.title.as_deref(), Some("Ranger"));
  assert_eq!(fetched.account_type, Some(AccountType::Permanent));
  assert_eq!(
    fetched.hr_data,
    Some(serde_json::json!({"EMPLOYEE_NO": "000123"}))
  );
  assert!(!fetched.active);
}

#[tokio::test]
async fn update_unknown_person_errors() {
  let s = store().await;
  let p = person("ghost@example.org", "ghost", "guid-ghost");
  let err = s.update_person(&p).await.unwrap_err();
  assert!(matches!(err, crate::Error::PersonNotFound(id) if id == p.id));
}

#[tokio::test]
async fn find_by_email_is_case_insensitive() {
  let s = store().await;
  s.create_person(person("Carol.Smith@Example.Org", "carol", "guid-carol"))
    .await
    .unwrap();

  let found = s.find_by_email("carol.smith@example.org").await.unwrap();
  assert!(found.is_some());
  assert_eq!(found.unwrap().username, "carol");

  assert!(s.find_by_email("nobody@example.org").await.unwrap().is_none());
}

#[tokio::test]
async fn find_by_guid_suffix_matches_tail() {
  let s = store().await;
  s.create_person(person("dan@example.org", "dan", "S-1-5-21-1111-2222"))
    .await
    .unwrap();

  let found = s.find_by_guid_suffix("1111-2222").await.unwrap();
  assert!(found.is_some());
  assert_eq!(found.unwrap().username, "dan");

  assert!(s.find_by_guid_suffix("9999").await.unwrap().is_none());
}

#[tokio::test]
async fn ambiguous_suffix_returns_oldest_record() {
  let s = store().await;
  let first = s
    .create_person(person("eve@example.org", "eve", "guid-aa-7777"))
    .await
    .unwrap();
  s.create_person(person("frank@example.org", "frank", "guid-bb-7777"))
    .await
    .unwrap();

  // Both GUIDs end in 7777; the earliest-created row wins.
  let found = s.find_by_guid_suffix("7777").await.unwrap().unwrap();
  assert_eq!(found.id, first.id);
}

#[tokio::test]
async fn find_by_dn_is_exact() {
  let s = store().await;
  let p = s
    .create_person(person("gina@example.org", "gina", "guid-gina"))
    .await
    .unwrap();

  let found = s.find_by_dn(&p.distinguished_name).await.unwrap();
  assert_eq!(found.unwrap().id, p.id);

  assert!(s.find_by_dn("CN=gina").await.unwrap().is_none());
}

#[tokio::test]
async fn find_by_employee_id_returns_all_matches() {
  let s = store().await;

  let mut a = person("h1@example.org", "h1", "guid-h1");
  a.employee_id = Some("000777".to_string());
  let mut b = person("h2@example.org", "h2", "guid-h2");
  b.employee_id = Some("000777".to_string());
  let mut c = person("h3@example.org", "h3", "guid-h3");
  c.employee_id = Some("000778".to_string());

  let first = s.create_person(a).await.unwrap();
  s.create_person(b).await.unwrap();
  s.create_person(c).await.unwrap();

  let matches = s.find_by_employee_id("000777").await.unwrap();
  assert_eq!(matches.len(), 2);
  assert_eq!(matches[0].id, first.id, "oldest row first");

  assert!(s.find_by_employee_id("999999").await.unwrap().is_empty());
}

// ─── People — listing ────────────────────────────────────────────────────────

async fn seed_listing(s: &SqliteStore) {
  let mut active = person("ivy@example.org", "ivy", "guid-ivy");
  active.cost_centre = Some("042".to_string());
  s.create_person(active).await.unwrap();

  let mut inactive = person("jack@example.org", "jack", "guid-jack");
  inactive.active = false;
  s.create_person(inactive).await.unwrap();

  let mut deleted = person("kim@example.org", "kim", "guid-kim");
  deleted.active = false;
  deleted.directory_deleted = true;
  s.create_person(deleted).await.unwrap();
}

#[tokio::test]
async fn list_people_defaults_to_active_only() {
  let s = store().await;
  seed_listing(&s).await;

  let people = s.list_people(&PersonQuery::default()).await.unwrap();
  assert_eq!(people.len(), 1);
  assert_eq!(people[0].username, "ivy");
}

#[tokio::test]
async fn list_people_all_includes_everything() {
  let s = store().await;
  seed_listing(&s).await;

  let query = PersonQuery { include_inactive: true, ..Default::default() };
  assert_eq!(s.list_people(&query).await.unwrap().len(), 3);
}

#[tokio::test]
async fn list_people_filters_on_directory_deleted_flag() {
  let s = store().await;
  seed_listing(&s).await;

  let query = PersonQuery {
    directory_deleted: Some(true),
    ..Default::default()
  };
  let deleted = s.list_people(&query).await.unwrap();
  assert_eq!(deleted.len(), 1);
  assert_eq!(deleted[0].username, "kim");

  let query = PersonQuery {
    directory_deleted: Some(false),
    ..Default::default()
  };
  // Includes the inactive-but-not-deleted record.
  assert_eq!(s.list_people(&query).await.unwrap().len(), 2);
}

#[tokio::test]
async fn list_people_email_and_cost_centre_filters() {
  let s = store().await;
  seed_listing(&s).await;

  let query = PersonQuery {
    email: Some("IVY@example.org".to_string()),
    ..Default::default()
  };
  assert_eq!(s.list_people(&query).await.unwrap().len(), 1);

  let query = PersonQuery {
    cost_centre: Some("042".to_string()),
    ..Default::default()
  };
  assert_eq!(s.list_people(&query).await.unwrap().len(), 1);

  let query = PersonQuery {
    cost_centre: Some("999".to_string()),
    ..Default::default()
  };
  assert!(s.list_people(&query).await.unwrap().is_empty());
}

// ─── Registers ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn org_unit_round_trip() {
  let s = store().await;
  s.add_org_unit(OrgUnit {
    id:            Uuid::new_v4(),
    name:          "Science and Conservation".to_string(),
    unit_type:     UnitType::Division,
    acronym:       Some("SC".to_string()),
    manager_email: None,
  })
  .await
  .unwrap();

  let units = s.list_org_units().await.unwrap();
  assert_eq!(units.len(), 1);
  assert_eq!(units[0].unit_type, UnitType::Division);
}

#[tokio::test]
async fn cost_centres_ordered_by_code() {
  let s = store().await;
  for (code, name) in [("210", "Forests"), ("042", "Wetlands")] {
    s.add_cost_centre(CostCentre {
      id:            Uuid::new_v4(),
      code:          code.to_string(),
      name:          name.to_string(),
      manager_email: None,
    })
    .await
    .unwrap();
  }

  let centres = s.list_cost_centres().await.unwrap();
  assert_eq!(centres[0].code, "042");
  assert_eq!(centres[1].code, "210");
}

#[tokio::test]
async fn locations_round_trip() {
  let s = store().await;
  s.add_location(Location {
    id:            Uuid::new_v4(),
    name:          "Kensington HQ".to_string(),
    address:       Some("17 Dick Perry Ave".to_string()),
    phone:         None,
    fax:           None,
    manager_email: None,
  })
  .await
  .unwrap();

  let locations = s.list_locations().await.unwrap();
  assert_eq!(locations.len(), 1);
  assert_eq!(locations[0].name, "Kensington HQ");
}

#[tokio::test]
async fn it_systems_filter_by_status() {
  let s = store().await;
  for (system_id, name, status) in [
    ("S001", "Payroll", SystemStatus::Production),
    ("S002", "Legacy GIS", SystemStatus::Decommissioned),
  ] {
    s.add_it_system(ItSystem {
      id:              Uuid::new_v4(),
      system_id:       system_id.to_string(),
      name:            name.to_string(),
      acronym:         None,
      status,
      owner_email:     None,
      custodian_email: None,
      description:     None,
    })
    .await
    .unwrap();
  }

  assert_eq!(s.list_it_systems(None).await.unwrap().len(), 2);

  let production = s
    .list_it_systems(Some(SystemStatus::Production))
    .await
    .unwrap();
  assert_eq!(production.len(), 1);
  assert_eq!(production[0].system_id, "S001");
}
