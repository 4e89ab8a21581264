//! Flat CSV report builder.
//!
//! Projects person records — scalar fields, derived labels and the
//! semi-structured attribute bags — into a single denormalised table. Every
//! per-cell extraction failure degrades to an empty string; one bad record
//! never aborts the report.

use orgreg_core::{
  org::{ItSystem, Location},
  person::Person,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{Error, Result};

// ─── Column layout ───────────────────────────────────────────────────────────

/// Scalar person fields exported verbatim, in column order.
pub const BASE_FIELDS: &[&str] = &[
  "email",
  "username",
  "given_name",
  "surname",
  "name",
  "employee_id",
  "cost_centre",
  "org_unit",
  "telephone",
  "mobile_phone",
  "other_phone",
  "title",
  "preferred_name",
];

/// Fixed lookups into the org bag's `units` array: column name and depth.
const ORG_UNIT_PATHS: &[(&str, usize)] =
  &[("department", 0), ("division", 1), ("branch", 2)];

/// HR-bag keys that hold nested objects rather than flat cells; never
/// exported even when a schema declares them.
const NESTED_HR_KEYS: &[&str] = &["mailbox"];

/// Declared key sets for the flattened attribute-bag columns.
///
/// The bags are semi-structured, so the report cannot know their shape from
/// the type system; instead of inferring the shape from whichever record
/// happens to be sampled first, the expected keys are declared here (and can
/// be overridden from configuration). A declared key missing from a record's
/// bag yields an empty cell.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportSchema {
  pub cost_centre_keys: Vec<String>,
  pub location_keys:    Vec<String>,
  pub hr_keys:          Vec<String>,
}

impl Default for ReportSchema {
  fn default() -> Self {
    let strings = |keys: &[&str]| keys.iter().map(|k| k.to_string()).collect();
    Self {
      cost_centre_keys: strings(&[
        "name",
        "code",
        "manager",
        "business_manager",
        "admin",
        "tech_contact",
      ]),
      location_keys:    strings(&["name", "address", "pobox", "phone", "fax"]),
      hr_keys:          strings(&[
        "EMPLOYEE_NO",
        "SURNAME",
        "FIRST_NAME",
        "POSITION_NO",
        "OCCUP_POS_TITLE",
        "CLASSIFICATION",
        "EMP_STATUS",
        "GEO_LOCATION_DESC",
        "PAYPOINT",
        "DATE_COMMENCED",
        "JOB_TERM_DATE",
      ]),
    }
  }
}

impl ReportSchema {
  /// Declared HR keys minus the known nested sub-keys.
  fn flat_hr_keys(&self) -> impl Iterator<Item = &String> {
    self
      .hr_keys
      .iter()
      .filter(|k| !NESTED_HR_KEYS.contains(&k.as_str()))
  }
}

// ─── Person report ───────────────────────────────────────────────────────────

/// Render the flat staff report: a UTF-8, comma-delimited CSV with a header
/// row and one row per **active** person record.
pub fn people_csv(people: &[Person], schema: &ReportSchema) -> Result<String> {
  let mut header: Vec<String> =
    BASE_FIELDS.iter().map(|f| f.to_string()).collect();
  header.push("account_type".to_string());
  header.push("position_type".to_string());
  header.push("reports_to".to_string());
  for (name, _) in ORG_UNIT_PATHS {
    header.push(name.to_string());
  }
  for key in &schema.cost_centre_keys {
    header.push(format!("cost_centre_{key}"));
  }
  for key in &schema.location_keys {
    header.push(format!("location_{key}"));
  }
  for key in schema.flat_hr_keys() {
    header.push(key.clone());
  }
  header.push("secondary_location".to_string());

  let mut wtr = csv::Writer::from_writer(Vec::new());
  wtr.write_record(&header)?;

  for person in people.iter().filter(|p| p.active) {
    wtr.write_record(person_row(person, schema))?;
  }

  finish(wtr)
}

fn person_row(person: &Person, schema: &ReportSchema) -> Vec<String> {
  let mut row: Vec<String> = BASE_FIELDS
    .iter()
    .map(|field| base_cell(person, field))
    .collect();

  row.push(
    person
      .account_type
      .map(|t| t.to_string())
      .unwrap_or_default(),
  );
  row.push(
    person
      .position_type
      .map(|t| t.to_string())
      .unwrap_or_default(),
  );
  row.push(
    person
      .manager_id
      .map(|id| id.to_string())
      .unwrap_or_default(),
  );

  for (_, depth) in ORG_UNIT_PATHS {
    row.push(unit_name(&person.org_data, *depth));
  }
  for key in &schema.cost_centre_keys {
    row.push(sub_bag_cell(&person.org_data, "cost_centre", key));
  }
  for key in &schema.location_keys {
    row.push(sub_bag_cell(&person.org_data, "location", key));
  }
  for key in schema.flat_hr_keys() {
    row.push(bag_cell(&person.hr_data, key));
  }
  row.push(secondary_location(&person.org_data));

  row
}

fn base_cell(person: &Person, field: &str) -> String {
  let opt = |value: &Option<String>| value.clone().unwrap_or_default();
  match field {
    "email" => person.email.clone(),
    "username" => person.username.clone(),
    "given_name" => opt(&person.given_name),
    "surname" => opt(&person.surname),
    "name" => person.name.clone(),
    "employee_id" => opt(&person.employee_id),
    "cost_centre" => opt(&person.cost_centre),
    "org_unit" => opt(&person.org_unit),
    "telephone" => opt(&person.telephone),
    "mobile_phone" => opt(&person.mobile_phone),
    "other_phone" => opt(&person.other_phone),
    "title" => opt(&person.title),
    "preferred_name" => opt(&person.preferred_name),
    _ => String::new(),
  }
}

// ─── Bag extraction ──────────────────────────────────────────────────────────

/// Render one JSON value as a cell. Strings are used verbatim; scalars are
/// stringified; null becomes empty.
fn json_cell(value: &Value) -> String {
  match value {
    Value::String(s) => s.clone(),
    Value::Null => String::new(),
    other => other.to_string(),
  }
}

fn bag_cell(bag: &Option<Value>, key: &str) -> String {
  bag
    .as_ref()
    .and_then(|b| b.get(key))
    .map(json_cell)
    .unwrap_or_default()
}

fn sub_bag_cell(bag: &Option<Value>, sub: &str, key: &str) -> String {
  bag
    .as_ref()
    .and_then(|b| b.get(sub))
    .and_then(|s| s.get(key))
    .map(json_cell)
    .unwrap_or_default()
}

/// `org_data.units[depth].name` — the fixed department/division/branch paths.
fn unit_name(org_data: &Option<Value>, depth: usize) -> String {
  org_data
    .as_ref()
    .and_then(|b| b.get("units"))
    .and_then(|units| units.get(depth))
    .and_then(|unit| unit.get("name"))
    .map(json_cell)
    .unwrap_or_default()
}

/// The secondary-location name; tolerates both a bare string and an object
/// carrying a `name` field.
fn secondary_location(org_data: &Option<Value>) -> String {
  let Some(value) = org_data.as_ref().and_then(|b| b.get("secondary_location"))
  else {
    return String::new();
  };
  match value {
    Value::String(s) => s.clone(),
    Value::Object(map) => map.get("name").map(json_cell).unwrap_or_default(),
    _ => String::new(),
  }
}

// ─── Register reports ────────────────────────────────────────────────────────

/// CSV export of the IT-system register.
pub fn it_systems_csv(systems: &[ItSystem]) -> Result<String> {
  let mut wtr = csv::Writer::from_writer(Vec::new());
  wtr.write_record([
    "system_id",
    "name",
    "acronym",
    "status",
    "owner",
    "custodian",
    "description",
  ])?;
  for system in systems {
    wtr.write_record([
      system.system_id.as_str(),
      system.name.as_str(),
      system.acronym.as_deref().unwrap_or(""),
      &system.status.to_string(),
      system.owner_email.as_deref().unwrap_or(""),
      system.custodian_email.as_deref().unwrap_or(""),
      system.description.as_deref().unwrap_or(""),
    ])?;
  }
  finish(wtr)
}

/// CSV export of the location register.
pub fn locations_csv(locations: &[Location]) -> Result<String> {
  let mut wtr = csv::Writer::from_writer(Vec::new());
  wtr.write_record(["name", "address", "phone", "fax", "manager"])?;
  for location in locations {
    wtr.write_record([
      location.name.as_str(),
      location.address.as_deref().unwrap_or(""),
      location.phone.as_deref().unwrap_or(""),
      location.fax.as_deref().unwrap_or(""),
      location.manager_email.as_deref().unwrap_or(""),
    ])?;
  }
  finish(wtr)
}

fn finish(wtr: csv::Writer<Vec<u8>>) -> Result<String> {
  let bytes = wtr.into_inner().map_err(|e| Error::Write(e.to_string()))?;
  String::from_utf8(bytes).map_err(|e| Error::Write(e.to_string()))
}

// ─── Tests ───────────────────────────────────────────────────────────────────
