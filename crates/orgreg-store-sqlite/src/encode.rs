//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! All timestamps are stored as RFC 3339 strings. Attribute bags are stored
//! as compact JSON text. Choice enums are stored as their numeric codes.
//! UUIDs are stored as hyphenated lowercase strings.

use chrono::{DateTime, Utc};
use orgreg_core::{
  org::{CostCentre, ItSystem, Location, OrgUnit, SystemStatus, UnitType},
  person::{AccountType, Person, PositionType},
};
use serde_json::Value;
use uuid::Uuid;

use crate::{Error, Result};

// ─── Uuid ─────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── JSON bags ───────────────────────────────────────────────────────────────

pub fn encode_bag(bag: &Option<Value>) -> Option<String> {
  bag.as_ref().map(Value::to_string)
}

pub fn decode_bag(s: Option<String>) -> Result<Option<Value>> {
  s.as_deref().map(serde_json::from_str).transpose().map_err(Error::Json)
}

// ─── People rows ─────────────────────────────────────────────────────────────

/// Column list shared by every `people` SELECT; order matches [`RawPerson`]
/// and the INSERT/UPDATE statements in `store.rs`.
pub const PERSON_COLUMNS: &str = "id, created_at, updated_at, email, username, \
   directory_guid, distinguished_name, employee_id, name, given_name, \
   surname, title, preferred_name, telephone, mobile_phone, other_phone, \
   cost_centre, org_unit, manager_id, account_type, position_type, active, \
   directory_deleted, directory_synced, expiry_date, last_directory_sync, \
   directory_data, org_data, hr_data";

/// Owned column values ready to move into a `tokio_rusqlite` call closure.
pub struct EncodedPerson {
  pub id:                  String,
  pub created_at:          String,
  pub updated_at:          String,
  pub email:               String,
  pub username:            String,
  pub directory_guid:      String,
  pub distinguished_name:  String,
  pub employee_id:         Option<String>,
  pub name:                String,
  pub given_name:          Option<String>,
  pub surname:             Option<String>,
  pub title:               Option<String>,
  pub preferred_name:      Option<String>,
  pub telephone:           Option<String>,
  pub mobile_phone:        Option<String>,
  pub other_phone:         Option<String>,
  pub cost_centre:         Option<String>,
  pub org_unit:            Option<String>,
  pub manager_id:          Option<String>,
  pub account_type:        Option<i64>,
  pub position_type:       Option<i64>,
  pub active:              bool,
  pub directory_deleted:   bool,
  pub directory_synced:    bool,
  pub expiry_date:         Option<String>,
  pub last_directory_sync: Option<String>,
  pub directory_data:      Option<String>,
  pub org_data:            Option<String>,
  pub hr_data:             Option<String>,
}

/// Encode a person with the timestamps the store decided on.
pub fn encode_person(
  person:     &Person,
  created_at: DateTime<Utc>,
  updated_at: DateTime<Utc>,
) -> EncodedPerson {
  EncodedPerson {
    id:                  encode_uuid(person.id),
    created_at:          encode_dt(created_at),
    updated_at:          encode_dt(updated_at),
    email:               person.email.clone(),
    username:            person.username.clone(),
    directory_guid:      person.directory_guid.clone(),
    distinguished_name:  person.distinguished_name.clone(),
    employee_id:         person.employee_id.clone(),
    name:                person.name.clone(),
    given_name:          person.given_name.clone(),
    surname:             person.surname.clone(),
    title:               person.title.clone(),
    preferred_name:      person.preferred_name.clone(),
    telephone:           person.telephone.clone(),
    mobile_phone:        person.mobile_phone.clone(),
    other_phone:         person.other_phone.clone(),
    cost_centre:         person.cost_centre.clone(),
    org_unit:            person.org_unit.clone(),
    manager_id:          person.manager_id.map(encode_uuid),
    account_type:        person.account_type.map(AccountType::code),
    position_type:       person.position_type.map(PositionType::code),
    active:              person.active,
    directory_deleted:   person.directory_deleted,
    directory_synced:    person.directory_synced,
    expiry_date:         person.expiry_date.map(encode_dt),
    last_directory_sync: person.last_directory_sync.map(encode_dt),
    directory_data:      encode_bag(&person.directory_data),
    org_data:            encode_bag(&person.org_data),
    hr_data:             encode_bag(&person.hr_data),
  }
}

/// Raw strings read directly from a `people` row.
pub struct RawPerson {
  pub id:                  String,
  pub created_at:          String,
  pub updated_at:          String,
  pub email:               String,
  pub username:            String,
  pub directory_guid:      String,
  pub distinguished_name:  String,
  pub employee_id:         Option<String>,
  pub name:                String,
  pub given_name:          Option<String>,
  pub surname:             Option<String>,
  pub title:               Option<String>,
  pub preferred_name:      Option<String>,
  pub telephone:           Option<String>,
  pub mobile_phone:        Option<String>,
  pub other_phone:         Option<String>,
  pub cost_centre:         Option<String>,
  pub org_unit:            Option<String>,
  pub manager_id:          Option<String>,
  pub account_type:        Option<i64>,
  pub position_type:       Option<i64>,
  pub active:              bool,
  pub directory_deleted:   bool,
  pub directory_synced:    bool,
  pub expiry_date:         Option<String>,
  pub last_directory_sync: Option<String>,
  pub directory_data:      Option<String>,
  pub org_data:            Option<String>,
  pub hr_data:             Option<String>,
}

impl RawPerson {
  /// Build a `RawPerson` from a row SELECTed with [`PERSON_COLUMNS`].
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:                  row.get(0)?,
      created_at:          row.get(1)?,
      updated_at:          row.get(2)?,
      email:               row.get(3)?,
      username:            row.get(4)?,
      directory_guid:      row.get(5)?,
      distinguished_name:  row.get(6)?,
      employee_id:         row.get(7)?,
      name:                row.get(8)?,
      given_name:          row.get(9)?,
      surname:             row.get(10)?,
      title:               row.get(11)?,
      preferred_name:      row.get(12)?,
      telephone:           row.get(13)?,
      mobile_phone:        row.get(14)?,
      other_phone:         row.get(15)?,
      cost_centre:         row.get(16)?,
      org_unit:            row.get(17)?,
      manager_id:          row.get(18)?,
      account_type:        row.get(19)?,
      position_type:       row.get(20)?,
      active:              row.get(21)?,
      directory_deleted:   row.get(22)?,
      directory_synced:    row.get(23)?,
      expiry_date:         row.get(24)?,
      last_directory_sync: row.get(25)?,
      directory_data:      row.get(26)?,
      org_data:            row.get(27)?,
      hr_data:             row.get(28)?,
    })
  }

  pub fn into_person(self) -> Result<Person> {
    Ok(Person {
      id:                  decode_uuid(&self.id)?,
      created_at:          decode_dt(&self.created_at)?,
      updated_at:          decode_dt(&self.updated_at)?,
      email:               self.email,
      username:            self.username,
      directory_guid:      self.directory_guid,
      distinguished_name:  self.distinguished_name,
      employee_id:         self.employee_id,
      name:                self.name,
      given_name:          self.given_name,
      surname:             self.surname,
      title:               self.title,
      preferred_name:      self.preferred_name,
      telephone:           self.telephone,
      mobile_phone:        self.mobile_phone,
      other_phone:         self.other_phone,
      cost_centre:         self.cost_centre,
      org_unit:            self.org_unit,
      manager_id:          self.manager_id.as_deref().map(decode_uuid).transpose()?,
      account_type:        self
        .account_type
        .map(AccountType::from_code)
        .transpose()
        .map_err(Error::Core)?,
      position_type:       self
        .position_type
        .map(PositionType::from_code)
        .transpose()
        .map_err(Error::Core)?,
      active:              self.active,
      directory_deleted:   self.directory_deleted,
      directory_synced:    self.directory_synced,
      expiry_date:         self.expiry_date.as_deref().map(decode_dt).transpose()?,
      last_directory_sync: self
        .last_directory_sync
        .as_deref()
        .map(decode_dt)
        .transpose()?,
      directory_data:      decode_bag(self.directory_data)?,
      org_data:            decode_bag(self.org_data)?,
      hr_data:             decode_bag(self.hr_data)?,
    })
  }
}

// ─── Register rows ───────────────────────────────────────────────────────────

pub struct RawOrgUnit {
  pub id:            String,
  pub name:          String,
  pub unit_type:     i64,
  pub acronym:       Option<String>,
  pub manager_email: Option<String>,
}

impl RawOrgUnit {
  pub fn into_org_unit(self) -> Result<OrgUnit> {
    Ok(OrgUnit {
      id:            decode_uuid(&self.id)?,
      name:          self.name,
      unit_type:     UnitType::from_code(self.unit_type).map_err(Error::Core)?,
      acronym:       self.acronym,
      manager_email: self.manager_email,
    })
  }
}

pub struct RawCostCentre {
  pub id:            String,
  pub code:          String,
  pub name:          String,
  pub manager_email: Option<String>,
}

impl RawCostCentre {
  pub fn into_cost_centre(self) -> Result<CostCentre> {
    Ok(CostCentre {
      id:            decode_uuid(&self.id)?,
      code:          self.code,
      name:          self.name,
      manager_email: self.manager_email,
    })
  }
}

pub struct RawLocation {
  pub id:            String,
  pub name:          String,
  pub address:       Option<String>,
  pub phone:         Option<String>,
  pub fax:           Option<String>,
  pub manager_email: Option<String>,
}

impl RawLocation {
  pub fn into_location(self) -> Result<Location> {
    Ok(Location {
      id:            decode_uuid(&self.id)?,
      name:          self.name,
      address:       self.address,
      phone:         self.phone,
      fax:           self.fax,
      manager_email: self.manager_email,
    })
  }
}

pub struct RawItSystem {
  pub id:              String,
  pub system_id:       String,
  pub name:            String,
  pub acronym:         Option<String>,
  pub status:          i64,
  pub owner_email:     Option<String>,
  pub custodian_email: Option<String>,
  pub description:     Option<String>,
}

impl RawItSystem {
  pub fn into_it_system(self) -> Result<ItSystem> {
    Ok(ItSystem {
      id:              decode_uuid(&self.id)?,
      system_id:       self.system_id,
      name:            self.name,
      acronym:         self.acronym,
      status:          SystemStatus::from_code(self.status).map_err(Error::Core)?,
      owner_email:     self.owner_email,
      custodian_email: self.custodian_email,
      description:     self.description,
    })
  }
}
