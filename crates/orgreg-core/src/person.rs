//! Person records — the registry's central entity.
//!
//! A person record mirrors one account in the external identity directory,
//! enriched with organisational scalars and three semi-structured attribute
//! bags (directory-sourced, organisation-derived, HR-sourced).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use strum::Display;
use uuid::Uuid;

use crate::{Error, Result};

// ─── Choice enumerations ─────────────────────────────────────────────────────

/// Employment basis of the account holder. The numeric code is what the
/// relational store and the HR feed carry; the display label is what reports
/// show.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(rename_all = "snake_case")]
pub enum AccountType {
  #[strum(serialize = "Dept fixed-term contract")]
  FixedTermContract,
  #[strum(serialize = "N/A")]
  NotApplicable,
  #[strum(serialize = "Permanent")]
  Permanent,
  #[strum(serialize = "Recruitment agency contract")]
  AgencyContract,
  #[strum(serialize = "Resigned")]
  Resigned,
  #[strum(serialize = "Shared account")]
  SharedAccount,
  #[strum(serialize = "Vendor")]
  Vendor,
  #[strum(serialize = "Volunteer")]
  Volunteer,
}

impl AccountType {
  /// The numeric code stored in the `account_type` column.
  pub fn code(self) -> i64 {
    match self {
      Self::FixedTermContract => 0,
      Self::NotApplicable => 1,
      Self::Permanent => 2,
      Self::AgencyContract => 3,
      Self::Resigned => 4,
      Self::SharedAccount => 5,
      Self::Vendor => 6,
      Self::Volunteer => 7,
    }
  }

  pub fn from_code(code: i64) -> Result<Self> {
    match code {
      0 => Ok(Self::FixedTermContract),
      1 => Ok(Self::NotApplicable),
      2 => Ok(Self::Permanent),
      3 => Ok(Self::AgencyContract),
      4 => Ok(Self::Resigned),
      5 => Ok(Self::SharedAccount),
      6 => Ok(Self::Vendor),
      7 => Ok(Self::Volunteer),
      other => Err(Error::UnknownAccountType(other)),
    }
  }
}

/// Working arrangement of the position a person occupies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(rename_all = "snake_case")]
pub enum PositionType {
  #[strum(serialize = "Full time")]
  FullTime,
  #[strum(serialize = "Part time")]
  PartTime,
  #[strum(serialize = "Casual")]
  Casual,
  #[strum(serialize = "Other")]
  Other,
}

impl PositionType {
  pub fn code(self) -> i64 {
    match self {
      Self::FullTime => 0,
      Self::PartTime => 1,
      Self::Casual => 2,
      Self::Other => 3,
    }
  }

  pub fn from_code(code: i64) -> Result<Self> {
    match code {
      0 => Ok(Self::FullTime),
      1 => Ok(Self::PartTime),
      2 => Ok(Self::Casual),
      3 => Ok(Self::Other),
      other => Err(Error::UnknownPositionType(other)),
    }
  }
}

// ─── Person ──────────────────────────────────────────────────────────────────

/// One staff member in the registry.
///
/// At most one active, non-deleted record should exist per `directory_guid`,
/// but the store does not enforce this: identity drifts across email, GUID
/// and distinguished name over time, which is why resolution tries three
/// keys in order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Person {
  pub id:                  Uuid,
  pub created_at:          DateTime<Utc>,
  pub updated_at:          DateTime<Utc>,

  // Identity keys.
  pub email:               String,
  pub username:            String,
  pub directory_guid:      String,
  pub distinguished_name:  String,
  /// HR employee number. Nullable and NOT guaranteed unique.
  pub employee_id:         Option<String>,

  // Names and contact details (user-curated once populated).
  pub name:                String,
  pub given_name:          Option<String>,
  pub surname:             Option<String>,
  pub title:               Option<String>,
  pub preferred_name:      Option<String>,
  pub telephone:           Option<String>,
  pub mobile_phone:        Option<String>,
  pub other_phone:         Option<String>,

  // Organisational scalars.
  pub cost_centre:         Option<String>,
  pub org_unit:            Option<String>,
  /// Direct manager ("reports to").
  pub manager_id:          Option<Uuid>,
  pub account_type:        Option<AccountType>,
  pub position_type:       Option<PositionType>,

  // Directory lifecycle.
  pub active:              bool,
  pub directory_deleted:   bool,
  /// True when the record's fields were last set from the directory feed.
  pub directory_synced:    bool,
  pub expiry_date:         Option<DateTime<Utc>>,
  pub last_directory_sync: Option<DateTime<Utc>>,

  // Attribute bags.
  pub directory_data:      Option<Value>,
  pub org_data:            Option<Value>,
  pub hr_data:             Option<Value>,
}

impl Person {
  /// A blank record keyed by the external directory identifier, ready to be
  /// populated by the upsert merge. Timestamps are set by the store on
  /// creation.
  pub fn new(directory_guid: impl Into<String>) -> Self {
    Self {
      id:                  Uuid::new_v4(),
      created_at:          DateTime::<Utc>::MIN_UTC,
      updated_at:          DateTime::<Utc>::MIN_UTC,
      email:               String::new(),
      username:            String::new(),
      directory_guid:      directory_guid.into(),
      distinguished_name:  String::new(),
      employee_id:         None,
      name:                String::new(),
      given_name:          None,
      surname:             None,
      title:               None,
      preferred_name:      None,
      telephone:           None,
      mobile_phone:        None,
      other_phone:         None,
      cost_centre:         None,
      org_unit:            None,
      manager_id:          None,
      account_type:        None,
      position_type:       None,
      active:              true,
      directory_deleted:   false,
      directory_synced:    false,
      expiry_date:         None,
      last_directory_sync: None,
      directory_data:      None,
      org_data:            None,
      hr_data:             None,
    }
  }

  /// Normalise and set the HR employee number: `"n/a"` (any case) becomes
  /// null, purely numeric values are zero-padded to six digits, anything
  /// else is stored verbatim.
  pub fn set_employee_id(&mut self, raw: Option<&str>) {
    self.employee_id = raw.and_then(normalise_employee_id);
  }
}

/// See [`Person::set_employee_id`].
pub fn normalise_employee_id(raw: &str) -> Option<String> {
  let trimmed = raw.trim();
  if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("n/a") {
    return None;
  }
  match trimmed.parse::<u32>() {
    Ok(n) => Some(format!("{n:06}")),
    Err(_) => Some(trimmed.to_string()),
  }
}

// ─── DirectoryRecord ─────────────────────────────────────────────────────────

/// One change record from the identity directory feed.
///
/// Field names on the wire follow the directory's own conventions; unknown
/// keys are retained in `extra` so the record can be stored wholesale as the
/// person's directory attribute bag.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DirectoryRecord {
  #[serde(rename = "ObjectGUID")]
  pub object_guid:        String,
  #[serde(rename = "EmailAddress")]
  pub email:              String,
  #[serde(rename = "DistinguishedName")]
  pub distinguished_name: String,
  #[serde(rename = "SamAccountName")]
  pub sam_account_name:   String,
  #[serde(rename = "Name")]
  pub name:               String,
  #[serde(rename = "GivenName", default)]
  pub given_name:         Option<String>,
  #[serde(rename = "Surname", default)]
  pub surname:            Option<String>,
  #[serde(rename = "Title", default)]
  pub title:              Option<String>,
  #[serde(rename = "Enabled")]
  pub enabled:            bool,
  /// Set when the directory reports the identity removed.
  #[serde(rename = "Deleted", default)]
  pub deleted:            bool,
  #[serde(rename = "Modified")]
  pub modified:           DateTime<Utc>,
  #[serde(rename = "AccountExpirationDate", default)]
  pub account_expiry:     Option<DateTime<Utc>>,
  /// Any further directory attributes, kept verbatim.
  #[serde(flatten)]
  pub extra:              serde_json::Map<String, Value>,
}

impl DirectoryRecord {
  /// The full payload as a JSON object, for wholesale storage in the
  /// person's directory attribute bag.
  pub fn as_bag(&self) -> Result<Value> {
    Ok(serde_json::to_value(self)?)
  }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
