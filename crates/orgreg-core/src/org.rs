//! Organisational register entities: org units, cost centres, locations and
//! the IT-system register.
//!
//! These are flat list entities. They feed option lists in the admin API and
//! CSV exports; the person record carries denormalised scalars rather than
//! foreign keys, so no tree or join operations exist here.

use serde::{Deserialize, Serialize};
use strum::Display;
use uuid::Uuid;

use crate::{Error, Result};

// ─── Org units ───────────────────────────────────────────────────────────────

/// Position of a unit in the organisational hierarchy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(rename_all = "snake_case")]
pub enum UnitType {
  #[strum(serialize = "Department")]
  Department,
  #[strum(serialize = "Division")]
  Division,
  #[strum(serialize = "Branch")]
  Branch,
  #[strum(serialize = "Region")]
  Region,
  #[strum(serialize = "Unit")]
  Unit,
  #[strum(serialize = "Office")]
  Office,
  #[strum(serialize = "District")]
  District,
  #[strum(serialize = "Section")]
  Section,
}

impl UnitType {
  pub fn code(self) -> i64 {
    match self {
      Self::Department => 0,
      Self::Division => 1,
      Self::Branch => 2,
      Self::Region => 3,
      Self::Unit => 4,
      Self::Office => 5,
      Self::District => 6,
      Self::Section => 7,
    }
  }

  pub fn from_code(code: i64) -> Result<Self> {
    match code {
      0 => Ok(Self::Department),
      1 => Ok(Self::Division),
      2 => Ok(Self::Branch),
      3 => Ok(Self::Region),
      4 => Ok(Self::Unit),
      5 => Ok(Self::Office),
      6 => Ok(Self::District),
      7 => Ok(Self::Section),
      other => Err(Error::UnknownUnitType(other)),
    }
  }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrgUnit {
  pub id:            Uuid,
  pub name:          String,
  pub unit_type:     UnitType,
  pub acronym:       Option<String>,
  pub manager_email: Option<String>,
}

// ─── Cost centres ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CostCentre {
  pub id:            Uuid,
  /// Numeric-looking code, rendered as `CC<code>` in option lists.
  pub code:          String,
  pub name:          String,
  pub manager_email: Option<String>,
}

// ─── Locations ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Location {
  pub id:            Uuid,
  pub name:          String,
  pub address:       Option<String>,
  pub phone:         Option<String>,
  pub fax:           Option<String>,
  pub manager_email: Option<String>,
}

// ─── IT-system register ──────────────────────────────────────────────────────

/// Operational status of a registered IT system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(rename_all = "snake_case")]
pub enum SystemStatus {
  #[strum(serialize = "Production")]
  Production,
  #[strum(serialize = "Development")]
  Development,
  #[strum(serialize = "Production (Legacy)")]
  ProductionLegacy,
  #[strum(serialize = "Decommissioned")]
  Decommissioned,
  #[strum(serialize = "Unknown")]
  Unknown,
}

impl SystemStatus {
  pub fn code(self) -> i64 {
    match self {
      Self::Production => 0,
      Self::Development => 1,
      Self::ProductionLegacy => 2,
      Self::Decommissioned => 3,
      Self::Unknown => 4,
    }
  }

  pub fn from_code(code: i64) -> Result<Self> {
    match code {
      0 => Ok(Self::Production),
      1 => Ok(Self::Development),
      2 => Ok(Self::ProductionLegacy),
      3 => Ok(Self::Decommissioned),
      4 => Ok(Self::Unknown),
      other => Err(Error::UnknownSystemStatus(other)),
    }
  }
}

/// A named system providing a package of functionality to staff, tracked in
/// the register with its business contacts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItSystem {
  pub id:              Uuid,
  pub system_id:       String,
  pub name:            String,
  pub acronym:         Option<String>,
  pub status:          SystemStatus,
  pub owner_email:     Option<String>,
  pub custodian_email: Option<String>,
  pub description:     Option<String>,
}
