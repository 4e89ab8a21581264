//! [`SqliteStore`] — the SQLite implementation of [`PersonStore`].

use std::path::Path;

use chrono::Utc;
use orgreg_core::{
  org::{CostCentre, ItSystem, Location, OrgUnit, SystemStatus},
  person::Person,
  store::{PersonQuery, PersonStore},
};
use rusqlite::OptionalExtension as _;
use uuid::Uuid;

use crate::{
  encode::{
    EncodedPerson, PERSON_COLUMNS, RawCostCentre, RawItSystem, RawLocation,
    RawOrgUnit, RawPerson, encode_person, encode_uuid,
  },
  schema::SCHEMA,
  Error, Result,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// An orgreg store backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Run a single-row person lookup. Lookups that can match more than one
  /// row resolve "first" deterministically: oldest creation timestamp, then
  /// lowest id.
  async fn find_person_where(
    &self,
    where_clause: &'static str,
    param: String,
  ) -> Result<Option<Person>> {
    let sql = format!(
      "SELECT {PERSON_COLUMNS} FROM people WHERE {where_clause} \
       ORDER BY created_at, id LIMIT 1"
    );

    let raw: Option<RawPerson> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(&sql, rusqlite::params![param], RawPerson::from_row)
            .optional()?,
        )
      })
      .await?;

    raw.map(RawPerson::into_person).transpose()
  }

  /// Insert or fully update one `people` row from pre-encoded values.
  /// Returns the number of affected rows.
  async fn write_person(&self, encoded: EncodedPerson, update: bool) -> Result<usize> {
    let affected: usize = self
      .conn
      .call(move |conn| {
        let sql = if update {
          "UPDATE people SET
             created_at = ?2, updated_at = ?3, email = ?4, username = ?5,
             directory_guid = ?6, distinguished_name = ?7, employee_id = ?8,
             name = ?9, given_name = ?10, surname = ?11, title = ?12,
             preferred_name = ?13, telephone = ?14, mobile_phone = ?15,
             other_phone = ?16, cost_centre = ?17, org_unit = ?18,
             manager_id = ?19, account_type = ?20, position_type = ?21,
             active = ?22, directory_deleted = ?23, directory_synced = ?24,
             expiry_date = ?25, last_directory_sync = ?26,
             directory_data = ?27, org_data = ?28, hr_data = ?29
           WHERE id = ?1"
        } else {
          "INSERT INTO people (
             id, created_at, updated_at, email, username, directory_guid,
             distinguished_name, employee_id, name, given_name, surname,
             title, preferred_name, telephone, mobile_phone, other_phone,
             cost_centre, org_unit, manager_id, account_type, position_type,
             active, directory_deleted, directory_synced, expiry_date,
             last_directory_sync, directory_data, org_data, hr_data
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13,
                     ?14, ?15, ?16, ?17, ?18, ?19, ?20, ?21, ?22, ?23, ?24,
                     ?25, ?26, ?27, ?28, ?29)"
        };

        let affected = conn.execute(
          sql,
          rusqlite::params![
            encoded.id,
            encoded.created_at,
            encoded.updated_at,
            encoded.email,
            encoded.username,
            encoded.directory_guid,
            encoded.distinguished_name,
            encoded.employee_id,
            encoded.name,
            encoded.given_name,
            encoded.surname,
            encoded.title,
            encoded.preferred_name,
            encoded.telephone,
            encoded.mobile_phone,
            encoded.other_phone,
            encoded.cost_centre,
            encoded.org_unit,
            encoded.manager_id,
            encoded.account_type,
            encoded.position_type,
            encoded.active,
            encoded.directory_deleted,
            encoded.directory_synced,
            encoded.expiry_date,
            encoded.last_directory_sync,
            encoded.directory_data,
            encoded.org_data,
            encoded.hr_data,
          ],
        )?;
        Ok(affected)
      })
      .await?;

    Ok(affected)
  }
}

// ─── PersonStore impl ────────────────────────────────────────────────────────

impl PersonStore for SqliteStore {
  type Error = Error;

  // ── People — writes ────────────────────────────────────────────────────────

  async fn create_person(&self, person: Person) -> Result<Person> {
    let now = Utc::now();
    let encoded = encode_person(&person, now, now);
    self.write_person(encoded, false).await?;

    Ok(Person { created_at: now, updated_at: now, ..person })
  }

  async fn update_person(&self, person: &Person) -> Result<Person> {
    let now = Utc::now();
    let encoded = encode_person(person, person.created_at, now);
    let affected = self.write_person(encoded, true).await?;
    if affected == 0 {
      return Err(Error::PersonNotFound(person.id));
    }

    Ok(Person { updated_at: now, ..person.clone() })
  }

  // ── People — keyed lookups ─────────────────────────────────────────────────

  async fn get_person(&self, id: Uuid) -> Result<Option<Person>> {
    self.find_person_where("id = ?1", encode_uuid(id)).await
  }

  async fn find_by_email(&self, email: &str) -> Result<Option<Person>> {
    self
      .find_person_where("email = ?1 COLLATE NOCASE", email.to_string())
      .await
  }

  async fn find_by_guid_suffix(&self, suffix: &str) -> Result<Option<Person>> {
    self
      .find_person_where("directory_guid LIKE ?1", format!("%{suffix}"))
      .await
  }

  async fn find_by_dn(&self, dn: &str) -> Result<Option<Person>> {
    self
      .find_person_where("distinguished_name = ?1", dn.to_string())
      .await
  }

  async fn find_by_employee_id(&self, employee_id: &str) -> Result<Vec<Person>> {
    let param = employee_id.to_string();

    let raws: Vec<RawPerson> = self
      .conn
      .call(move |conn| {
        let sql = format!(
          "SELECT {PERSON_COLUMNS} FROM people WHERE employee_id = ?1 \
           ORDER BY created_at, id"
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(rusqlite::params![param], RawPerson::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawPerson::into_person).collect()
  }

  async fn list_people(&self, query: &PersonQuery) -> Result<Vec<Person>> {
    // Build WHERE clause dynamically; filter values bind positionally.
    let mut conds: Vec<String> = vec![];
    let mut vals: Vec<String> = vec![];

    if !query.include_inactive {
      if let Some(deleted) = query.directory_deleted {
        conds.push(format!("directory_deleted = {}", i64::from(deleted)));
      } else {
        conds.push("active = 1".to_string());
        // Key filters are exclusive; the first one present wins.
        if let Some(email) = &query.email {
          vals.push(email.clone());
          conds.push(format!("email = ?{} COLLATE NOCASE", vals.len()));
        } else if let Some(suffix) = &query.guid_suffix {
          vals.push(format!("%{suffix}"));
          conds.push(format!("directory_guid LIKE ?{}", vals.len()));
        } else if let Some(code) = &query.cost_centre {
          vals.push(code.clone());
          conds.push(format!("cost_centre = ?{}", vals.len()));
        }
      }
    }

    let where_clause = if conds.is_empty() {
      String::new()
    } else {
      format!("WHERE {}", conds.join(" AND "))
    };

    let raws: Vec<RawPerson> = self
      .conn
      .call(move |conn| {
        let sql = format!(
          "SELECT {PERSON_COLUMNS} FROM people {where_clause} ORDER BY name"
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(
            rusqlite::params_from_iter(vals.iter()),
            RawPerson::from_row,
          )?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawPerson::into_person).collect()
  }

  // ── Organisational registers ───────────────────────────────────────────────

  async fn add_org_unit(&self, unit: OrgUnit) -> Result<OrgUnit> {
    let id_str = encode_uuid(unit.id);
    let name = unit.name.clone();
    let unit_type = unit.unit_type.code();
    let acronym = unit.acronym.clone();
    let manager_email = unit.manager_email.clone();

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO org_units (id, name, unit_type, acronym, manager_email)
           VALUES (?1, ?2, ?3, ?4, ?5)",
          rusqlite::params![id_str, name, unit_type, acronym, manager_email],
        )?;
        Ok(())
      })
      .await?;

    Ok(unit)
  }

  async fn list_org_units(&self) -> Result<Vec<OrgUnit>> {
    let raws: Vec<RawOrgUnit> = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(
          "SELECT id, name, unit_type, acronym, manager_email
           FROM org_units ORDER BY name",
        )?;
        let rows = stmt
          .query_map([], |row| {
            Ok(RawOrgUnit {
              id:            row.get(0)?,
              name:          row.get(1)?,
              unit_type:     row.get(2)?,
              acronym:       row.get(3)?,
              manager_email: row.get(4)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawOrgUnit::into_org_unit).collect()
  }

  async fn add_cost_centre(&self, centre: CostCentre) -> Result<CostCentre> {
    let id_str = encode_uuid(centre.id);
    let code = centre.code.clone();
    let name = centre.name.clone();
    let manager_email = centre.manager_email.clone();

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO cost_centres (id, code, name, manager_email)
           VALUES (?1, ?2, ?3, ?4)",
          rusqlite::params![id_str, code, name, manager_email],
        )?;
        Ok(())
      })
      .await?;

    Ok(centre)
  }

  async fn list_cost_centres(&self) -> Result<Vec<CostCentre>> {
    let raws: Vec<RawCostCentre> = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(
          "SELECT id, code, name, manager_email
           FROM cost_centres ORDER BY code",
        )?;
        let rows = stmt
          .query_map([], |row| {
            Ok(RawCostCentre {
              id:            row.get(0)?,
              code:          row.get(1)?,
              name:          row.get(2)?,
              manager_email: row.get(3)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawCostCentre::into_cost_centre).collect()
  }

  async fn add_location(&self, location: Location) -> Result<Location> {
    let id_str = encode_uuid(location.id);
    let name = location.name.clone();
    let address = location.address.clone();
    let phone = location.phone.clone();
    let fax = location.fax.clone();
    let manager_email = location.manager_email.clone();

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO locations (id, name, address, phone, fax, manager_email)
           VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
          rusqlite::params![id_str, name, address, phone, fax, manager_email],
        )?;
        Ok(())
      })
      .await?;

    Ok(location)
  }

  async fn list_locations(&self) -> Result<Vec<Location>> {
    let raws: Vec<RawLocation> = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(
          "SELECT id, name, address, phone, fax, manager_email
           FROM locations ORDER BY name",
        )?;
        let rows = stmt
          .query_map([], |row| {
            Ok(RawLocation {
              id:            row.get(0)?,
              name:          row.get(1)?,
              address:       row.get(2)?,
              phone:         row.get(3)?,
              fax:           row.get(4)?,
              manager_email: row.get(5)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawLocation::into_location).collect()
  }

  // ── IT-system register ─────────────────────────────────────────────────────

  async fn add_it_system(&self, system: ItSystem) -> Result<ItSystem> {
    let id_str = encode_uuid(system.id);
    let system_id = system.system_id.clone();
    let name = system.name.clone();
    let acronym = system.acronym.clone();
    let status = system.status.code();
    let owner_email = system.owner_email.clone();
    let custodian_email = system.custodian_email.clone();
    let description = system.description.clone();

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO it_systems (
             id, system_id, name, acronym, status, owner_email,
             custodian_email, description
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
          rusqlite::params![
            id_str,
            system_id,
            name,
            acronym,
            status,
            owner_email,
            custodian_email,
            description,
          ],
        )?;
        Ok(())
      })
      .await?;

    Ok(system)
  }

  async fn list_it_systems(
    &self,
    status: Option<SystemStatus>,
  ) -> Result<Vec<ItSystem>> {
    let status_code = status.map(SystemStatus::code);

    fn raw_system(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawItSystem> {
      Ok(RawItSystem {
        id:              row.get(0)?,
        system_id:       row.get(1)?,
        name:            row.get(2)?,
        acronym:         row.get(3)?,
        status:          row.get(4)?,
        owner_email:     row.get(5)?,
        custodian_email: row.get(6)?,
        description:     row.get(7)?,
      })
    }

    let raws: Vec<RawItSystem> = self
      .conn
      .call(move |conn| {
        let rows = if let Some(code) = status_code {
          let mut stmt = conn.prepare(
            "SELECT id, system_id, name, acronym, status, owner_email,
                    custodian_email, description
             FROM it_systems WHERE status = ?1 ORDER BY system_id",
          )?;
          stmt
            .query_map(rusqlite::params![code], raw_system)?
            .collect::<rusqlite::Result<Vec<_>>>()?
        } else {
          let mut stmt = conn.prepare(
            "SELECT id, system_id, name, acronym, status, owner_email,
                    custodian_email, description
             FROM it_systems ORDER BY system_id",
          )?;
          stmt
            .query_map([], raw_system)?
            .collect::<rusqlite::Result<Vec<_>>>()?
        };
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawItSystem::into_it_system).collect()
  }
}
