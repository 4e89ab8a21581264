//! SQL schema for the orgreg SQLite store.
//!
//! Executed once at connection startup via `PRAGMA user_version`. Future
//! migrations will be gated on that version number.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS people (
    id                  TEXT PRIMARY KEY,
    created_at          TEXT NOT NULL,   -- ISO 8601 UTC; store-assigned
    updated_at          TEXT NOT NULL,
    email               TEXT NOT NULL UNIQUE,
    username            TEXT NOT NULL UNIQUE,
    directory_guid      TEXT NOT NULL UNIQUE,
    distinguished_name  TEXT NOT NULL,
    employee_id         TEXT,            -- HR number; NOT unique
    name                TEXT NOT NULL,
    given_name          TEXT,
    surname             TEXT,
    title               TEXT,
    preferred_name      TEXT,
    telephone           TEXT,
    mobile_phone        TEXT,
    other_phone         TEXT,
    cost_centre         TEXT,
    org_unit            TEXT,
    manager_id          TEXT,
    account_type        INTEGER,         -- AccountType code
    position_type       INTEGER,         -- PositionType code
    active              INTEGER NOT NULL DEFAULT 1,
    directory_deleted   INTEGER NOT NULL DEFAULT 0,
    directory_synced    INTEGER NOT NULL DEFAULT 0,
    expiry_date         TEXT,
    last_directory_sync TEXT,
    directory_data      TEXT,            -- JSON attribute bags
    org_data            TEXT,
    hr_data             TEXT
);

CREATE INDEX IF NOT EXISTS people_email_idx    ON people(email COLLATE NOCASE);
CREATE INDEX IF NOT EXISTS people_employee_idx ON people(employee_id);
CREATE INDEX IF NOT EXISTS people_name_idx     ON people(name);

CREATE TABLE IF NOT EXISTS org_units (
    id            TEXT PRIMARY KEY,
    name          TEXT NOT NULL,
    unit_type     INTEGER NOT NULL,      -- UnitType code
    acronym       TEXT,
    manager_email TEXT
);

CREATE TABLE IF NOT EXISTS cost_centres (
    id            TEXT PRIMARY KEY,
    code          TEXT NOT NULL UNIQUE,
    name          TEXT NOT NULL,
    manager_email TEXT
);

CREATE TABLE IF NOT EXISTS locations (
    id            TEXT PRIMARY KEY,
    name          TEXT NOT NULL,
    address       TEXT,
    phone         TEXT,
    fax           TEXT,
    manager_email TEXT
);

CREATE TABLE IF NOT EXISTS it_systems (
    id              TEXT PRIMARY KEY,
    system_id       TEXT NOT NULL UNIQUE,
    name            TEXT NOT NULL UNIQUE,
    acronym         TEXT,
    status          INTEGER NOT NULL,    -- SystemStatus code
    owner_email     TEXT,
    custodian_email TEXT,
    description     TEXT
);

PRAGMA user_version = 1;
";
