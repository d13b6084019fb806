//! SQL schema for the Roster SQLite store.
//!
//! Executed once at connection startup; idempotent thanks to
//! `CREATE TABLE IF NOT EXISTS`. Future migrations will be gated on
//! `PRAGMA user_version`.

use roster_core::role::{ADMIN_ROLE, DEFAULT_ROLE};

/// Role names inserted at bootstrap if absent. The rest of the system
/// assumes these exist: `user` is assigned to every fresh principal and
/// `admin` is what the authorization gate looks for.
pub const SEED_ROLES: &[&str] = &[DEFAULT_ROLE, ADMIN_ROLE];

/// Full schema DDL.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS principals (
    principal_id TEXT PRIMARY KEY,   -- assigned by the identity provider
    handle       TEXT UNIQUE,        -- nullable; unique only when set
    full_name    TEXT,
    avatar_ref   TEXT,               -- opaque object-store reference
    bio          TEXT,
    location     TEXT,
    website      TEXT,
    created_at   TEXT NOT NULL,      -- ISO 8601 UTC; store-assigned
    updated_at   TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS roles (
    role_id    TEXT PRIMARY KEY,
    name       TEXT NOT NULL UNIQUE, -- stored normalized: trimmed, lowercase
    created_at TEXT NOT NULL
);

-- The join relation. A pair can exist at most once; rows cascade away with
-- either parent.
CREATE TABLE IF NOT EXISTS role_assignments (
    principal_id TEXT NOT NULL REFERENCES principals(principal_id) ON DELETE CASCADE,
    role_id      TEXT NOT NULL REFERENCES roles(role_id) ON DELETE CASCADE,
    created_at   TEXT NOT NULL,
    PRIMARY KEY (principal_id, role_id)
);

CREATE INDEX IF NOT EXISTS role_assignments_role_idx ON role_assignments(role_id);
CREATE INDEX IF NOT EXISTS principals_created_idx    ON principals(created_at);

PRAGMA user_version = 1;
";
