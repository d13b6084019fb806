//! Encoding and decoding helpers between Rust domain types and the
//! plain-text representations stored in SQLite columns.
//!
//! All timestamps are stored as RFC 3339 strings (which compare
//! lexicographically in the same order as the instants they name). UUIDs
//! are stored as hyphenated lowercase strings.

use chrono::{DateTime, Utc};
use roster_core::{
  Error, Result,
  principal::Principal,
  role::Role,
};
use uuid::Uuid;

// ─── Uuid ─────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> {
  Uuid::parse_str(s).map_err(Error::storage)
}

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(Error::storage)
}

// ─── Row buffers ─────────────────────────────────────────────────────────────

/// A `principals` row as read straight out of SQLite, before decoding.
#[derive(Debug)]
pub struct RawPrincipal {
  pub principal_id: String,
  pub handle:       Option<String>,
  pub full_name:    Option<String>,
  pub avatar_ref:   Option<String>,
  pub bio:          Option<String>,
  pub location:     Option<String>,
  pub website:      Option<String>,
  pub created_at:   String,
  pub updated_at:   String,
}

impl RawPrincipal {
  /// Column order: principal_id, handle, full_name, avatar_ref, bio,
  /// location, website, created_at, updated_at.
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(RawPrincipal {
      principal_id: row.get(0)?,
      handle:       row.get(1)?,
      full_name:    row.get(2)?,
      avatar_ref:   row.get(3)?,
      bio:          row.get(4)?,
      location:     row.get(5)?,
      website:      row.get(6)?,
      created_at:   row.get(7)?,
      updated_at:   row.get(8)?,
    })
  }

  pub fn into_principal(self) -> Result<Principal> {
    Ok(Principal {
      principal_id: decode_uuid(&self.principal_id)?,
      handle:       self.handle,
      full_name:    self.full_name,
      avatar_ref:   self.avatar_ref,
      bio:          self.bio,
      location:     self.location,
      website:      self.website,
      created_at:   decode_dt(&self.created_at)?,
      updated_at:   decode_dt(&self.updated_at)?,
    })
  }
}

/// A `roles` row as read straight out of SQLite, before decoding.
#[derive(Debug)]
pub struct RawRole {
  pub role_id:    String,
  pub name:       String,
  pub created_at: String,
}

impl RawRole {
  /// Column order: role_id, name, created_at.
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(RawRole {
      role_id:    row.get(0)?,
      name:       row.get(1)?,
      created_at: row.get(2)?,
    })
  }

  pub fn into_role(self) -> Result<Role> {
    Ok(Role {
      role_id:    decode_uuid(&self.role_id)?,
      name:       self.name,
      created_at: decode_dt(&self.created_at)?,
    })
  }
}
