//! [`SqliteStore`] — the SQLite implementation of [`RoleStore`] and
//! [`ProfileStore`].

use std::{
  collections::{BTreeSet, HashMap},
  path::Path,
};

use chrono::{DateTime, Utc};
use rusqlite::OptionalExtension as _;
use uuid::Uuid;

use roster_core::{
  Error, Result,
  principal::{Profile, ProfileUpdate},
  role::{DEFAULT_ROLE, Role, RoleWithCount, normalize_role_name},
  search::matches_query,
  store::{ProfileStore, RoleStore},
};

use crate::{
  encode::{RawPrincipal, RawRole, decode_uuid, encode_dt, encode_uuid},
  error::{is_fk_violation, is_unique_violation, storage},
  schema::{SCHEMA, SEED_ROLES},
};

const PRINCIPAL_COLUMNS: &str = "principal_id, handle, full_name, avatar_ref, \
                                 bio, location, website, created_at, updated_at";

// ─── Store ───────────────────────────────────────────────────────────────────

/// A Roster directory store backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path`, run schema initialisation, and
  /// insert the seed roles if absent.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path)
      .await
      .map_err(storage)?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory()
      .await
      .map_err(storage)?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    let seeds: Vec<(String, String, String)> = SEED_ROLES
      .iter()
      .map(|name| {
        (
          encode_uuid(Uuid::new_v4()),
          (*name).to_owned(),
          encode_dt(Utc::now()),
        )
      })
      .collect();

    self
      .conn
      .call(move |conn| {
        conn.execute_batch(SCHEMA)?;
        for (role_id, name, created_at) in &seeds {
          // Keyed on the UNIQUE(name) constraint; reopening a store never
          // duplicates or replaces the seed rows.
          conn.execute(
            "INSERT OR IGNORE INTO roles (role_id, name, created_at)
             VALUES (?1, ?2, ?3)",
            rusqlite::params![role_id, name, created_at],
          )?;
        }
        Ok(())
      })
      .await
      .map_err(storage)
  }
}

// ─── RoleStore impl ──────────────────────────────────────────────────────────

impl RoleStore for SqliteStore {
  async fn list_roles(&self) -> Result<Vec<Role>> {
    let raws: Vec<RawRole> = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(
          "SELECT role_id, name, created_at FROM roles
           ORDER BY created_at DESC, name ASC",
        )?;
        let rows = stmt
          .query_map([], RawRole::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await
      .map_err(storage)?;

    raws.into_iter().map(RawRole::into_role).collect()
  }

  async fn create_role(&self, name: &str) -> Result<Role> {
    let role = Role {
      role_id:    Uuid::new_v4(),
      name:       normalize_role_name(name)?,
      created_at: Utc::now(),
    };

    let id_str   = encode_uuid(role.role_id);
    let name_str = role.name.clone();
    let at_str   = encode_dt(role.created_at);

    let inserted = self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO roles (role_id, name, created_at) VALUES (?1, ?2, ?3)",
          rusqlite::params![id_str, name_str, at_str],
        )?;
        Ok(())
      })
      .await;

    match inserted {
      Ok(()) => Ok(role),
      Err(e) if is_unique_violation(&e) => {
        Err(Error::DuplicateRoleName(role.name))
      }
      Err(e) => Err(storage(e)),
    }
  }

  async fn roles_for_principal(&self, principal_id: Uuid) -> Result<Vec<Role>> {
    let id_str = encode_uuid(principal_id);

    let raws: Vec<RawRole> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT r.role_id, r.name, r.created_at
           FROM roles r
           JOIN role_assignments a ON a.role_id = r.role_id
           WHERE a.principal_id = ?1
           ORDER BY r.name ASC",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![id_str], RawRole::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await
      .map_err(storage)?;

    raws.into_iter().map(RawRole::into_role).collect()
  }

  async fn replace_role_assignments(
    &self,
    principal_id: Uuid,
    role_ids: &[Uuid],
  ) -> Result<()> {
    let id_str = encode_uuid(principal_id);
    let at_str = encode_dt(Utc::now());
    // Collapse duplicates; callers supply a set.
    let role_strs: Vec<String> = role_ids
      .iter()
      .copied()
      .collect::<BTreeSet<_>>()
      .into_iter()
      .map(encode_uuid)
      .collect();

    let outcome = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;

        let exists = tx
          .query_row(
            "SELECT 1 FROM principals WHERE principal_id = ?1",
            rusqlite::params![id_str],
            |_| Ok(true),
          )
          .optional()?
          .unwrap_or(false);
        if !exists {
          return Ok(ReplaceOutcome::NoPrincipal);
        }

        tx.execute(
          "DELETE FROM role_assignments WHERE principal_id = ?1",
          rusqlite::params![id_str],
        )?;

        for role_str in &role_strs {
          let inserted = tx.execute(
            "INSERT INTO role_assignments (principal_id, role_id, created_at)
             VALUES (?1, ?2, ?3)",
            rusqlite::params![id_str, role_str, at_str],
          );
          match inserted {
            Ok(_) => {}
            // Unknown role id. Dropping the transaction rolls everything
            // back, including the DELETE above.
            Err(e) if is_fk_violation(&e) => {
              return Ok(ReplaceOutcome::UnknownRole(role_str.clone()));
            }
            Err(e) => return Err(e.into()),
          }
        }

        tx.commit()?;
        Ok(ReplaceOutcome::Done)
      })
      .await
      .map_err(storage)?;

    match outcome {
      ReplaceOutcome::Done => Ok(()),
      ReplaceOutcome::NoPrincipal => Err(Error::PrincipalNotFound(principal_id)),
      ReplaceOutcome::UnknownRole(role_str) => {
        Err(Error::RoleNotFound(decode_uuid(&role_str)?))
      }
    }
  }

  async fn count_principals_for_role(&self, role_id: Uuid) -> Result<u64> {
    let id_str = encode_uuid(role_id);

    let count: i64 = self
      .conn
      .call(move |conn| {
        Ok(conn.query_row(
          "SELECT COUNT(*) FROM role_assignments WHERE role_id = ?1",
          rusqlite::params![id_str],
          |row| row.get(0),
        )?)
      })
      .await
      .map_err(storage)?;

    Ok(count as u64)
  }

  async fn list_roles_with_counts(&self) -> Result<Vec<RoleWithCount>> {
    let raws: Vec<(RawRole, i64)> = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(
          "SELECT r.role_id, r.name, r.created_at, COUNT(a.principal_id)
           FROM roles r
           LEFT JOIN role_assignments a ON a.role_id = r.role_id
           GROUP BY r.role_id, r.name, r.created_at
           ORDER BY r.created_at DESC, r.name ASC",
        )?;
        let rows = stmt
          .query_map([], |row| Ok((RawRole::from_row(row)?, row.get(3)?)))?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await
      .map_err(storage)?;

    raws
      .into_iter()
      .map(|(raw, count)| {
        Ok(RoleWithCount { role: raw.into_role()?, principals: count as u64 })
      })
      .collect()
  }

  async fn count_roles(&self) -> Result<u64> {
    let count: i64 = self
      .conn
      .call(|conn| {
        Ok(conn.query_row("SELECT COUNT(*) FROM roles", [], |row| row.get(0))?)
      })
      .await
      .map_err(storage)?;

    Ok(count as u64)
  }
}

// ─── ProfileStore impl ───────────────────────────────────────────────────────

impl ProfileStore for SqliteStore {
  async fn get_profile(&self, principal_id: Uuid) -> Result<Option<Profile>> {
    let id_str = encode_uuid(principal_id);

    let raw: Option<(RawPrincipal, Vec<RawRole>)> = self
      .conn
      .call(move |conn| {
        let principal = conn
          .query_row(
            &format!(
              "SELECT {PRINCIPAL_COLUMNS} FROM principals WHERE principal_id = ?1"
            ),
            rusqlite::params![id_str],
            RawPrincipal::from_row,
          )
          .optional()?;
        let Some(principal) = principal else {
          return Ok(None);
        };

        let mut stmt = conn.prepare(
          "SELECT r.role_id, r.name, r.created_at
           FROM roles r
           JOIN role_assignments a ON a.role_id = r.role_id
           WHERE a.principal_id = ?1
           ORDER BY r.name ASC",
        )?;
        let roles = stmt
          .query_map(rusqlite::params![id_str], RawRole::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(Some((principal, roles)))
      })
      .await
      .map_err(storage)?;

    raw
      .map(|(principal, roles)| {
        Ok(Profile {
          principal: principal.into_principal()?,
          roles:     roles
            .into_iter()
            .map(RawRole::into_role)
            .collect::<Result<_>>()?,
        })
      })
      .transpose()
  }

  async fn update_profile(
    &self,
    principal_id: Uuid,
    update: ProfileUpdate,
  ) -> Result<Profile> {
    let id_str = encode_uuid(principal_id);
    let at_str = encode_dt(Utc::now());
    // Kept for the error message; the store sees only the trimmed value.
    let attempted_handle = update
      .handle
      .clone()
      .flatten()
      .map(|h| h.trim().to_owned());

    let result = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;

        let row = tx
          .query_row(
            &format!(
              "SELECT {PRINCIPAL_COLUMNS} FROM principals WHERE principal_id = ?1"
            ),
            rusqlite::params![id_str],
            RawPrincipal::from_row,
          )
          .optional()?;
        let Some(mut row) = row else {
          return Ok(UpdateOutcome::NoPrincipal);
        };

        apply_update(&mut row, &update);

        tx.execute(
          "UPDATE principals
           SET handle = ?2, full_name = ?3, avatar_ref = ?4, bio = ?5,
               location = ?6, website = ?7, updated_at = ?8
           WHERE principal_id = ?1",
          rusqlite::params![
            id_str,
            row.handle,
            row.full_name,
            row.avatar_ref,
            row.bio,
            row.location,
            row.website,
            at_str,
          ],
        )?;

        tx.commit()?;
        Ok(UpdateOutcome::Done)
      })
      .await;

    match result {
      Ok(UpdateOutcome::Done) => {}
      Ok(UpdateOutcome::NoPrincipal) => {
        return Err(Error::PrincipalNotFound(principal_id));
      }
      Err(e) if is_unique_violation(&e) => {
        return Err(Error::HandleTaken(attempted_handle.unwrap_or_default()));
      }
      Err(e) => return Err(storage(e)),
    }

    self
      .get_profile(principal_id)
      .await?
      .ok_or(Error::PrincipalNotFound(principal_id))
  }

  async fn list_principals(&self) -> Result<Vec<Profile>> {
    let (principals, pairs): (Vec<RawPrincipal>, Vec<(String, RawRole)>) = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {PRINCIPAL_COLUMNS} FROM principals
           ORDER BY created_at DESC, principal_id ASC"
        ))?;
        let principals = stmt
          .query_map([], RawPrincipal::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;

        let mut stmt = conn.prepare(
          "SELECT a.principal_id, r.role_id, r.name, r.created_at
           FROM role_assignments a
           JOIN roles r ON r.role_id = a.role_id
           ORDER BY r.name ASC",
        )?;
        let pairs = stmt
          .query_map([], |row| {
            Ok((
              row.get(0)?,
              RawRole {
                role_id:    row.get(1)?,
                name:       row.get(2)?,
                created_at: row.get(3)?,
              },
            ))
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok((principals, pairs))
      })
      .await
      .map_err(storage)?;

    let mut roles_by_principal: HashMap<String, Vec<RawRole>> = HashMap::new();
    for (principal_id, role) in pairs {
      roles_by_principal.entry(principal_id).or_default().push(role);
    }

    principals
      .into_iter()
      .map(|raw| {
        let roles = roles_by_principal
          .remove(&raw.principal_id)
          .unwrap_or_default();
        Ok(Profile {
          principal: raw.into_principal()?,
          roles:     roles
            .into_iter()
            .map(RawRole::into_role)
            .collect::<Result<_>>()?,
        })
      })
      .collect()
  }

  async fn search_principals(&self, query: &str) -> Result<Vec<Profile>> {
    // In-process scan-and-filter; fine at this system's scale.
    let mut profiles = self.list_principals().await?;
    profiles.retain(|profile| matches_query(profile, query));
    Ok(profiles)
  }

  async fn ensure_principal(&self, principal_id: Uuid) -> Result<Profile> {
    let id_str = encode_uuid(principal_id);
    let at_str = encode_dt(Utc::now());

    self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;

        let inserted = tx.execute(
          "INSERT OR IGNORE INTO principals (principal_id, created_at, updated_at)
           VALUES (?1, ?2, ?3)",
          rusqlite::params![id_str, at_str, at_str],
        )?;

        // The default role is assigned only on first creation; an existing
        // principal whose roles an administrator has since edited (possibly
        // to nothing) is left alone.
        if inserted > 0 {
          let default_role: Option<String> = tx
            .query_row(
              "SELECT role_id FROM roles WHERE name = ?1",
              rusqlite::params![DEFAULT_ROLE],
              |row| row.get(0),
            )
            .optional()?;
          if let Some(role_str) = default_role {
            tx.execute(
              "INSERT OR IGNORE INTO role_assignments
                 (principal_id, role_id, created_at)
               VALUES (?1, ?2, ?3)",
              rusqlite::params![id_str, role_str, at_str],
            )?;
          }
        }

        tx.commit()?;
        Ok(())
      })
      .await
      .map_err(storage)?;

    self
      .get_profile(principal_id)
      .await?
      .ok_or(Error::PrincipalNotFound(principal_id))
  }

  async fn count_principals(&self) -> Result<u64> {
    let count: i64 = self
      .conn
      .call(|conn| {
        Ok(conn.query_row("SELECT COUNT(*) FROM principals", [], |row| {
          row.get(0)
        })?)
      })
      .await
      .map_err(storage)?;

    Ok(count as u64)
  }

  async fn count_principals_since(&self, since: DateTime<Utc>) -> Result<u64> {
    let since_str = encode_dt(since);

    let count: i64 = self
      .conn
      .call(move |conn| {
        Ok(conn.query_row(
          "SELECT COUNT(*) FROM principals WHERE created_at >= ?1",
          rusqlite::params![since_str],
          |row| row.get(0),
        )?)
      })
      .await
      .map_err(storage)?;

    Ok(count as u64)
  }
}

// ─── Helpers ─────────────────────────────────────────────────────────────────

enum ReplaceOutcome {
  Done,
  NoPrincipal,
  UnknownRole(String),
}

enum UpdateOutcome {
  Done,
  NoPrincipal,
}

/// Merge a partial update into a freshly read row. Text fields are trimmed
/// and an empty result clears the column (so setting a handle to `""`
/// behaves like an explicit clear); the avatar reference is stored verbatim.
fn apply_update(row: &mut RawPrincipal, update: &ProfileUpdate) {
  fn cleaned(value: &Option<String>) -> Option<String> {
    value
      .as_deref()
      .map(str::trim)
      .filter(|s| !s.is_empty())
      .map(str::to_owned)
  }

  if let Some(handle) = &update.handle {
    row.handle = cleaned(handle);
  }
  if let Some(full_name) = &update.full_name {
    row.full_name = cleaned(full_name);
  }
  if let Some(avatar_ref) = &update.avatar_ref {
    row.avatar_ref = avatar_ref.clone();
  }
  if let Some(bio) = &update.bio {
    row.bio = cleaned(bio);
  }
  if let Some(location) = &update.location {
    row.location = cleaned(location);
  }
  if let Some(website) = &update.website {
    row.website = cleaned(website);
  }
}
