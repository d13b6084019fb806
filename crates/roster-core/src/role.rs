//! Role and role-assignment records.
//!
//! Roles are append-only in practice: they are created by administrators and
//! never updated or deleted through this crate. A small seed set (`user`,
//! `admin`) is expected to exist from store bootstrap onwards.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Error, Result};

/// Name of the role that grants administrative access.
pub const ADMIN_ROLE: &str = "admin";

/// Name of the role assigned to every freshly bootstrapped principal.
pub const DEFAULT_ROLE: &str = "user";

/// A named permission category. `name` is unique and stored normalized
/// (see [`normalize_role_name`]).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Role {
  pub role_id:    Uuid,
  pub name:       String,
  pub created_at: DateTime<Utc>,
}

/// The join record linking one principal to one role. The pair
/// `(principal_id, role_id)` is unique; the record has no meaning without
/// both endpoints and cascades away with either.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleAssignment {
  pub principal_id: Uuid,
  pub role_id:      Uuid,
  pub created_at:   DateTime<Utc>,
}

/// A role bundled with the number of principals currently holding it.
/// Display data only — never used for authorization decisions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleWithCount {
  #[serde(flatten)]
  pub role:       Role,
  pub principals: u64,
}

/// Normalize a role name at the store boundary: trim surrounding whitespace
/// and lowercase. Two names differing only by case therefore collide on the
/// uniqueness constraint instead of coexisting.
pub fn normalize_role_name(raw: &str) -> Result<String> {
  let name = raw.trim().to_lowercase();
  if name.is_empty() {
    return Err(Error::InvalidRoleName(raw.to_owned()));
  }
  Ok(name)
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn normalize_trims_and_lowercases() {
    assert_eq!(normalize_role_name("  Admin ").unwrap(), "admin");
    assert_eq!(normalize_role_name("editor").unwrap(), "editor");
  }

  #[test]
  fn normalize_rejects_empty() {
    assert!(matches!(
      normalize_role_name("   "),
      Err(Error::InvalidRoleName(_))
    ));
  }
}
