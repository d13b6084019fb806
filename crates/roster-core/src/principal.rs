//! Principal — a registered user account and its mutable display attributes.
//!
//! The identifier is assigned by the external identity provider; this crate
//! never mints principal ids. Rows are created by the bootstrap path
//! ([`crate::store::ProfileStore::ensure_principal`]) and never hard-deleted
//! here — deletion cascades from identity removal, which is owned externally.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::role::Role;

/// A registered user account. All attributes except the id and the
/// timestamps are optional; `handle` is globally unique when set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Principal {
  pub principal_id: Uuid,
  pub handle:       Option<String>,
  pub full_name:    Option<String>,
  /// Opaque reference (URL) into the external object store; only the
  /// reference string lives here, never image bytes.
  pub avatar_ref:   Option<String>,
  pub bio:          Option<String>,
  pub location:     Option<String>,
  pub website:      Option<String>,
  pub created_at:   DateTime<Utc>,
  pub updated_at:   DateTime<Utc>,
}

impl Principal {
  /// Best display label: full name, then handle, then a fixed fallback.
  pub fn display_name(&self) -> &str {
    self
      .full_name
      .as_deref()
      .or(self.handle.as_deref())
      .unwrap_or("unknown")
  }
}

/// A principal joined with its currently assigned roles — the read model
/// every listing and search returns. The join is read-only; role mutation
/// goes through [`crate::store::RoleStore::replace_role_assignments`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
  pub principal: Principal,
  /// Sorted by role name; empty is a valid state (the bootstrap trigger may
  /// not have run yet).
  pub roles:     Vec<Role>,
}

/// Partial update for a principal's mutable attributes.
///
/// Each field is `None` to leave the stored value untouched, `Some(None)` to
/// clear it, or `Some(Some(v))` to set it. The store trims `handle` and
/// treats an empty result as a clear.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProfileUpdate {
  pub handle:     Option<Option<String>>,
  pub full_name:  Option<Option<String>>,
  pub avatar_ref: Option<Option<String>>,
  pub bio:        Option<Option<String>>,
  pub location:   Option<Option<String>>,
  pub website:    Option<Option<String>>,
}

impl ProfileUpdate {
  /// True if no field would change.
  pub fn is_empty(&self) -> bool {
    self.handle.is_none()
      && self.full_name.is_none()
      && self.avatar_ref.is_none()
      && self.bio.is_none()
      && self.location.is_none()
      && self.website.is_none()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn principal(handle: Option<&str>, full_name: Option<&str>) -> Principal {
    Principal {
      principal_id: Uuid::new_v4(),
      handle:       handle.map(str::to_owned),
      full_name:    full_name.map(str::to_owned),
      avatar_ref:   None,
      bio:          None,
      location:     None,
      website:      None,
      created_at:   Utc::now(),
      updated_at:   Utc::now(),
    }
  }

  #[test]
  fn display_name_prefers_full_name() {
    let p = principal(Some("alice"), Some("Alice Liddell"));
    assert_eq!(p.display_name(), "Alice Liddell");
  }

  #[test]
  fn display_name_falls_back_to_handle_then_fixed() {
    assert_eq!(principal(Some("alice"), None).display_name(), "alice");
    assert_eq!(principal(None, None).display_name(), "unknown");
  }

  #[test]
  fn empty_update_reports_empty() {
    assert!(ProfileUpdate::default().is_empty());
    let update = ProfileUpdate { bio: Some(None), ..Default::default() };
    assert!(!update.is_empty());
  }
}
