//! The authorization gate — the single predicate deciding administrative
//! access.
//!
//! Flat by design: a principal is an administrator iff its assigned role
//! set contains a role named exactly [`ADMIN_ROLE`]. No hierarchy, no
//! scopes, no per-resource permissions. A future move to per-resource
//! permissions replaces this predicate rather than extending it.

use uuid::Uuid;

use crate::{role::ADMIN_ROLE, store::RoleStore};

/// True iff the principal currently holds the `admin` role.
///
/// Fails closed: a storage failure during the role lookup yields `false`.
/// Ambiguous authorization state must never resolve to "allowed", and no
/// error escapes this boundary.
pub async fn is_authorized_admin<S: RoleStore>(
  store: &S,
  principal_id: Uuid,
) -> bool {
  match store.roles_for_principal(principal_id).await {
    Ok(roles) => roles.iter().any(|role| role.name == ADMIN_ROLE),
    Err(_) => false,
  }
}
