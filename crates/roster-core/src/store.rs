//! The `RoleStore` and `ProfileStore` traits.
//!
//! The traits are implemented by storage backends (e.g.
//! `roster-store-sqlite`). Higher layers (`roster-admin`, `roster-api`)
//! depend on these abstractions, not on any concrete backend.
//!
//! All methods return `Send` futures so the traits can be used in
//! multi-threaded async runtimes (e.g. tokio with `axum`). Errors use the
//! shared taxonomy in [`crate::error`]; absent entities are `Ok(None)`.

use std::future::Future;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::{
  Result,
  principal::{Profile, ProfileUpdate},
  role::{Role, RoleWithCount},
};

// ─── Role store ──────────────────────────────────────────────────────────────

/// Durable storage for roles and role assignments.
pub trait RoleStore: Send + Sync {
  /// All roles, ordered by creation time descending. No pagination — the
  /// role count is expected to stay in the tens.
  fn list_roles(&self) -> impl Future<Output = Result<Vec<Role>>> + Send + '_;

  /// Create a role. The name is normalized at this boundary
  /// ([`crate::role::normalize_role_name`]); a normalized duplicate fails
  /// with [`crate::Error::DuplicateRoleName`].
  fn create_role<'a>(
    &'a self,
    name: &'a str,
  ) -> impl Future<Output = Result<Role>> + Send + 'a;

  /// The roles currently assigned to a principal, sorted by name. An empty
  /// vec is a valid result, not an error.
  fn roles_for_principal(
    &self,
    principal_id: Uuid,
  ) -> impl Future<Output = Result<Vec<Role>>> + Send + '_;

  /// Atomically discard every assignment the principal holds and create
  /// exactly one assignment per supplied role id (full-replace semantics —
  /// callers supply the complete desired set). Runs as a single
  /// transaction: partial application is a correctness violation.
  ///
  /// Duplicate ids in the input collapse. Fails with
  /// [`crate::Error::RoleNotFound`] if any id does not exist and with
  /// [`crate::Error::PrincipalNotFound`] for an unknown principal; either
  /// failure rolls the whole replacement back.
  fn replace_role_assignments<'a>(
    &'a self,
    principal_id: Uuid,
    role_ids: &'a [Uuid],
  ) -> impl Future<Output = Result<()>> + Send + 'a;

  /// Number of principals holding a role. Display data only; an unknown
  /// role id yields 0.
  fn count_principals_for_role(
    &self,
    role_id: Uuid,
  ) -> impl Future<Output = Result<u64>> + Send + '_;

  /// All roles with their principal counts, ordered by creation time
  /// descending.
  fn list_roles_with_counts(
    &self,
  ) -> impl Future<Output = Result<Vec<RoleWithCount>>> + Send + '_;

  /// Total number of roles.
  fn count_roles(&self) -> impl Future<Output = Result<u64>> + Send + '_;
}

// ─── Profile store ───────────────────────────────────────────────────────────

/// Durable storage for principals and their mutable display attributes,
/// independent of authentication.
pub trait ProfileStore: Send + Sync {
  /// Fetch one profile with its roles joined in (read-only join). `None`
  /// means the principal does not exist — a normal outcome, distinct from
  /// a storage failure.
  fn get_profile(
    &self,
    principal_id: Uuid,
  ) -> impl Future<Output = Result<Option<Profile>>> + Send + '_;

  /// Apply a partial update (see [`ProfileUpdate`]) and bump `updated_at`.
  /// Fails with [`crate::Error::HandleTaken`] if the new handle collides
  /// and [`crate::Error::PrincipalNotFound`] if the row does not exist.
  fn update_profile(
    &self,
    principal_id: Uuid,
    update: ProfileUpdate,
  ) -> impl Future<Output = Result<Profile>> + Send + '_;

  /// All principals with roles joined, ordered by creation time descending.
  fn list_principals(
    &self,
  ) -> impl Future<Output = Result<Vec<Profile>>> + Send + '_;

  /// Case-insensitive substring search over full name, handle, assigned
  /// role names, and the id (see [`crate::search::matches_query`]).
  /// A blank query returns everything; no cursor is held between calls —
  /// each call re-executes the scan.
  fn search_principals<'a>(
    &'a self,
    query: &'a str,
  ) -> impl Future<Output = Result<Vec<Profile>>> + Send + 'a;

  /// Idempotent bootstrap: create the principal row if absent and assign
  /// the seed `user` role without disturbing existing assignments. Called
  /// the first time an externally authenticated identity is seen.
  fn ensure_principal(
    &self,
    principal_id: Uuid,
  ) -> impl Future<Output = Result<Profile>> + Send + '_;

  /// Total number of principals.
  fn count_principals(&self) -> impl Future<Output = Result<u64>> + Send + '_;

  /// Number of principals created at or after `since`.
  fn count_principals_since(
    &self,
    since: DateTime<Utc>,
  ) -> impl Future<Output = Result<u64>> + Send + '_;
}
