//! Error types for `roster-core`.
//!
//! One taxonomy is shared by every layer: storage backends map their native
//! failures into these variants, and callers can always tell a validation
//! failure apart from a transient storage failure. Lookups that find nothing
//! return `Ok(None)` rather than an error.

use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum Error {
  /// An operation referenced a principal that does not exist.
  #[error("principal not found: {0}")]
  PrincipalNotFound(Uuid),

  /// An operation referenced a role id that does not exist. Usually a race:
  /// the role was deleted between page load and submission.
  #[error("role not found: {0}")]
  RoleNotFound(Uuid),

  /// A role with this (normalized) name already exists.
  #[error("role name already exists: {0:?}")]
  DuplicateRoleName(String),

  /// The requested handle is already taken by another principal.
  #[error("handle already taken: {0:?}")]
  HandleTaken(String),

  /// The role name is empty after normalization.
  #[error("invalid role name: {0:?}")]
  InvalidRoleName(String),

  /// The underlying storage call failed (connectivity, timeout, corruption).
  /// Never retried here; surfaced to the caller as a failed operation.
  #[error("storage error: {0}")]
  Storage(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl Error {
  /// Wrap an arbitrary backend failure as a [`Error::Storage`].
  pub fn storage(source: impl std::error::Error + Send + Sync + 'static) -> Self {
    Error::Storage(Box::new(source))
  }

  /// True for the variants a user can correct by changing their input,
  /// as opposed to transient storage failures.
  pub fn is_validation(&self) -> bool {
    !matches!(self, Error::Storage(_))
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
