//! Mapping SQLite failures onto the shared error taxonomy.
//!
//! Constraint violations are recognised by their extended result codes so
//! uniqueness and referential failures surface as the specific taxonomy
//! variants instead of an opaque [`roster_core::Error::Storage`].

use roster_core::Error;
use rusqlite::ffi;

/// Wrap a backend failure as [`roster_core::Error::Storage`].
pub fn storage(e: tokio_rusqlite::Error) -> Error { Error::storage(e) }

/// A UNIQUE or PRIMARY KEY constraint fired.
pub fn is_unique_violation(e: &tokio_rusqlite::Error) -> bool {
  matches!(
    e,
    tokio_rusqlite::Error::Rusqlite(rusqlite::Error::SqliteFailure(err, _))
      if err.extended_code == ffi::SQLITE_CONSTRAINT_UNIQUE
        || err.extended_code == ffi::SQLITE_CONSTRAINT_PRIMARYKEY
  )
}

/// A FOREIGN KEY constraint fired (checked inside `conn.call` closures,
/// before the error is lifted into [`tokio_rusqlite::Error`]).
pub fn is_fk_violation(e: &rusqlite::Error) -> bool {
  matches!(
    e,
    rusqlite::Error::SqliteFailure(err, _)
      if err.extended_code == ffi::SQLITE_CONSTRAINT_FOREIGNKEY
  )
}
