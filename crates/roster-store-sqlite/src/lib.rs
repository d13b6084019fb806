//! SQLite backend for the Roster directory service.
//!
//! Wraps [`tokio_rusqlite`] so all database access runs on a dedicated
//! thread without blocking the async runtime. Stands in for the hosted
//! relational database of the original deployment; the schema mirrors its
//! three relations (principals, roles, role_assignments).

mod encode;
mod error;
mod schema;
mod store;

pub use store::SqliteStore;
