//! Core types and trait definitions for the Roster directory service.
//!
//! This crate is deliberately free of HTTP and database dependencies.
//! All other crates depend on it; it depends on nothing proprietary.

// We intentionally use native `async fn` in the store traits (stabilised in
// Rust 1.75). Suppress the advisory lint about `Send` bounds on the returned
// futures; the traits spell those bounds out explicitly.
#![allow(async_fn_in_trait)]

pub mod avatar;
pub mod error;
pub mod gate;
pub mod principal;
pub mod role;
pub mod search;
pub mod session;
pub mod store;

pub use error::{Error, Result};
