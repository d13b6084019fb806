//! Session resolution — the boundary to the external identity provider.
//!
//! This crate never issues tokens or validates credentials; it only asks the
//! provider "whose session is this?". The trait is object-safe so servers
//! can hold it as `Arc<dyn SessionResolver>`.

use async_trait::async_trait;
use uuid::Uuid;

use crate::Result;

/// Maps a bearer token to the authenticated principal, if any.
#[async_trait]
pub trait SessionResolver: Send + Sync {
  /// `Ok(None)` means the token is unknown or expired — an anonymous
  /// caller, not an error. `Err` means the provider itself failed; callers
  /// must treat that as unauthenticated (fail closed).
  async fn resolve(&self, token: &str) -> Result<Option<Uuid>>;
}
