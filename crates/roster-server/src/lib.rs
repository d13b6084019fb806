//! Server assembly for Roster.
//!
//! Binds the generic JSON API from `roster-api` to concrete collaborators:
//! a SQLite store, a config-backed session resolver, and disk-backed avatar
//! storage served statically under `/avatars`.

pub mod avatars;
pub mod sessions;

use std::path::{Path, PathBuf};

use axum::Router;
use roster_api::ApiState;
use roster_core::store::{ProfileStore, RoleStore};
use serde::Deserialize;
use tower_http::{services::ServeDir, trace::TraceLayer};
use uuid::Uuid;

pub use avatars::DiskAvatars;
pub use sessions::ConfigSessions;

// ─── Configuration ────────────────────────────────────────────────────────────

/// One pre-provisioned session, as issued by the external identity
/// provider. Only the token digest is ever written down.
#[derive(Debug, Clone, Deserialize)]
pub struct SessionEntry {
  pub principal_id: Uuid,
  /// Hex SHA-256 digest of the bearer token; generate with
  /// `rosterd --hash-token`.
  pub token_sha256: String,
}

/// Runtime server configuration, deserialised from `config.toml` (with
/// `ROSTER_*` environment overrides).
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
  pub host:            String,
  pub port:            u16,
  /// External base URL, used to mint avatar references.
  pub public_base_url: String,
  pub store_path:      PathBuf,
  pub avatar_dir:      PathBuf,
  #[serde(default)]
  pub sessions:        Vec<SessionEntry>,
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build the full application router: the JSON API under `/api` and the
/// avatar files under `/avatars`.
pub fn router<S>(state: ApiState<S>, avatar_dir: &Path) -> Router
where
  S: RoleStore + ProfileStore + 'static,
{
  Router::new()
    .nest("/api", roster_api::api_router(state))
    .nest_service("/avatars", ServeDir::new(avatar_dir))
    .layer(TraceLayer::new_for_http())
}

#[cfg(test)]
mod tests;
