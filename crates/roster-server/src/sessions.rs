//! Config-backed session resolution.
//!
//! Stands in for the hosted identity provider: the operator provisions
//! `(principal_id, token digest)` pairs in `config.toml`, and requests are
//! matched by the SHA-256 digest of their bearer token. Token issuance and
//! rotation stay outside this process.

use std::collections::HashMap;

use async_trait::async_trait;
use roster_core::{Result, session::SessionResolver};
use sha2::{Digest as _, Sha256};
use uuid::Uuid;

use crate::SessionEntry;

/// Hex SHA-256 digest of a token — the form stored in configuration.
pub fn token_digest(token: &str) -> String {
  hex::encode(Sha256::digest(token.as_bytes()))
}

/// Session resolver over the digests declared in [`crate::ServerConfig`].
pub struct ConfigSessions {
  by_digest: HashMap<String, Uuid>,
}

impl ConfigSessions {
  pub fn from_entries(entries: &[SessionEntry]) -> Self {
    let by_digest = entries
      .iter()
      .map(|entry| (entry.token_sha256.to_lowercase(), entry.principal_id))
      .collect();
    ConfigSessions { by_digest }
  }
}

#[async_trait]
impl SessionResolver for ConfigSessions {
  async fn resolve(&self, token: &str) -> Result<Option<Uuid>> {
    Ok(self.by_digest.get(&token_digest(token)).copied())
  }
}
