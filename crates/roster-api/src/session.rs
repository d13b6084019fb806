//! Session and admin-guard extractors.
//!
//! Every handler that needs an authenticated caller takes [`Session`];
//! every administrative handler takes [`AdminSession`] instead. The gate
//! check lives here and nowhere else — handlers never re-derive "is this
//! caller an admin" themselves.

use axum::{
  extract::FromRequestParts,
  http::{HeaderMap, header, request::Parts},
};
use uuid::Uuid;

use roster_core::{
  gate,
  store::{ProfileStore, RoleStore},
};

use crate::{ApiState, error::ApiError};

/// An authenticated caller. Extraction resolves the bearer token against
/// the external identity provider and bootstraps the principal row on its
/// first sighting (the counterpart of the provider-side signup trigger).
pub struct Session {
  pub principal_id: Uuid,
}

/// An authenticated caller that passed the authorization gate.
///
/// Rejection is a 404, not a 403: administrative surfaces are never
/// confirmed to exist to callers who cannot use them.
pub struct AdminSession {
  pub principal_id: Uuid,
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
  headers
    .get(header::AUTHORIZATION)?
    .to_str()
    .ok()?
    .strip_prefix("Bearer ")
}

impl<S> FromRequestParts<ApiState<S>> for Session
where
  S: RoleStore + ProfileStore + 'static,
{
  type Rejection = ApiError;

  async fn from_request_parts(
    parts: &mut Parts,
    state: &ApiState<S>,
  ) -> Result<Self, Self::Rejection> {
    let token = bearer_token(&parts.headers).ok_or(ApiError::Unauthorized)?;

    // A failing identity provider means "not authenticated", never a 500.
    let resolved = match state.sessions.resolve(token).await {
      Ok(resolved) => resolved,
      Err(e) => {
        tracing::warn!(error = %e, "session resolution failed");
        return Err(ApiError::Unauthorized);
      }
    };
    let principal_id = resolved.ok_or(ApiError::Unauthorized)?;

    state.store.ensure_principal(principal_id).await?;
    Ok(Session { principal_id })
  }
}

impl<S> FromRequestParts<ApiState<S>> for AdminSession
where
  S: RoleStore + ProfileStore + 'static,
{
  type Rejection = ApiError;

  async fn from_request_parts(
    parts: &mut Parts,
    state: &ApiState<S>,
  ) -> Result<Self, Self::Rejection> {
    let session = Session::from_request_parts(parts, state).await?;

    if gate::is_authorized_admin(state.store.as_ref(), session.principal_id)
      .await
    {
      Ok(AdminSession { principal_id: session.principal_id })
    } else {
      Err(ApiError::NotFound("not found".to_owned()))
    }
  }
}
