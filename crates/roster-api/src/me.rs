//! Handlers for the caller's own profile.
//!
//! | Method   | Path         | Notes |
//! |----------|--------------|-------|
//! | `GET`    | `/me`        | Profile with roles joined |
//! | `PATCH`  | `/me`        | Partial update; `null` clears a field |
//! | `PUT`    | `/me/avatar` | Raw image body, `Content-Type` required |
//! | `DELETE` | `/me/avatar` | Clears the reference |

use axum::{
  Json,
  extract::State,
  http::{HeaderMap, header},
};
use bytes::Bytes;
use serde::Deserialize;

use roster_core::{
  avatar::extension_for,
  principal::{Profile, ProfileUpdate},
  store::{ProfileStore, RoleStore},
};

use crate::{ApiState, error::ApiError, session::Session};

// ─── Read ─────────────────────────────────────────────────────────────────────

/// `GET /me`
pub async fn get_own<S>(
  State(state): State<ApiState<S>>,
  session: Session,
) -> Result<Json<Profile>, ApiError>
where
  S: RoleStore + ProfileStore + 'static,
{
  let profile = state
    .store
    .get_profile(session.principal_id)
    .await?
    .ok_or_else(|| ApiError::NotFound("profile not found".to_owned()))?;
  Ok(Json(profile))
}

// ─── Update ───────────────────────────────────────────────────────────────────

/// Patch body for `/me`. An absent field is left untouched; an explicit
/// `null` clears it. The avatar reference is managed only through the
/// dedicated endpoints below.
#[derive(Debug, Default, Deserialize)]
pub struct ProfilePatch {
  #[serde(default, with = "serde_with::rust::double_option")]
  pub handle:    Option<Option<String>>,
  #[serde(default, with = "serde_with::rust::double_option")]
  pub full_name: Option<Option<String>>,
  #[serde(default, with = "serde_with::rust::double_option")]
  pub bio:       Option<Option<String>>,
  #[serde(default, with = "serde_with::rust::double_option")]
  pub location:  Option<Option<String>>,
  #[serde(default, with = "serde_with::rust::double_option")]
  pub website:   Option<Option<String>>,
}

impl ProfilePatch {
  pub fn into_update(self) -> ProfileUpdate {
    ProfileUpdate {
      handle:     self.handle,
      full_name:  self.full_name,
      avatar_ref: None,
      bio:        self.bio,
      location:   self.location,
      website:    self.website,
    }
  }
}

/// `PATCH /me`
pub async fn patch_own<S>(
  State(state): State<ApiState<S>>,
  session: Session,
  Json(patch): Json<ProfilePatch>,
) -> Result<Json<Profile>, ApiError>
where
  S: RoleStore + ProfileStore + 'static,
{
  let profile = state
    .store
    .update_profile(session.principal_id, patch.into_update())
    .await?;
  Ok(Json(profile))
}

// ─── Avatar ───────────────────────────────────────────────────────────────────

fn media_type(headers: &HeaderMap) -> Result<String, ApiError> {
  let value = headers
    .get(header::CONTENT_TYPE)
    .and_then(|v| v.to_str().ok())
    .ok_or_else(|| ApiError::BadRequest("missing content-type".to_owned()))?;
  // Parameters like `; charset=...` are irrelevant here.
  Ok(value.split(';').next().unwrap_or(value).trim().to_owned())
}

/// `PUT /me/avatar` — body is the raw image.
pub async fn put_avatar<S>(
  State(state): State<ApiState<S>>,
  session: Session,
  headers: HeaderMap,
  body: Bytes,
) -> Result<Json<Profile>, ApiError>
where
  S: RoleStore + ProfileStore + 'static,
{
  let media_type = media_type(&headers)?;
  if extension_for(&media_type).is_none() {
    return Err(ApiError::UnsupportedMedia(media_type));
  }
  if body.is_empty() {
    return Err(ApiError::BadRequest("empty image body".to_owned()));
  }

  let previous = state
    .store
    .get_profile(session.principal_id)
    .await?
    .and_then(|p| p.principal.avatar_ref);

  let reference = state
    .avatars
    .upload(session.principal_id, &media_type, body.to_vec())
    .await?;

  let profile = state
    .store
    .update_profile(session.principal_id, ProfileUpdate {
      avatar_ref: Some(Some(reference.clone())),
      ..Default::default()
    })
    .await?;

  // Best effort: a stale image left behind is not worth failing the upload.
  if let Some(old) = previous
    && old != reference
  {
    if let Err(e) = state.avatars.remove(&old).await {
      tracing::warn!(reference = %old, error = %e, "could not remove old avatar");
    }
  }

  Ok(Json(profile))
}

/// `DELETE /me/avatar`
pub async fn delete_avatar<S>(
  State(state): State<ApiState<S>>,
  session: Session,
) -> Result<Json<Profile>, ApiError>
where
  S: RoleStore + ProfileStore + 'static,
{
  let previous = state
    .store
    .get_profile(session.principal_id)
    .await?
    .and_then(|p| p.principal.avatar_ref);

  let profile = state
    .store
    .update_profile(session.principal_id, ProfileUpdate {
      avatar_ref: Some(None),
      ..Default::default()
    })
    .await?;

  if let Some(old) = previous {
    if let Err(e) = state.avatars.remove(&old).await {
      tracing::warn!(reference = %old, error = %e, "could not remove avatar");
    }
  }

  Ok(Json(profile))
}
