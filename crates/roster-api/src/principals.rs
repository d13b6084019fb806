//! Handlers for `/principals` — the administrative user-management surface.
//!
//! | Method  | Path | Notes |
//! |---------|------|-------|
//! | `GET`   | `/principals` | Optional `?q=` filter |
//! | `GET`   | `/principals/{id}` | 404 if not found |
//! | `PATCH` | `/principals/{id}` | Admin edit of handle / full name |
//! | `PUT`   | `/principals/{id}/roles` | Full replacement of assignments |
//!
//! All routes require [`AdminSession`]; non-admin callers see 404s.

use axum::{
  Json,
  extract::{Path, Query, State},
};
use serde::Deserialize;
use uuid::Uuid;

use roster_core::{
  Error,
  principal::{Profile, ProfileUpdate},
  role::Role,
  store::{ProfileStore, RoleStore},
};

use crate::{ApiState, error::ApiError, session::AdminSession};

// ─── List / search ───────────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
  pub q: Option<String>,
}

/// `GET /principals[?q=<query>]`
pub async fn list<S>(
  State(state): State<ApiState<S>>,
  _admin: AdminSession,
  Query(params): Query<ListParams>,
) -> Result<Json<Vec<Profile>>, ApiError>
where
  S: RoleStore + ProfileStore + 'static,
{
  let profiles = state
    .admin
    .search_users(params.q.as_deref().unwrap_or(""))
    .await?;
  Ok(Json(profiles))
}

// ─── Get one ─────────────────────────────────────────────────────────────────

/// `GET /principals/{id}`
pub async fn get_one<S>(
  State(state): State<ApiState<S>>,
  _admin: AdminSession,
  Path(id): Path<Uuid>,
) -> Result<Json<Profile>, ApiError>
where
  S: RoleStore + ProfileStore + 'static,
{
  let profile = state
    .store
    .get_profile(id)
    .await?
    .ok_or_else(|| ApiError::NotFound(format!("principal {id} not found")))?;
  Ok(Json(profile))
}

// ─── Admin edit ──────────────────────────────────────────────────────────────

/// The fields an administrator may edit on someone else's profile.
#[derive(Debug, Default, Deserialize)]
pub struct AdminPatch {
  #[serde(default, with = "serde_with::rust::double_option")]
  pub handle:    Option<Option<String>>,
  #[serde(default, with = "serde_with::rust::double_option")]
  pub full_name: Option<Option<String>>,
}

/// `PATCH /principals/{id}`
pub async fn patch_one<S>(
  State(state): State<ApiState<S>>,
  _admin: AdminSession,
  Path(id): Path<Uuid>,
  Json(patch): Json<AdminPatch>,
) -> Result<Json<Profile>, ApiError>
where
  S: RoleStore + ProfileStore + 'static,
{
  let update = ProfileUpdate {
    handle: patch.handle,
    full_name: patch.full_name,
    ..Default::default()
  };
  match state.store.update_profile(id, update).await {
    Ok(profile) => Ok(Json(profile)),
    Err(Error::PrincipalNotFound(_)) => {
      Err(ApiError::NotFound(format!("principal {id} not found")))
    }
    Err(e) => Err(e.into()),
  }
}

// ─── Role replacement ────────────────────────────────────────────────────────

/// Body for `PUT /principals/{id}/roles` — the complete desired role set,
/// not a delta.
#[derive(Debug, Deserialize)]
pub struct ReplaceRolesBody {
  pub role_ids: Vec<Uuid>,
}

/// `PUT /principals/{id}/roles` — returns the roles now in effect.
pub async fn put_roles<S>(
  State(state): State<ApiState<S>>,
  _admin: AdminSession,
  Path(id): Path<Uuid>,
  Json(body): Json<ReplaceRolesBody>,
) -> Result<Json<Vec<Role>>, ApiError>
where
  S: RoleStore + ProfileStore + 'static,
{
  state.store.replace_role_assignments(id, &body.role_ids).await?;
  let roles = state.store.roles_for_principal(id).await?;
  Ok(Json(roles))
}
