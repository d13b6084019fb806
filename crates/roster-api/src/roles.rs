//! Handlers for `/roles` — the administrative role-management surface.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/roles` | Includes per-role principal counts |
//! | `POST` | `/roles` | Body: `{"name":"editor"}`; 409 on duplicate |

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use serde::Deserialize;

use roster_core::{
  role::RoleWithCount,
  store::{ProfileStore, RoleStore},
};

use crate::{ApiState, error::ApiError, session::AdminSession};

/// `GET /roles`
pub async fn list<S>(
  State(state): State<ApiState<S>>,
  _admin: AdminSession,
) -> Result<Json<Vec<RoleWithCount>>, ApiError>
where
  S: RoleStore + ProfileStore + 'static,
{
  Ok(Json(state.admin.roles_overview().await?))
}

#[derive(Debug, Deserialize)]
pub struct CreateRoleBody {
  pub name: String,
}

/// `POST /roles` — body: `{"name":"editor"}`
pub async fn create<S>(
  State(state): State<ApiState<S>>,
  _admin: AdminSession,
  Json(body): Json<CreateRoleBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: RoleStore + ProfileStore + 'static,
{
  let role = state.admin.create_role(&body.name).await?;
  Ok((StatusCode::CREATED, Json(role)))
}
