//! Handler for `GET /stats` — the admin dashboard headline numbers.

use axum::{Json, extract::State};
use chrono::Utc;

use roster_admin::DashboardStats;
use roster_core::store::{ProfileStore, RoleStore};

use crate::{ApiState, error::ApiError, session::AdminSession};

/// `GET /stats`
pub async fn overview<S>(
  State(state): State<ApiState<S>>,
  _admin: AdminSession,
) -> Result<Json<DashboardStats>, ApiError>
where
  S: RoleStore + ProfileStore + 'static,
{
  Ok(Json(state.admin.stats(Utc::now()).await?))
}
