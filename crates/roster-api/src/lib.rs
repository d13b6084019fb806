//! JSON REST API for Roster.
//!
//! Exposes an axum [`Router`] backed by any store implementing
//! [`RoleStore`] + [`ProfileStore`]. Session resolution and avatar storage
//! are consumed as opaque services; TLS and transport concerns are the
//! caller's responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", roster_api::api_router(state))
//! ```

pub mod error;
pub mod me;
pub mod principals;
pub mod roles;
pub mod session;
pub mod stats;

use std::sync::Arc;

use axum::{
  Router,
  extract::DefaultBodyLimit,
  routing::{get, put},
};
use roster_admin::AdminWorkflow;
use roster_core::{
  avatar::AvatarStorage,
  session::SessionResolver,
  store::{ProfileStore, RoleStore},
};

pub use error::ApiError;
pub use session::{AdminSession, Session};

/// Largest accepted avatar upload.
pub const AVATAR_MAX_BYTES: usize = 8 * 1024 * 1024;

/// Shared state threaded through all handlers.
pub struct ApiState<S> {
  pub store:    Arc<S>,
  pub admin:    AdminWorkflow<S>,
  pub sessions: Arc<dyn SessionResolver>,
  pub avatars:  Arc<dyn AvatarStorage>,
}

impl<S> Clone for ApiState<S> {
  fn clone(&self) -> Self {
    ApiState {
      store:    Arc::clone(&self.store),
      admin:    self.admin.clone(),
      sessions: Arc::clone(&self.sessions),
      avatars:  Arc::clone(&self.avatars),
    }
  }
}

impl<S> ApiState<S>
where
  S: RoleStore + ProfileStore,
{
  pub fn new(
    store: Arc<S>,
    sessions: Arc<dyn SessionResolver>,
    avatars: Arc<dyn AvatarStorage>,
  ) -> Self {
    ApiState {
      admin: AdminWorkflow::new(Arc::clone(&store)),
      store,
      sessions,
      avatars,
    }
  }
}

/// Build a fully-materialised API router for `state`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S>(state: ApiState<S>) -> Router<()>
where
  S: RoleStore + ProfileStore + 'static,
{
  Router::new()
    // Own profile
    .route("/me", get(me::get_own::<S>).patch(me::patch_own::<S>))
    .route(
      "/me/avatar",
      put(me::put_avatar::<S>).delete(me::delete_avatar::<S>),
    )
    // Administration
    .route("/principals", get(principals::list::<S>))
    .route(
      "/principals/{id}",
      get(principals::get_one::<S>).patch(principals::patch_one::<S>),
    )
    .route("/principals/{id}/roles", put(principals::put_roles::<S>))
    .route("/roles", get(roles::list::<S>).post(roles::create::<S>))
    .route("/stats", get(stats::overview::<S>))
    .layer(DefaultBodyLimit::max(AVATAR_MAX_BYTES))
    .with_state(state)
}
