//! Async orchestration over the stores for the administrative use cases.
//!
//! Handlers and UI shells call through [`AdminWorkflow`] instead of talking
//! to the stores directly; authorization is established before any of these
//! methods run (the HTTP layer's admin guard).

use std::{collections::BTreeSet, sync::Arc};

use chrono::{DateTime, NaiveTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use roster_core::{
  Error, Result,
  principal::Profile,
  role::{Role, RoleWithCount},
  store::{ProfileStore, RoleStore},
};

use crate::{
  dialog::{DialogError, RoleDialog},
  view::UserListView,
};

/// Headline numbers for the admin dashboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DashboardStats {
  pub total_principals:     u64,
  pub total_roles:          u64,
  pub new_principals_today: u64,
}

/// The admin workflow surface over a store `S`.
///
/// Cloning is cheap — the store is reference-counted.
pub struct AdminWorkflow<S> {
  store: Arc<S>,
}

impl<S> Clone for AdminWorkflow<S> {
  fn clone(&self) -> Self {
    AdminWorkflow { store: Arc::clone(&self.store) }
  }
}

impl<S> AdminWorkflow<S>
where
  S: RoleStore + ProfileStore,
{
  pub fn new(store: Arc<S>) -> Self {
    AdminWorkflow { store }
  }

  // ── User management ───────────────────────────────────────────────────

  /// Fresh view-model over every principal, newest first.
  pub async fn user_list(&self) -> Result<UserListView> {
    Ok(UserListView::new(self.store.list_principals().await?))
  }

  /// Server-side rendition of the list filter; same predicate the
  /// view-model applies locally.
  pub async fn search_users(&self, query: &str) -> Result<Vec<Profile>> {
    self.store.search_principals(query).await
  }

  // ── Role management ───────────────────────────────────────────────────

  pub async fn roles_overview(&self) -> Result<Vec<RoleWithCount>> {
    self.store.list_roles_with_counts().await
  }

  pub async fn create_role(&self, name: &str) -> Result<Role> {
    let role = self.store.create_role(name).await?;
    tracing::info!(role = %role.name, "created role");
    Ok(role)
  }

  /// Fetch everything the role-editing dialog needs and hand it back in
  /// `Ready` state.
  pub async fn open_role_dialog(&self, principal_id: Uuid) -> Result<RoleDialog> {
    let available = self.store.list_roles().await?;
    let selected: BTreeSet<Uuid> = self
      .store
      .roles_for_principal(principal_id)
      .await?
      .into_iter()
      .map(|role| role.role_id)
      .collect();
    Ok(RoleDialog::ready(principal_id, available, selected))
  }

  /// Confirm a `Ready` dialog: run the full replacement and return the
  /// next dialog state — `Closed` on success, `Ready` with an inline
  /// message on failure (the administrator may retry or cancel). Only a
  /// dialog in the wrong state is an `Err`.
  pub async fn submit_role_dialog(
    &self,
    dialog: RoleDialog,
  ) -> Result<RoleDialog, DialogError> {
    let submitting = dialog.confirm()?;
    let (principal_id, selected) = match &submitting {
      RoleDialog::Submitting { principal_id, selected, .. } => {
        (*principal_id, selected.iter().copied().collect::<Vec<_>>())
      }
      _ => return Err(DialogError::NotSubmitting),
    };

    match self.store.replace_role_assignments(principal_id, &selected).await {
      Ok(()) => {
        tracing::info!(
          %principal_id,
          roles = selected.len(),
          "replaced role assignments"
        );
        submitting.submitted()
      }
      Err(e) => {
        tracing::warn!(%principal_id, error = %e, "role replacement failed");
        submitting.failed(inline_message(&e))
      }
    }
  }

  // ── Dashboard ─────────────────────────────────────────────────────────

  /// Headline counts as of `now` (passed in so the day boundary is
  /// testable).
  pub async fn stats(&self, now: DateTime<Utc>) -> Result<DashboardStats> {
    let midnight = now.date_naive().and_time(NaiveTime::MIN).and_utc();
    Ok(DashboardStats {
      total_principals:     self.store.count_principals().await?,
      total_roles:          self.store.count_roles().await?,
      new_principals_today: self.store.count_principals_since(midnight).await?,
    })
  }
}

/// What a failed submit shows inside the dialog. Reference races read as
/// "refresh and retry"; transient storage failures stay generic.
fn inline_message(error: &Error) -> String {
  match error {
    Error::RoleNotFound(_) | Error::PrincipalNotFound(_) => {
      "a selected role or the user no longer exists; refresh and try again"
        .to_owned()
    }
    Error::Storage(_) => "could not save role changes; try again".to_owned(),
    other => other.to_string(),
  }
}
