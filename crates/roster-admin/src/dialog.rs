//! The role-editing dialog, modelled as an explicit state machine.
//!
//! One dialog exists per principal being edited. Checkbox toggles are purely
//! local until the administrator confirms; the only storage mutation happens
//! between `Submitting` and the next state. Cancellation from any open state
//! returns to `Closed` without touching storage.
//!
//! ```text
//! Closed ── open ──▶ Loading ── loaded ──▶ Ready ◀────────────┐
//!                                           │ confirm         │ failed
//!                                           ▼                 │
//!                                        Submitting ── submitted ──▶ Closed
//! ```

use std::collections::BTreeSet;

use roster_core::role::Role;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// A transition was requested that the current state does not allow.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DialogError {
  #[error("the dialog is not loading")]
  NotLoading,
  #[error("the dialog is not ready")]
  NotReady,
  #[error("the dialog is not submitting")]
  NotSubmitting,
}

/// State of the role-editing dialog for one principal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum RoleDialog {
  /// Initial and terminal state.
  Closed,
  /// Opened; current assignments are being fetched.
  Loading { principal_id: Uuid },
  /// Checkboxes reflect `selected`; toggles are local state only.
  Ready {
    principal_id: Uuid,
    /// Every role that exists, in display order.
    available:    Vec<Role>,
    selected:     BTreeSet<Uuid>,
    /// Inline message from a failed submit; cleared on the next toggle.
    error:        Option<String>,
  },
  /// The full replacement is in flight.
  Submitting {
    principal_id: Uuid,
    available:    Vec<Role>,
    selected:     BTreeSet<Uuid>,
  },
}

impl RoleDialog {
  /// Open the dialog for a principal and start loading.
  pub fn open(principal_id: Uuid) -> Self {
    RoleDialog::Loading { principal_id }
  }

  /// Build a `Ready` dialog directly from fetched data.
  pub fn ready(
    principal_id: Uuid,
    available: Vec<Role>,
    selected: BTreeSet<Uuid>,
  ) -> Self {
    RoleDialog::Ready { principal_id, available, selected, error: None }
  }

  /// `Loading → Ready` once the role list and current assignments arrive.
  pub fn loaded(
    self,
    available: Vec<Role>,
    selected: BTreeSet<Uuid>,
  ) -> Result<Self, DialogError> {
    match self {
      RoleDialog::Loading { principal_id } => {
        Ok(RoleDialog::ready(principal_id, available, selected))
      }
      _ => Err(DialogError::NotLoading),
    }
  }

  /// Flip one checkbox. Clears any inline error.
  pub fn toggle(self, role_id: Uuid) -> Result<Self, DialogError> {
    match self {
      RoleDialog::Ready { principal_id, available, mut selected, .. } => {
        if !selected.remove(&role_id) {
          selected.insert(role_id);
        }
        Ok(RoleDialog::Ready { principal_id, available, selected, error: None })
      }
      _ => Err(DialogError::NotReady),
    }
  }

  /// `Ready → Submitting`. The caller performs the actual replacement and
  /// then reports [`submitted`](Self::submitted) or
  /// [`failed`](Self::failed).
  pub fn confirm(self) -> Result<Self, DialogError> {
    match self {
      RoleDialog::Ready { principal_id, available, selected, .. } => {
        Ok(RoleDialog::Submitting { principal_id, available, selected })
      }
      _ => Err(DialogError::NotReady),
    }
  }

  /// `Submitting → Closed` after the replacement succeeded.
  pub fn submitted(self) -> Result<Self, DialogError> {
    match self {
      RoleDialog::Submitting { .. } => Ok(RoleDialog::Closed),
      _ => Err(DialogError::NotSubmitting),
    }
  }

  /// `Submitting → Ready` with an inline error; the selection is retained
  /// so the administrator can retry or cancel.
  pub fn failed(self, message: impl Into<String>) -> Result<Self, DialogError> {
    match self {
      RoleDialog::Submitting { principal_id, available, selected } => {
        Ok(RoleDialog::Ready {
          principal_id,
          available,
          selected,
          error: Some(message.into()),
        })
      }
      _ => Err(DialogError::NotSubmitting),
    }
  }

  /// Close from any state. Never mutates storage; an in-flight replacement
  /// is not cancelled, only its result is ignored.
  pub fn cancel(self) -> Self { RoleDialog::Closed }

  /// The selection, if the dialog is in a state that has one.
  pub fn selected(&self) -> Option<&BTreeSet<Uuid>> {
    match self {
      RoleDialog::Ready { selected, .. }
      | RoleDialog::Submitting { selected, .. } => Some(selected),
      _ => None,
    }
  }

  pub fn is_closed(&self) -> bool { matches!(self, RoleDialog::Closed) }
}

#[cfg(test)]
mod tests {
  use chrono::Utc;

  use super::*;

  fn role(name: &str) -> Role {
    Role { role_id: Uuid::new_v4(), name: name.to_owned(), created_at: Utc::now() }
  }

  fn ready_dialog() -> (RoleDialog, Uuid, Uuid) {
    let admin = role("admin");
    let user = role("user");
    let (admin_id, user_id) = (admin.role_id, user.role_id);
    let principal_id = Uuid::new_v4();
    let dialog = RoleDialog::open(principal_id)
      .loaded(vec![admin, user], BTreeSet::from([user_id]))
      .unwrap();
    (dialog, admin_id, user_id)
  }

  #[test]
  fn full_happy_path() {
    let (dialog, admin_id, user_id) = ready_dialog();
    assert_eq!(dialog.selected(), Some(&BTreeSet::from([user_id])));

    let dialog = dialog.toggle(admin_id).unwrap();
    assert_eq!(dialog.selected(), Some(&BTreeSet::from([user_id, admin_id])));

    let dialog = dialog.confirm().unwrap();
    assert!(matches!(dialog, RoleDialog::Submitting { .. }));

    let dialog = dialog.submitted().unwrap();
    assert!(dialog.is_closed());
  }

  #[test]
  fn toggle_is_an_involution() {
    let (dialog, admin_id, user_id) = ready_dialog();
    let dialog =
      dialog.toggle(admin_id).unwrap().toggle(admin_id).unwrap();
    assert_eq!(dialog.selected(), Some(&BTreeSet::from([user_id])));
  }

  #[test]
  fn failure_returns_to_ready_with_selection_and_error() {
    let (dialog, admin_id, user_id) = ready_dialog();
    let dialog = dialog.toggle(admin_id).unwrap().confirm().unwrap();
    let dialog = dialog.failed("could not save").unwrap();

    match &dialog {
      RoleDialog::Ready { selected, error, .. } => {
        assert_eq!(selected, &BTreeSet::from([user_id, admin_id]));
        assert_eq!(error.as_deref(), Some("could not save"));
      }
      other => panic!("expected Ready, got {other:?}"),
    }

    // Retry is allowed from here.
    assert!(dialog.confirm().is_ok());
  }

  #[test]
  fn toggle_clears_inline_error() {
    let (dialog, admin_id, _) = ready_dialog();
    let dialog = dialog
      .confirm()
      .unwrap()
      .failed("boom")
      .unwrap()
      .toggle(admin_id)
      .unwrap();
    assert!(matches!(dialog, RoleDialog::Ready { error: None, .. }));
  }

  #[test]
  fn cancel_closes_from_any_state() {
    let (dialog, _, _) = ready_dialog();
    assert!(dialog.clone().cancel().is_closed());
    assert!(dialog.confirm().unwrap().cancel().is_closed());
    assert!(RoleDialog::open(Uuid::new_v4()).cancel().is_closed());
  }

  #[test]
  fn transitions_out_of_order_are_rejected() {
    assert_eq!(
      RoleDialog::Closed.toggle(Uuid::new_v4()).unwrap_err(),
      DialogError::NotReady
    );
    assert_eq!(
      RoleDialog::Closed.confirm().unwrap_err(),
      DialogError::NotReady
    );
    assert_eq!(
      RoleDialog::Closed.submitted().unwrap_err(),
      DialogError::NotSubmitting
    );
    let (dialog, _, _) = ready_dialog();
    assert_eq!(
      dialog.loaded(vec![], BTreeSet::new()).unwrap_err(),
      DialogError::NotLoading
    );
  }
}
