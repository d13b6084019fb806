//! Admin workflow surface for Roster.
//!
//! Orchestrates the stores into the two administrative use cases — user
//! management and role management — and carries the client-facing state as
//! explicit, serializable values: a search/pagination view-model
//! ([`view::UserListView`]) and a role-editing dialog state machine
//! ([`dialog::RoleDialog`]), both pure and unit-testable without a
//! rendering environment.

pub mod dialog;
pub mod view;
pub mod workflow;

pub use dialog::{DialogError, RoleDialog};
pub use view::UserListView;
pub use workflow::{AdminWorkflow, DashboardStats};
