//! The user-list view-model: search and pagination as pure state
//! transitions.
//!
//! Every transition consumes the view and returns the next one, so the
//! search/pagination contract is testable as plain data: a query change
//! resets the page to 1, and out-of-range page requests clamp to the
//! nearest valid page rather than erroring or showing a dead end.

use roster_core::{principal::Profile, search::matches_query};
use serde::{Deserialize, Serialize};

/// Fixed page size for the user list.
pub const PAGE_SIZE: usize = 10;

/// Serializable state behind the administrative user list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserListView {
  rows:  Vec<Profile>,
  query: String,
  page:  usize,
}

impl UserListView {
  /// Start on page 1 with no filter. `rows` are expected in display order
  /// (the store lists newest first).
  pub fn new(rows: Vec<Profile>) -> Self {
    UserListView { rows, query: String::new(), page: 1 }
  }

  pub fn query(&self) -> &str { &self.query }

  /// Current page number, 1-based and always within `1..=page_count()`.
  pub fn page(&self) -> usize { self.page }

  /// Change the filter. Always returns to page 1 so a narrowed result set
  /// can never leave the view stranded past its last page.
  pub fn apply_search(mut self, query: impl Into<String>) -> Self {
    self.query = query.into();
    self.page = 1;
    self
  }

  /// Swap in freshly fetched rows, keeping the query and re-clamping the
  /// page.
  pub fn refresh(mut self, rows: Vec<Profile>) -> Self {
    self.rows = rows;
    self.clamp()
  }

  /// Jump to a page; out-of-range requests clamp to the nearest valid page.
  pub fn goto_page(mut self, page: usize) -> Self {
    self.page = page;
    self.clamp()
  }

  pub fn next_page(self) -> Self {
    let page = self.page;
    self.goto_page(page + 1)
  }

  pub fn prev_page(self) -> Self {
    let page = self.page;
    self.goto_page(page.saturating_sub(1))
  }

  fn clamp(mut self) -> Self {
    self.page = self.page.clamp(1, self.page_count());
    self
  }

  /// All rows passing the current filter, in display order.
  pub fn filtered(&self) -> Vec<&Profile> {
    self
      .rows
      .iter()
      .filter(|profile| matches_query(profile, &self.query))
      .collect()
  }

  pub fn filtered_count(&self) -> usize { self.filtered().len() }

  pub fn total_count(&self) -> usize { self.rows.len() }

  /// Number of pages; page 1 exists even when nothing matches.
  pub fn page_count(&self) -> usize {
    self.filtered_count().div_ceil(PAGE_SIZE).max(1)
  }

  /// The rows visible on the current page.
  pub fn current_page(&self) -> Vec<&Profile> {
    self
      .filtered()
      .into_iter()
      .skip((self.page - 1) * PAGE_SIZE)
      .take(PAGE_SIZE)
      .collect()
  }
}

#[cfg(test)]
mod tests {
  use chrono::Utc;
  use roster_core::{principal::Principal, role::Role};
  use uuid::Uuid;

  use super::*;

  fn profile(handle: &str, roles: &[&str]) -> Profile {
    Profile {
      principal: Principal {
        principal_id: Uuid::new_v4(),
        handle:       Some(handle.to_owned()),
        full_name:    None,
        avatar_ref:   None,
        bio:          None,
        location:     None,
        website:      None,
        created_at:   Utc::now(),
        updated_at:   Utc::now(),
      },
      roles:     roles
        .iter()
        .map(|name| Role {
          role_id:    Uuid::new_v4(),
          name:       (*name).to_owned(),
          created_at: Utc::now(),
        })
        .collect(),
    }
  }

  fn numbered(count: usize) -> Vec<Profile> {
    (0..count).map(|i| profile(&format!("user{i:02}"), &["user"])).collect()
  }

  #[test]
  fn pages_split_at_fixed_size() {
    let view = UserListView::new(numbered(25));
    assert_eq!(view.page_count(), 3);
    assert_eq!(view.current_page().len(), 10);
    assert_eq!(
      view.current_page()[0].principal.handle.as_deref(),
      Some("user00")
    );

    let view = view.goto_page(3);
    assert_eq!(view.current_page().len(), 5);
    assert_eq!(
      view.current_page()[0].principal.handle.as_deref(),
      Some("user20")
    );
  }

  #[test]
  fn out_of_range_pages_clamp() {
    let view = UserListView::new(numbered(25)).goto_page(4);
    assert_eq!(view.page(), 3);
    let last_page: Vec<_> = view
      .current_page()
      .iter()
      .map(|p| p.principal.handle.clone())
      .collect();

    // Asking for an even further page lands on the same rows.
    let view = view.goto_page(99);
    let clamped: Vec<_> = view
      .current_page()
      .iter()
      .map(|p| p.principal.handle.clone())
      .collect();
    assert_eq!(last_page, clamped);

    assert_eq!(view.goto_page(0).page(), 1);
  }

  #[test]
  fn prev_on_first_page_stays_put() {
    let view = UserListView::new(numbered(5)).prev_page();
    assert_eq!(view.page(), 1);
  }

  #[test]
  fn search_filters_and_resets_page() {
    let mut rows = numbered(22);
    rows.push(profile("zeta", &["admin"]));

    let view = UserListView::new(rows).goto_page(3);
    assert_eq!(view.page(), 3);

    let view = view.apply_search("zeta");
    assert_eq!(view.page(), 1);
    assert_eq!(view.filtered_count(), 1);
    assert_eq!(view.page_count(), 1);
    assert_eq!(
      view.current_page()[0].principal.handle.as_deref(),
      Some("zeta")
    );
  }

  #[test]
  fn search_can_match_roles() {
    let rows =
      vec![profile("alice", &["admin", "user"]), profile("bob", &["user"])];
    let view = UserListView::new(rows).apply_search("adm");
    assert_eq!(view.filtered_count(), 1);
    assert_eq!(
      view.current_page()[0].principal.handle.as_deref(),
      Some("alice")
    );
  }

  #[test]
  fn no_matches_is_an_empty_page_not_an_error() {
    let view = UserListView::new(numbered(12)).apply_search("nobody");
    assert_eq!(view.filtered_count(), 0);
    assert_eq!(view.page_count(), 1);
    assert!(view.current_page().is_empty());
  }

  #[test]
  fn refresh_keeps_query_and_reclamps() {
    let view = UserListView::new(numbered(25)).goto_page(3);
    let view = view.refresh(numbered(4));
    assert_eq!(view.page(), 1);
    assert_eq!(view.total_count(), 4);
  }
}
