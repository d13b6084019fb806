//! The shared search predicate.
//!
//! Used both by storage backends implementing
//! [`crate::store::ProfileStore::search_principals`] and by the admin
//! view-model, so the two can never disagree about what matches. Matching is
//! an in-process scan — acceptable at this system's scale (thousands of
//! principals), and explicitly not built to grow past it.

use crate::principal::Profile;

/// Case-insensitive substring match against full name, handle, any assigned
/// role name, or the hyphenated id. A blank query matches everything.
pub fn matches_query(profile: &Profile, query: &str) -> bool {
  let needle = query.trim().to_lowercase();
  if needle.is_empty() {
    return true;
  }

  let p = &profile.principal;
  if let Some(full_name) = &p.full_name
    && full_name.to_lowercase().contains(&needle)
  {
    return true;
  }
  if let Some(handle) = &p.handle
    && handle.to_lowercase().contains(&needle)
  {
    return true;
  }
  if profile
    .roles
    .iter()
    .any(|role| role.name.to_lowercase().contains(&needle))
  {
    return true;
  }
  p.principal_id
    .hyphenated()
    .to_string()
    .to_lowercase()
    .contains(&needle)
}
