//! Integration tests over the full router: session resolution, the admin
//! guard, user and role management, and the avatar round trip.

use std::sync::Arc;

use axum::{
  Router,
  body::Body,
  http::{Request, StatusCode, header},
};
use roster_api::ApiState;
use roster_core::{
  role::{ADMIN_ROLE, DEFAULT_ROLE},
  store::{ProfileStore as _, RoleStore as _},
};
use roster_store_sqlite::SqliteStore;
use serde_json::{Value, json};
use tower::ServiceExt as _;
use uuid::Uuid;

use crate::{ConfigSessions, DiskAvatars, SessionEntry, sessions::token_digest};

const ALICE_TOKEN: &str = "alice-token";
const BOB_TOKEN: &str = "bob-token";
const BASE_URL: &str = "http://localhost:8080";

struct TestApp {
  state:      ApiState<SqliteStore>,
  avatar_dir: tempfile::TempDir,
  alice:      Uuid,
  bob:        Uuid,
}

impl TestApp {
  fn router(&self) -> Router {
    crate::router(self.state.clone(), self.avatar_dir.path())
  }
}

/// Two provisioned identities: alice holds `admin` (and `user`), bob only
/// the bootstrap `user` role.
async fn test_app() -> TestApp {
  let store = Arc::new(SqliteStore::open_in_memory().await.unwrap());
  let alice = Uuid::new_v4();
  let bob = Uuid::new_v4();

  store.ensure_principal(alice).await.unwrap();
  store.ensure_principal(bob).await.unwrap();

  let roles = store.list_roles().await.unwrap();
  let admin = roles.iter().find(|r| r.name == ADMIN_ROLE).unwrap().role_id;
  let user = roles.iter().find(|r| r.name == DEFAULT_ROLE).unwrap().role_id;
  store.replace_role_assignments(alice, &[admin, user]).await.unwrap();

  let sessions = ConfigSessions::from_entries(&[
    SessionEntry { principal_id: alice, token_sha256: token_digest(ALICE_TOKEN) },
    SessionEntry { principal_id: bob, token_sha256: token_digest(BOB_TOKEN) },
  ]);

  let avatar_dir = tempfile::tempdir().unwrap();
  let avatars = DiskAvatars::new(avatar_dir.path(), BASE_URL);

  let state = ApiState::new(store, Arc::new(sessions), Arc::new(avatars));
  TestApp { state, avatar_dir, alice, bob }
}

async fn send(
  app: &TestApp,
  method: &str,
  uri: &str,
  token: Option<&str>,
  body: Option<Value>,
) -> axum::response::Response {
  let mut builder = Request::builder().method(method).uri(uri);
  if let Some(token) = token {
    builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
  }
  let request = match body {
    Some(value) => builder
      .header(header::CONTENT_TYPE, "application/json")
      .body(Body::from(value.to_string()))
      .unwrap(),
    None => builder.body(Body::empty()).unwrap(),
  };
  app.router().oneshot(request).await.unwrap()
}

async fn json_body(response: axum::response::Response) -> Value {
  let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
    .await
    .unwrap();
  serde_json::from_slice(&bytes).unwrap()
}

// ─── Sessions ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn missing_token_returns_401_with_challenge() {
  let app = test_app().await;
  let resp = send(&app, "GET", "/api/me", None, None).await;
  assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
  assert_eq!(
    resp.headers().get(header::WWW_AUTHENTICATE).unwrap(),
    "Bearer"
  );
}

#[tokio::test]
async fn unknown_token_returns_401() {
  let app = test_app().await;
  let resp = send(&app, "GET", "/api/me", Some("nope"), None).await;
  assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn me_returns_profile_with_bootstrap_role() {
  let app = test_app().await;
  let resp = send(&app, "GET", "/api/me", Some(BOB_TOKEN), None).await;
  assert_eq!(resp.status(), StatusCode::OK);

  let body = json_body(resp).await;
  assert_eq!(body["principal"]["principal_id"], json!(app.bob));
  assert_eq!(body["roles"][0]["name"], json!(DEFAULT_ROLE));
}

#[tokio::test]
async fn first_sighting_bootstraps_a_principal() {
  let app = test_app().await;
  // carol is provisioned at the identity provider but has never called us.
  let carol = Uuid::new_v4();
  let state = ApiState::new(
    Arc::clone(&app.state.store),
    Arc::new(ConfigSessions::from_entries(&[SessionEntry {
      principal_id: carol,
      token_sha256: token_digest("carol-token"),
    }])),
    Arc::clone(&app.state.avatars),
  );
  let router = crate::router(state, app.avatar_dir.path());

  let request = Request::builder()
    .method("GET")
    .uri("/api/me")
    .header(header::AUTHORIZATION, "Bearer carol-token")
    .body(Body::empty())
    .unwrap();
  let resp = router.oneshot(request).await.unwrap();
  assert_eq!(resp.status(), StatusCode::OK);

  let profile = app.state.store.get_profile(carol).await.unwrap().unwrap();
  assert_eq!(profile.roles[0].name, DEFAULT_ROLE);
}

// ─── Profile self-service ────────────────────────────────────────────────────

#[tokio::test]
async fn patch_me_sets_and_clears_fields() {
  let app = test_app().await;

  let resp = send(
    &app,
    "PATCH",
    "/api/me",
    Some(BOB_TOKEN),
    Some(json!({"handle": "bob", "bio": "hello"})),
  )
  .await;
  assert_eq!(resp.status(), StatusCode::OK);
  let body = json_body(resp).await;
  assert_eq!(body["principal"]["handle"], json!("bob"));
  assert_eq!(body["principal"]["bio"], json!("hello"));

  // Explicit null clears; absent fields stay.
  let resp = send(
    &app,
    "PATCH",
    "/api/me",
    Some(BOB_TOKEN),
    Some(json!({"bio": null})),
  )
  .await;
  let body = json_body(resp).await;
  assert_eq!(body["principal"]["handle"], json!("bob"));
  assert_eq!(body["principal"]["bio"], json!(null));
}

#[tokio::test]
async fn taken_handle_is_a_409() {
  let app = test_app().await;
  send(
    &app,
    "PATCH",
    "/api/me",
    Some(ALICE_TOKEN),
    Some(json!({"handle": "alice"})),
  )
  .await;

  let resp = send(
    &app,
    "PATCH",
    "/api/me",
    Some(BOB_TOKEN),
    Some(json!({"handle": "alice"})),
  )
  .await;
  assert_eq!(resp.status(), StatusCode::CONFLICT);
  let body = json_body(resp).await;
  assert!(body["error"].as_str().unwrap().contains("handle"));
}

// ─── Admin guard ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn admin_routes_are_invisible_to_non_admins() {
  let app = test_app().await;
  for uri in ["/api/principals", "/api/roles", "/api/stats"] {
    let resp = send(&app, "GET", uri, Some(BOB_TOKEN), None).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND, "uri: {uri}");
  }

  let resp = send(
    &app,
    "PUT",
    &format!("/api/principals/{}/roles", app.alice),
    Some(BOB_TOKEN),
    Some(json!({"role_ids": []})),
  )
  .await;
  assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

// ─── User management ─────────────────────────────────────────────────────────

#[tokio::test]
async fn admin_lists_and_searches_principals() {
  let app = test_app().await;

  let resp = send(&app, "GET", "/api/principals", Some(ALICE_TOKEN), None).await;
  assert_eq!(resp.status(), StatusCode::OK);
  assert_eq!(json_body(resp).await.as_array().unwrap().len(), 2);

  // "adm" matches alice through her role name only.
  let resp =
    send(&app, "GET", "/api/principals?q=adm", Some(ALICE_TOKEN), None).await;
  let body = json_body(resp).await;
  let hits = body.as_array().unwrap();
  assert_eq!(hits.len(), 1);
  assert_eq!(hits[0]["principal"]["principal_id"], json!(app.alice));
}

#[tokio::test]
async fn admin_fetches_and_edits_other_profiles() {
  let app = test_app().await;

  let resp = send(
    &app,
    "PATCH",
    &format!("/api/principals/{}", app.bob),
    Some(ALICE_TOKEN),
    Some(json!({"full_name": "Bob Dodgson"})),
  )
  .await;
  assert_eq!(resp.status(), StatusCode::OK);

  let resp = send(
    &app,
    "GET",
    &format!("/api/principals/{}", app.bob),
    Some(ALICE_TOKEN),
    None,
  )
  .await;
  let body = json_body(resp).await;
  assert_eq!(body["principal"]["full_name"], json!("Bob Dodgson"));
}

#[tokio::test]
async fn editing_a_vanished_principal_is_a_404() {
  let app = test_app().await;
  let resp = send(
    &app,
    "PATCH",
    &format!("/api/principals/{}", Uuid::new_v4()),
    Some(ALICE_TOKEN),
    Some(json!({"full_name": "Ghost"})),
  )
  .await;
  assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

// ─── Role management ─────────────────────────────────────────────────────────

#[tokio::test]
async fn role_creation_normalizes_and_rejects_duplicates() {
  let app = test_app().await;

  let resp = send(
    &app,
    "POST",
    "/api/roles",
    Some(ALICE_TOKEN),
    Some(json!({"name": "  Editor "})),
  )
  .await;
  assert_eq!(resp.status(), StatusCode::CREATED);
  assert_eq!(json_body(resp).await["name"], json!("editor"));

  let resp = send(
    &app,
    "POST",
    "/api/roles",
    Some(ALICE_TOKEN),
    Some(json!({"name": "EDITOR"})),
  )
  .await;
  assert_eq!(resp.status(), StatusCode::CONFLICT);

  let resp = send(
    &app,
    "POST",
    "/api/roles",
    Some(ALICE_TOKEN),
    Some(json!({"name": "   "})),
  )
  .await;
  assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn role_list_carries_principal_counts() {
  let app = test_app().await;
  let resp = send(&app, "GET", "/api/roles", Some(ALICE_TOKEN), None).await;
  let body = json_body(resp).await;
  let roles = body.as_array().unwrap();

  let user = roles.iter().find(|r| r["name"] == json!(DEFAULT_ROLE)).unwrap();
  let admin = roles.iter().find(|r| r["name"] == json!(ADMIN_ROLE)).unwrap();
  assert_eq!(user["principals"], json!(2));
  assert_eq!(admin["principals"], json!(1));
}

#[tokio::test]
async fn replacing_roles_round_trips() {
  let app = test_app().await;
  let roles = app.state.store.list_roles().await.unwrap();
  let admin = roles.iter().find(|r| r.name == ADMIN_ROLE).unwrap().role_id;

  let resp = send(
    &app,
    "PUT",
    &format!("/api/principals/{}/roles", app.bob),
    Some(ALICE_TOKEN),
    Some(json!({"role_ids": [admin]})),
  )
  .await;
  assert_eq!(resp.status(), StatusCode::OK);
  let body = json_body(resp).await;
  assert_eq!(body[0]["name"], json!(ADMIN_ROLE));

  // bob is now an admin too.
  let resp = send(&app, "GET", "/api/stats", Some(BOB_TOKEN), None).await;
  assert_eq!(resp.status(), StatusCode::OK);
}

#[tokio::test]
async fn stale_role_submission_is_a_409_and_applies_nothing() {
  let app = test_app().await;
  let resp = send(
    &app,
    "PUT",
    &format!("/api/principals/{}/roles", app.bob),
    Some(ALICE_TOKEN),
    Some(json!({"role_ids": [Uuid::new_v4()]})),
  )
  .await;
  assert_eq!(resp.status(), StatusCode::CONFLICT);

  let roles = app.state.store.roles_for_principal(app.bob).await.unwrap();
  assert_eq!(roles.len(), 1);
  assert_eq!(roles[0].name, DEFAULT_ROLE);
}

// ─── Stats ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn stats_report_current_counts() {
  let app = test_app().await;
  let resp = send(&app, "GET", "/api/stats", Some(ALICE_TOKEN), None).await;
  let body = json_body(resp).await;
  assert_eq!(body["total_principals"], json!(2));
  assert_eq!(body["total_roles"], json!(2));
  assert_eq!(body["new_principals_today"], json!(2));
}

// ─── Avatars ─────────────────────────────────────────────────────────────────

async fn put_avatar(
  app: &TestApp,
  token: &str,
  media_type: &str,
  bytes: &'static [u8],
) -> axum::response::Response {
  let request = Request::builder()
    .method("PUT")
    .uri("/api/me/avatar")
    .header(header::AUTHORIZATION, format!("Bearer {token}"))
    .header(header::CONTENT_TYPE, media_type)
    .body(Body::from(bytes))
    .unwrap();
  app.router().oneshot(request).await.unwrap()
}

#[tokio::test]
async fn avatar_upload_serves_and_clears() {
  let app = test_app().await;

  let resp = put_avatar(&app, BOB_TOKEN, "image/png", b"fake png bytes").await;
  assert_eq!(resp.status(), StatusCode::OK);
  let body = json_body(resp).await;
  let reference = body["principal"]["avatar_ref"].as_str().unwrap().to_owned();
  assert!(reference.starts_with(BASE_URL));

  // The minted reference is actually served by this router.
  let path = reference.strip_prefix(BASE_URL).unwrap();
  let resp = send(&app, "GET", path, None, None).await;
  assert_eq!(resp.status(), StatusCode::OK);

  // Deleting clears the reference and removes the file.
  let resp = send(&app, "DELETE", "/api/me/avatar", Some(BOB_TOKEN), None).await;
  assert_eq!(resp.status(), StatusCode::OK);
  assert_eq!(json_body(resp).await["principal"]["avatar_ref"], json!(null));

  let resp = send(&app, "GET", path, None, None).await;
  assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn replacing_an_avatar_drops_the_old_file() {
  let app = test_app().await;

  let resp = put_avatar(&app, BOB_TOKEN, "image/png", b"first image").await;
  let first = json_body(resp).await["principal"]["avatar_ref"]
    .as_str()
    .unwrap()
    .to_owned();

  let resp = put_avatar(&app, BOB_TOKEN, "image/png", b"second image").await;
  let second = json_body(resp).await["principal"]["avatar_ref"]
    .as_str()
    .unwrap()
    .to_owned();
  assert_ne!(first, second);

  let old_path = first.strip_prefix(BASE_URL).unwrap();
  let resp = send(&app, "GET", old_path, None, None).await;
  assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn non_image_uploads_are_refused() {
  let app = test_app().await;
  let resp = put_avatar(&app, BOB_TOKEN, "text/plain", b"not an image").await;
  assert_eq!(resp.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);

  let profile =
    app.state.store.get_profile(app.bob).await.unwrap().unwrap();
  assert!(profile.principal.avatar_ref.is_none());
}
