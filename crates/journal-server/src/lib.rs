//! HTTP server assembly for the journal service.
//!
//! Wraps the [`journal_api`] router with request tracing and CORS, driven by
//! a [`ServerConfig`] deserialised from `config.toml` and `JOURNAL_*`
//! environment variables.

use std::path::PathBuf;

use axum::{
  Router,
  http::{HeaderValue, Method, header},
};
use chrono::Duration;
use journal_api::{AppState, SessionConfig, session::DEFAULT_COOKIE_NAME};
use journal_core::{bootstrap::SeedAccount, store::JournalStore};
use serde::Deserialize;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml`.
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ServerConfig {
  pub host:              String,
  pub port:              u16,
  pub store_path:        PathBuf,
  /// Browser origins allowed to call the API with credentials.
  pub cors_origins:      Vec<String>,
  pub cookie_name:       String,
  pub secure_cookies:    bool,
  pub session_ttl_hours: i64,
  /// Accounts created on startup when their email is not registered yet.
  pub accounts:          Vec<SeedAccount>,
}

impl Default for ServerConfig {
  fn default() -> Self {
    Self {
      host:              "127.0.0.1".to_string(),
      port:              5000,
      store_path:        PathBuf::from("journal.db"),
      cors_origins:      vec![
        "http://localhost:3000".to_string(),
        "http://localhost:5173".to_string(),
      ],
      cookie_name:       DEFAULT_COOKIE_NAME.to_string(),
      secure_cookies:    false,
      session_ttl_hours: 8,
      accounts:          Vec::new(),
    }
  }
}

impl ServerConfig {
  pub fn session_config(&self) -> SessionConfig {
    SessionConfig {
      cookie_name: self.cookie_name.clone(),
      ttl:         Duration::hours(self.session_ttl_hours.max(1)),
      secure:      self.secure_cookies,
    }
  }
}

// ─── Router ───────────────────────────────────────────────────────────────────

fn cors_layer(origins: &[String]) -> CorsLayer {
  let mut parsed = Vec::new();
  for origin in origins {
    match HeaderValue::from_str(origin) {
      Ok(value) => parsed.push(value),
      Err(err) => tracing::warn!("ignoring invalid CORS origin '{origin}': {err}"),
    }
  }

  CorsLayer::new()
    .allow_origin(parsed)
    .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
    .allow_headers([header::CONTENT_TYPE, header::ACCEPT])
    .allow_credentials(true)
}

/// Build the complete application: API routes plus tracing and CORS layers.
pub fn app<S>(state: AppState<S>, config: &ServerConfig) -> Router
where
  S: JournalStore + 'static,
{
  journal_api::router(state)
    .layer(TraceLayer::new_for_http())
    .layer(cors_layer(&config.cors_origins))
}

// ─── Integration tests ────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use std::sync::Arc;

  use axum::{
    body::Body,
    http::{Request, Response, StatusCode, header},
  };
  use journal_core::bootstrap::bootstrap;
  use journal_store_sqlite::SqliteStore;
  use serde_json::{Value, json};
  use tower::ServiceExt as _;

  use super::*;

  async fn make_app() -> Router {
    let store = SqliteStore::open_in_memory().await.unwrap();
    bootstrap(&store, &[]).await.unwrap();
    let config = ServerConfig::default();
    app(AppState::new(Arc::new(store), config.session_config()), &config)
  }

  async fn oneshot_raw(
    app:    &Router,
    method: &str,
    uri:    &str,
    cookie: Option<&str>,
    body:   Option<Value>,
  ) -> Response<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(cookie) = cookie {
      builder = builder.header(header::COOKIE, cookie);
    }
    let body = match body {
      Some(json) => {
        builder = builder.header(header::CONTENT_TYPE, "application/json");
        Body::from(json.to_string())
      }
      None => Body::empty(),
    };
    app.clone().oneshot(builder.body(body).unwrap()).await.unwrap()
  }

  async fn json_body(resp: Response<Body>) -> Value {
    let bytes = axum::body::to_bytes(resp.into_body(), 1 << 20).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
  }

  /// `name=value` of the session cookie set by `resp`.
  fn session_cookie(resp: &Response<Body>) -> String {
    let raw = resp
      .headers()
      .get(header::SET_COOKIE)
      .expect("set-cookie header")
      .to_str()
      .unwrap();
    raw.split(';').next().unwrap().to_string()
  }

  async fn register(app: &Router, email: &str) -> String {
    let resp = oneshot_raw(
      app,
      "POST",
      "/auth/register",
      None,
      Some(json!({
        "email": email,
        "password": "TestPassword123",
        "displayName": email.split('@').next().unwrap(),
      })),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    session_cookie(&resp)
  }

  fn entry(emotions: Value) -> Value {
    json!({
      "title": "Title",
      "content": "Content",
      "recipient": "Me",
      "entryTypeId": 1,
      "emotionIds": emotions,
    })
  }

  // ── Auth ───────────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn register_login_me_logout() {
    let app = make_app().await;
    let cookie = register(&app, "test@example.com").await;

    let resp = oneshot_raw(&app, "GET", "/auth/me", Some(&cookie), None).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let me = json_body(resp).await;
    assert_eq!(me["email"], "test@example.com");
    assert_eq!(me["isAdmin"], false);
    assert!(me.get("passwordHash").is_none());

    let resp = oneshot_raw(
      &app,
      "POST",
      "/auth/login",
      None,
      Some(json!({ "email": "TEST@example.com", "password": "TestPassword123" })),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let second = session_cookie(&resp);
    assert_ne!(second, cookie);

    let resp = oneshot_raw(&app, "POST", "/auth/logout", Some(&cookie), None).await;
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);

    let resp = oneshot_raw(&app, "GET", "/auth/me", Some(&cookie), None).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    let resp = oneshot_raw(&app, "GET", "/auth/me", Some(&second), None).await;
    assert_eq!(resp.status(), StatusCode::OK);
  }

  #[tokio::test]
  async fn login_failures_are_401() {
    let app = make_app().await;
    register(&app, "a@example.com").await;

    for body in [
      json!({ "email": "a@example.com", "password": "WrongPassword1" }),
      json!({ "email": "nobody@example.com", "password": "TestPassword123" }),
    ] {
      let resp = oneshot_raw(&app, "POST", "/auth/login", None, Some(body)).await;
      assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    }
  }

  #[tokio::test]
  async fn registration_rejections() {
    let app = make_app().await;
    register(&app, "a@example.com").await;

    let resp = oneshot_raw(
      &app,
      "POST",
      "/auth/register",
      None,
      Some(json!({ "email": "a@example.com", "password": "TestPassword123", "displayName": "A" })),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json_body(resp).await["error"], "A user with this email already exists.");

    let resp = oneshot_raw(
      &app,
      "POST",
      "/auth/register",
      None,
      Some(json!({ "email": "b@example.com", "password": "weak", "displayName": "B" })),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let message = json_body(resp).await["error"].as_str().unwrap().to_string();
    assert!(message.starts_with("Registration failed: "), "{message}");
    assert!(message.contains(", "), "{message}");
  }

  #[tokio::test]
  async fn protected_routes_need_a_session() {
    let app = make_app().await;
    for (method, uri) in [
      ("GET", "/auth/me"),
      ("GET", "/api/entries"),
      ("GET", "/api/entries/1"),
      ("DELETE", "/api/entries/1"),
      ("GET", "/api/entries/count"),
      ("GET", "/api/emotions"),
      ("GET", "/api/emotions/stats"),
      ("GET", "/api/user/profile"),
      ("GET", "/api/admin/statistics"),
    ] {
      let resp = oneshot_raw(&app, method, uri, None, None).await;
      assert_eq!(resp.status(), StatusCode::UNAUTHORIZED, "{method} {uri}");
      assert!(json_body(resp).await["error"].is_string());
    }
  }

  // ── Catalogs ───────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn entry_types_are_public() {
    let app = make_app().await;
    let resp = oneshot_raw(&app, "GET", "/api/entrytypes", None, None).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let types = json_body(resp).await;
    assert_eq!(types.as_array().unwrap().len(), 5);
    assert!(types[0]["typeName"].is_string());

    let cookie = register(&app, "a@example.com").await;
    let resp = oneshot_raw(&app, "GET", "/api/emotions", Some(&cookie), None).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(json_body(resp).await.as_array().unwrap().len(), 10);
  }

  // ── Entries ────────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn create_then_fetch_entry() {
    let app = make_app().await;
    let cookie = register(&app, "a@example.com").await;

    let resp =
      oneshot_raw(&app, "POST", "/api/entries", Some(&cookie), Some(entry(json!([2, 2, 3])))).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let location = resp.headers()[header::LOCATION].to_str().unwrap().to_string();
    let created = json_body(resp).await;
    assert_eq!(location, format!("/api/entries/{}", created["id"]));
    assert_eq!(created["entryType"]["typeName"], "Memory");
    let ids: Vec<i64> = created["emotions"]
      .as_array()
      .unwrap()
      .iter()
      .map(|e| e["id"].as_i64().unwrap())
      .collect();
    assert_eq!(ids, vec![2, 3]);

    let resp = oneshot_raw(&app, "GET", &location, Some(&cookie), None).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(json_body(resp).await, created);

    let resp = oneshot_raw(&app, "GET", "/api/entries/count", Some(&cookie), None).await;
    assert_eq!(json_body(resp).await, json!({ "count": 1 }));
  }

  #[tokio::test]
  async fn invalid_entries_are_400() {
    let app = make_app().await;
    let cookie = register(&app, "a@example.com").await;

    for body in [
      entry(json!([])),
      json!({ "title": "", "content": "C", "entryTypeId": 1, "emotionIds": [1] }),
      json!({ "title": "T", "content": "C", "entryTypeId": 99, "emotionIds": [1] }),
      entry(json!([1, 500])),
    ] {
      let resp = oneshot_raw(&app, "POST", "/api/entries", Some(&cookie), Some(body)).await;
      assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }
  }

  #[tokio::test]
  async fn null_and_mistyped_fields_are_json_400s() {
    let app = make_app().await;
    let cookie = register(&app, "a@example.com").await;

    for body in [
      json!({ "title": "T", "content": "C", "entryTypeId": 1, "emotionIds": null }),
      json!({ "title": null, "content": "C", "entryTypeId": 1, "emotionIds": [1] }),
      json!({ "title": "T", "content": "C", "entryTypeId": null, "emotionIds": [1] }),
      json!({ "title": "T", "content": "C", "entryTypeId": "1", "emotionIds": [1] }),
      json!({ "title": "T", "content": "C", "entryTypeId": 1, "emotionIds": "1" }),
    ] {
      let resp = oneshot_raw(&app, "POST", "/api/entries", Some(&cookie), Some(body)).await;
      assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
      assert!(json_body(resp).await["error"].is_string());
    }

    let body = json!({ "title": "T", "content": "C", "recipient": null, "entryTypeId": 1, "emotionIds": [1] });
    let resp = oneshot_raw(&app, "POST", "/api/entries", Some(&cookie), Some(body)).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    assert_eq!(json_body(resp).await["recipient"], "");

    let resp = oneshot_raw(&app, "GET", "/api/entries/abc", Some(&cookie), None).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert!(json_body(resp).await["error"].is_string());

    let resp = oneshot_raw(&app, "GET", "/api/entries?page=abc", Some(&cookie), None).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert!(json_body(resp).await["error"].is_string());

    for (uri, body) in [
      ("/auth/register", json!({ "email": null, "password": null, "displayName": null })),
      ("/auth/register", json!({ "email": 1, "password": "Password123", "displayName": "x" })),
      ("/auth/login", json!({ "email": ["a@example.com"], "password": "Password123" })),
    ] {
      let resp = oneshot_raw(&app, "POST", uri, None, Some(body)).await;
      assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
      assert!(json_body(resp).await["error"].is_string());
    }

    let body = json!({ "displayName": 42 });
    let resp = oneshot_raw(&app, "PUT", "/api/user/profile", Some(&cookie), Some(body)).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert!(json_body(resp).await["error"].is_string());
    let body = json!({ "displayName": null });
    let resp = oneshot_raw(&app, "PUT", "/api/user/profile", Some(&cookie), Some(body)).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert!(json_body(resp).await["error"].is_string());
  }

  #[tokio::test]
  async fn other_users_entries_are_forbidden() {
    let app = make_app().await;
    let alice = register(&app, "alice@example.com").await;
    let bob = register(&app, "bob@example.com").await;

    let resp = oneshot_raw(&app, "POST", "/api/entries", Some(&alice), Some(entry(json!([1])))).await;
    let id = json_body(resp).await["id"].as_i64().unwrap();
    let uri = format!("/api/entries/{id}");

    let resp = oneshot_raw(&app, "GET", &uri, Some(&bob), None).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    let resp = oneshot_raw(&app, "PUT", &uri, Some(&bob), Some(entry(json!([2])))).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    let resp = oneshot_raw(&app, "DELETE", &uri, Some(&bob), None).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    let resp = oneshot_raw(&app, "GET", "/api/entries", Some(&bob), None).await;
    assert_eq!(json_body(resp).await["totalCount"], 0);

    let resp = oneshot_raw(&app, "DELETE", &uri, Some(&alice), None).await;
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);
    let resp = oneshot_raw(&app, "DELETE", &uri, Some(&alice), None).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
  }

  #[tokio::test]
  async fn update_replaces_the_entry() {
    let app = make_app().await;
    let cookie = register(&app, "a@example.com").await;
    let resp = oneshot_raw(&app, "POST", "/api/entries", Some(&cookie), Some(entry(json!([1, 2])))).await;
    let id = json_body(resp).await["id"].as_i64().unwrap();
    let uri = format!("/api/entries/{id}");

    let replacement = json!({
      "title": "New",
      "content": "Body",
      "recipient": "",
      "entryTypeId": 3,
      "emotionIds": [4],
    });
    let resp = oneshot_raw(&app, "PUT", &uri, Some(&cookie), Some(replacement)).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let updated = json_body(resp).await;
    assert_eq!(updated["title"], "New");
    assert_eq!(updated["recipient"], "");
    assert_eq!(updated["entryType"]["typeName"], "Gratitude");
    assert_eq!(updated["emotions"], json!([{ "id": 4, "emotionName": "Peaceful" }]));

    let resp = oneshot_raw(&app, "PUT", "/api/entries/9999", Some(&cookie), Some(entry(json!([1])))).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
  }

  #[tokio::test]
  async fn pagination_over_http() {
    let app = make_app().await;
    let cookie = register(&app, "a@example.com").await;
    for _ in 0..15 {
      oneshot_raw(&app, "POST", "/api/entries", Some(&cookie), Some(entry(json!([1])))).await;
    }

    let resp = oneshot_raw(&app, "GET", "/api/entries?page=2&pageSize=10", Some(&cookie), None).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let page = json_body(resp).await;
    assert_eq!(page["data"].as_array().unwrap().len(), 5);
    assert_eq!(page["page"], 2);
    assert_eq!(page["pageSize"], 10);
    assert_eq!(page["totalCount"], 15);
    assert_eq!(page["totalPages"], 2);

    let resp = oneshot_raw(&app, "GET", "/api/entries", Some(&cookie), None).await;
    assert_eq!(json_body(resp).await["data"].as_array().unwrap().len(), 10);

    let resp = oneshot_raw(&app, "GET", "/api/entries?page=0", Some(&cookie), None).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
  }

  #[tokio::test]
  async fn emotion_stats_over_http() {
    let app = make_app().await;
    let cookie = register(&app, "a@example.com").await;
    oneshot_raw(&app, "POST", "/api/entries", Some(&cookie), Some(entry(json!([1, 2])))).await;
    oneshot_raw(&app, "POST", "/api/entries", Some(&cookie), Some(entry(json!([2])))).await;

    let resp = oneshot_raw(&app, "GET", "/api/emotions/stats", Some(&cookie), None).await;
    assert_eq!(
      json_body(resp).await,
      json!([{ "emotion": "Sad", "count": 2 }, { "emotion": "Happy", "count": 1 }])
    );
  }

  // ── Profile ────────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn profile_update_and_delete() {
    let app = make_app().await;
    let cookie = register(&app, "a@example.com").await;

    let resp = oneshot_raw(
      &app,
      "PUT",
      "/api/user/profile",
      Some(&cookie),
      Some(json!({ "displayName": "  " })),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let resp = oneshot_raw(
      &app,
      "PUT",
      "/api/user/profile",
      Some(&cookie),
      Some(json!({ "displayName": "Renamed" })),
    )
    .await;
    assert_eq!(json_body(resp).await["displayName"], "Renamed");

    let resp = oneshot_raw(&app, "DELETE", "/api/user/profile", Some(&cookie), None).await;
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);
    let resp = oneshot_raw(&app, "GET", "/api/user/profile", Some(&cookie), None).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
  }

  // ── Admin ──────────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn admin_surface() {
    let store = SqliteStore::open_in_memory().await.unwrap();
    let hash = journal_api::password::hash_password_blocking("AdminPassword1").unwrap();
    let accounts = vec![SeedAccount {
      email:         "admin@example.com".into(),
      display_name:  "Admin".into(),
      password_hash: hash,
      admin:         true,
    }];
    bootstrap(&store, &accounts).await.unwrap();
    let config = ServerConfig::default();
    let app = app(AppState::new(Arc::new(store), config.session_config()), &config);

    let user = register(&app, "user@example.com").await;
    oneshot_raw(&app, "POST", "/api/entries", Some(&user), Some(entry(json!([1])))).await;

    let resp = oneshot_raw(
      &app,
      "POST",
      "/auth/login",
      None,
      Some(json!({ "email": "admin@example.com", "password": "AdminPassword1" })),
    )
    .await;
    let admin = session_cookie(&resp);
    let admin_id = json_body(resp).await["id"].as_str().unwrap().to_string();

    let resp = oneshot_raw(&app, "GET", "/api/admin/users", Some(&user), None).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    let resp = oneshot_raw(&app, "GET", "/api/admin/users", Some(&admin), None).await;
    let users = json_body(resp).await;
    let names: Vec<&str> = users
      .as_array()
      .unwrap()
      .iter()
      .map(|u| u["displayName"].as_str().unwrap())
      .collect();
    assert_eq!(names, vec!["Admin", "user"]);
    assert_eq!(users[1]["entryCount"], 1);
    let user_id = users[1]["id"].as_str().unwrap().to_string();

    let resp = oneshot_raw(&app, "GET", "/api/admin/statistics", Some(&admin), None).await;
    let stats = json_body(resp).await;
    assert_eq!(stats["totalUsers"], 2);
    assert_eq!(stats["totalEntries"], 1);
    assert_eq!(stats["mostUsedEntryTypes"][0], json!({ "type": "Memory", "count": 1 }));

    let uri = format!("/api/admin/users/{user_id}");
    let resp = oneshot_raw(&app, "DELETE", &uri, Some(&user), None).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    let resp = oneshot_raw(&app, "DELETE", &format!("/api/admin/users/{admin_id}"), Some(&admin), None).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let resp = oneshot_raw(&app, "DELETE", &uri, Some(&admin), None).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(json_body(resp).await["message"], "User user deleted successfully");

    let resp = oneshot_raw(&app, "GET", &uri, Some(&admin), None).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    for method in ["GET", "DELETE"] {
      let resp = oneshot_raw(&app, method, "/api/admin/users/not-a-user", Some(&admin), None).await;
      assert_eq!(resp.status(), StatusCode::NOT_FOUND);
      assert!(json_body(resp).await["error"].is_string());
    }
    let resp = oneshot_raw(&app, "GET", "/auth/me", Some(&user), None).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
  }

  // ── CORS ───────────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn cors_allows_configured_origin_with_credentials() {
    let app = make_app().await;
    let req = Request::builder()
      .method("GET")
      .uri("/api/entrytypes")
      .header(header::ORIGIN, "http://localhost:5173")
      .body(Body::empty())
      .unwrap();
    let resp = app.oneshot(req).await.unwrap();
    assert_eq!(
      resp.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN],
      "http://localhost:5173"
    );
    assert_eq!(resp.headers()[header::ACCESS_CONTROL_ALLOW_CREDENTIALS], "true");
  }
}
