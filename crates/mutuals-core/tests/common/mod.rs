//! Shared fixtures for the integration tests.
#![allow(dead_code)]

use std::collections::{BTreeMap, HashMap};
use std::io;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use mutuals_core::auth::session::{CSRF_COOKIE, SESSION_COOKIE};
use mutuals_core::{FetchFailure, Follower, FollowerSet, FollowerSource, InstagramClient, SessionData};
use serde_json::{json, Value};
use wiremock::matchers::{body_string_contains, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const CSRF: &str = "csrf123";
pub const SESSION_ID: &str = "sess456";

/// Collects formatted log lines while its guard is held
#[derive(Clone, Default)]
pub struct LogCapture(Arc<Mutex<Vec<u8>>>);

impl LogCapture {
    /// Route this thread's tracing output into the capture
    pub fn install(&self) -> tracing::subscriber::DefaultGuard {
        let writer = self.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || writer.clone())
            .with_ansi(false)
            .without_time()
            .finish();
        tracing::subscriber::set_default(subscriber)
    }

    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().expect("log lock")).into_owned()
    }
}

impl io::Write for LogCapture {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().expect("log lock").extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

pub fn names(list: &[&str]) -> Vec<String> {
    list.iter().map(|n| n.to_string()).collect()
}

/// Followers whose id and username are both `name`
pub fn followers(list: &[&str]) -> FollowerSet {
    list.iter().map(|n| Follower::new(*n, *n)).collect()
}

pub fn display_names(set: &FollowerSet) -> Vec<String> {
    let mut names: Vec<String> = set.iter().map(|f| f.display_name().to_string()).collect();
    names.sort();
    names
}

pub fn stored_session(username: &str) -> SessionData {
    let mut cookies = BTreeMap::new();
    cookies.insert(CSRF_COOKIE.to_string(), CSRF.to_string());
    cookies.insert(SESSION_COOKIE.to_string(), SESSION_ID.to_string());
    cookies.insert("ds_user_id".to_string(), "42".to_string());
    SessionData::new(username, cookies)
}

pub fn client_for(server: &MockServer) -> InstagramClient {
    InstagramClient::new(&server.uri()).expect("client")
}

pub fn authed_client_for(server: &MockServer) -> InstagramClient {
    client_for(server).with_session(stored_session("me"))
}

// ============================================================================
// Mock Instagram endpoints
// ============================================================================

/// Landing page handing out the CSRF cookie
pub async fn mount_landing(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(
            ResponseTemplate::new(200)
                .append_header("set-cookie", format!("{}={}; Path=/", CSRF_COOKIE, CSRF).as_str())
                .set_body_string("<html></html>"),
        )
        .mount(server)
        .await;
}

/// Login endpoint accepting `username` and issuing a session cookie
pub async fn mount_login_success(server: &MockServer, username: &str) {
    Mock::given(method("POST"))
        .and(path("/api/v1/web/accounts/login/ajax/"))
        .and(header("x-csrftoken", CSRF))
        .and(body_string_contains(format!("username={}", username).as_str()))
        .respond_with(
            ResponseTemplate::new(200)
                .append_header("set-cookie", format!("{}={}; Path=/; HttpOnly", SESSION_COOKIE, SESSION_ID).as_str())
                .append_header("set-cookie", "ds_user_id=42; Path=/")
                .set_body_json(json!({
                    "user": true,
                    "userId": "42",
                    "authenticated": true,
                    "status": "ok"
                })),
        )
        .mount(server)
        .await;
}

pub async fn mount_login_response(server: &MockServer, status: u16, body: Value) {
    Mock::given(method("POST"))
        .and(path("/api/v1/web/accounts/login/ajax/"))
        .respond_with(ResponseTemplate::new(status).set_body_json(body))
        .mount(server)
        .await;
}

pub async fn mount_profile(server: &MockServer, username: &str, user_id: &str, is_private: bool) {
    Mock::given(method("GET"))
        .and(path("/api/v1/users/web_profile_info/"))
        .and(query_param("username", username))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": {
                "user": {
                    "id": user_id,
                    "username": username,
                    "is_private": is_private,
                    "followed_by_viewer": false,
                    "edge_followed_by": { "count": 3 }
                }
            },
            "status": "ok"
        })))
        .mount(server)
        .await;
}

fn users_json(list: &[&str]) -> Value {
    Value::Array(
        list.iter()
            .map(|n| json!({ "pk": n, "username": n, "full_name": "" }))
            .collect(),
    )
}

/// Serve `pages` of followers for `user_id`, linked by `max_id` cursors.
/// Cursor-specific mocks are mounted first so they win over the first page.
pub async fn mount_follower_pages(server: &MockServer, user_id: &str, pages: &[&[&str]]) {
    let follower_path = format!("/api/v1/friendships/{}/followers/", user_id);

    for (i, page) in pages.iter().enumerate().skip(1) {
        let mut body = json!({ "users": users_json(page), "status": "ok" });
        if i + 1 < pages.len() {
            body["next_max_id"] = json!(format!("cursor{}", i + 1));
        }
        Mock::given(method("GET"))
            .and(path(follower_path.as_str()))
            .and(query_param("max_id", format!("cursor{}", i).as_str()))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .mount(server)
            .await;
    }

    let first = pages.first().copied().unwrap_or(&[]);
    let mut body = json!({ "users": users_json(first), "status": "ok" });
    if pages.len() > 1 {
        body["next_max_id"] = json!("cursor1");
    }
    Mock::given(method("GET"))
        .and(path(follower_path.as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

// ============================================================================
// In-memory follower source
// ============================================================================

/// Follower source backed by a map, recording every profile it is asked for
#[derive(Default)]
pub struct FakeSource {
    profiles: HashMap<String, Result<FollowerSet, FetchFailure>>,
    delays: HashMap<String, Duration>,
    calls: Mutex<Vec<String>>,
}

impl FakeSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, profile: &str, list: &[&str]) -> Self {
        self.profiles.insert(profile.to_string(), Ok(followers(list)));
        self
    }

    pub fn failing(mut self, profile: &str, reason: FetchFailure) -> Self {
        self.profiles.insert(profile.to_string(), Err(reason));
        self
    }

    pub fn delayed(mut self, profile: &str, delay: Duration) -> Self {
        self.delays.insert(profile.to_string(), delay);
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().expect("calls lock").clone()
    }
}

#[async_trait]
impl FollowerSource for FakeSource {
    async fn followers(&self, profile: &str) -> Result<FollowerSet, FetchFailure> {
        self.calls.lock().expect("calls lock").push(profile.to_string());
        if let Some(delay) = self.delays.get(profile) {
            tokio::time::sleep(*delay).await;
        }
        self.profiles
            .get(profile)
            .cloned()
            .unwrap_or(Err(FetchFailure::NotFound))
    }
}
