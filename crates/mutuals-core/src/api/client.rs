//! API client for communicating with Instagram's web API.
//!
//! This module provides the `InstagramClient` struct for the login exchange
//! and for authenticated requests that resolve profiles and page through
//! their followers.

use std::collections::{BTreeMap, HashSet};
use std::time::Duration;

use chrono::Utc;
use reqwest::{header, Client};
use serde::de::DeserializeOwned;
use tracing::{debug, instrument, warn};

use crate::auth::session::{SessionData, CSRF_COOKIE, SESSION_COOKIE};
use crate::models::{FollowerSet, FollowersPage, LoginResponse, Profile, WebProfileInfoResponse};

use super::ApiError;

// ============================================================================
// Constants
// ============================================================================

/// Default base URL for all endpoints
pub const DEFAULT_BASE_URL: &str = "https://www.instagram.com";

/// Application id the web client sends with every API call
const IG_APP_ID: &str = "936619743392459";

/// Desktop browser user agent; the web API rejects obvious bots
const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
    (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36";

/// HTTP request timeout in seconds
pub const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Followers requested per page
pub const DEFAULT_PAGE_SIZE: u32 = 50;

/// API client for Instagram.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Clone)]
pub struct InstagramClient {
    client: Client,
    base_url: String,
    page_size: u32,
    session: Option<SessionData>,
}

impl InstagramClient {
    /// Create a new API client for `base_url`
    pub fn new(base_url: &str) -> Result<Self, ApiError> {
        Self::with_timeout(base_url, Duration::from_secs(REQUEST_TIMEOUT_SECS))
    }

    pub fn with_timeout(base_url: &str, timeout: Duration) -> Result<Self, ApiError> {
        let mut headers = header::HeaderMap::new();
        headers.insert("x-ig-app-id", header::HeaderValue::from_static(IG_APP_ID));
        headers.insert(
            "x-requested-with",
            header::HeaderValue::from_static("XMLHttpRequest"),
        );

        let client = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .default_headers(headers)
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            page_size: DEFAULT_PAGE_SIZE,
            session: None,
        })
    }

    pub fn set_page_size(&mut self, page_size: u32) {
        self.page_size = page_size.max(1);
    }

    /// Create a new client with the given session, sharing the connection pool.
    pub fn with_session(&self, session: SessionData) -> Self {
        Self {
            client: self.client.clone(), // Cheap clone, shares connection pool
            base_url: self.base_url.clone(),
            page_size: self.page_size,
            session: Some(session),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Log in with username and password and return the resulting session.
    ///
    /// The web login is a two step exchange: a plain page load hands out the
    /// `csrftoken` cookie, which must be echoed back with the credentials.
    #[instrument(skip(self, password))]
    pub async fn authenticate(&self, username: &str, password: &str) -> Result<SessionData, ApiError> {
        let response = self.client.get(self.url("/")).send().await?;
        let mut cookies = collect_cookies(&response);
        Self::check_response(response).await?;

        let csrf = cookies
            .get(CSRF_COOKIE)
            .cloned()
            .ok_or_else(|| ApiError::InvalidResponse("no csrftoken cookie issued".to_string()))?;

        let enc_password = format!(
            "#PWD_INSTAGRAM_BROWSER:0:{}:{}",
            Utc::now().timestamp(),
            password
        );

        let response = self
            .client
            .post(self.url("/api/v1/web/accounts/login/ajax/"))
            .header("X-CSRFToken", &csrf)
            .header(header::COOKIE, cookie_header(&cookies))
            .header(header::REFERER, self.url("/accounts/login/"))
            .form(&[
                ("username", username),
                ("enc_password", enc_password.as_str()),
                ("queryParams", "{}"),
                ("optIntoOneTap", "false"),
            ])
            .send()
            .await?;

        cookies.extend(collect_cookies(&response));

        // Checkpoint and two-factor challenges come back as 400 with a JSON body
        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() && status != reqwest::StatusCode::BAD_REQUEST {
            return Err(ApiError::from_status(status, &body));
        }

        let login: LoginResponse = serde_json::from_str(&body).map_err(|e| {
            ApiError::InvalidResponse(format!("unparseable login response ({}): {}", status, e))
        })?;
        check_login(&login)?;

        if !cookies.contains_key(SESSION_COOKIE) {
            return Err(ApiError::InvalidResponse(
                "login succeeded but no sessionid cookie was issued".to_string(),
            ));
        }

        let mut session = SessionData::new(username, cookies);
        if let Some(user_id) = login.user_id {
            session.user_id = Some(user_id);
        }
        debug!(user_id = ?session.user_id, "Authentication successful");
        Ok(session)
    }

    fn auth_headers(&self) -> Result<header::HeaderMap, ApiError> {
        let mut headers = header::HeaderMap::new();
        if let Some(ref session) = self.session {
            headers.insert(
                header::COOKIE,
                header::HeaderValue::from_str(&session.cookie_header())
                    .map_err(|e| ApiError::InvalidResponse(format!("invalid session cookie: {}", e)))?,
            );
            if let Some(csrf) = session.csrf_token() {
                if let Ok(value) = header::HeaderValue::from_str(csrf) {
                    headers.insert("x-csrftoken", value);
                }
            }
        }
        Ok(headers)
    }

    /// Check if response is successful, returning an error with body if not.
    async fn check_response(response: reqwest::Response) -> Result<reqwest::Response, ApiError> {
        if response.status().is_success() {
            Ok(response)
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            Err(ApiError::from_status(status, &body))
        }
    }

    async fn get<T: DeserializeOwned>(&self, path: &str, query: &[(&str, &str)]) -> Result<T, ApiError> {
        let response = self
            .client
            .get(self.url(path))
            .headers(self.auth_headers()?)
            .query(query)
            .send()
            .await?;

        let response = Self::check_response(response).await?;
        let text = response.text().await?;
        serde_json::from_str(&text)
            .map_err(|e| ApiError::InvalidResponse(format!("{} from {}", e, path)))
    }

    // ===== Data Fetching Methods =====

    /// Resolve a username to its profile
    pub async fn fetch_profile(&self, username: &str) -> Result<Profile, ApiError> {
        let response: WebProfileInfoResponse = self
            .get("/api/v1/users/web_profile_info/", &[("username", username)])
            .await?;

        response
            .data
            .user
            .map(|u| u.to_profile())
            .ok_or_else(|| ApiError::NotFound(format!("profile {}", username)))
    }

    /// Fetch one page of a profile's followers
    pub async fn fetch_followers_page(
        &self,
        user_id: &str,
        cursor: Option<&str>,
    ) -> Result<FollowersPage, ApiError> {
        let path = format!("/api/v1/friendships/{}/followers/", user_id);
        let count = self.page_size.to_string();
        let mut query = vec![("count", count.as_str())];
        if let Some(cursor) = cursor {
            query.push(("max_id", cursor));
        }
        self.get(&path, &query).await
    }

    /// Page through every follower of `profile`
    pub async fn fetch_all_followers(&self, profile: &Profile) -> Result<FollowerSet, ApiError> {
        let mut followers: FollowerSet = FollowerSet::new();
        let mut cursor: Option<String> = None;
        let mut seen: HashSet<String> = HashSet::new();
        let mut pages = 0usize;

        loop {
            let page = self.fetch_followers_page(&profile.id, cursor.as_deref()).await?;
            pages += 1;
            followers.extend(page.users.into_iter());

            match page.next_max_id {
                // A repeated cursor would page forever
                Some(next) if !seen.insert(next.clone()) => {
                    warn!(profile = %profile.username, cursor = %next, "Follower cursor repeated, stopping");
                    break;
                }
                Some(next) => cursor = Some(next),
                None => break,
            }
        }

        debug!(
            profile = %profile.username,
            pages = pages,
            followers = followers.len(),
            expected = ?profile.follower_count,
            "Follower pages complete"
        );
        Ok(followers)
    }
}

/// Map a parsed login body to success or the reason it was refused
fn check_login(login: &LoginResponse) -> Result<(), ApiError> {
    if login.authenticated {
        return Ok(());
    }
    let reason = if login.two_factor_required {
        "two-factor authentication required".to_string()
    } else if let Some(ref url) = login.checkpoint_url {
        format!("checkpoint required: {}", url)
    } else if login.user == Some(false) {
        "user does not exist".to_string()
    } else {
        login
            .message
            .clone()
            .unwrap_or_else(|| "wrong password".to_string())
    };
    Err(ApiError::LoginRejected(reason))
}

fn collect_cookies(response: &reqwest::Response) -> BTreeMap<String, String> {
    response
        .cookies()
        .filter(|c| !c.value().is_empty())
        .map(|c| (c.name().to_string(), c.value().to_string()))
        .collect()
}

fn cookie_header(cookies: &BTreeMap<String, String>) -> String {
    cookies
        .iter()
        .map(|(name, value)| format!("{}={}", name, value))
        .collect::<Vec<_>>()
        .join("; ")
}

impl std::fmt::Debug for InstagramClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InstagramClient")
            .field("base_url", &self.base_url)
            .field("page_size", &self.page_size)
            .field("authenticated", &self.session.is_some())
            .finish()
    }
}
