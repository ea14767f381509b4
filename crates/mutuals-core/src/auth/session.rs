use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::api::InstagramClient;
use crate::auth::Credentials;
use crate::error::MutualsError;

#[cfg(unix)]
use std::os::unix::fs::PermissionsExt;

/// Session file name prefix; the username is appended
const SESSION_FILE_PREFIX: &str = "session-";

/// Cookie carrying the authenticated session
pub const SESSION_COOKIE: &str = "sessionid";

/// Cookie carrying the CSRF token echoed in `X-CSRFToken`
pub const CSRF_COOKIE: &str = "csrftoken";

/// Everything needed to replay an authenticated session.
/// There is no expiry: a stored session is reused until it is removed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionData {
    pub username: String,
    pub user_id: Option<String>,
    pub cookies: BTreeMap<String, String>,
    pub created_at: DateTime<Utc>,
}

impl SessionData {
    pub fn new(username: impl Into<String>, cookies: BTreeMap<String, String>) -> Self {
        Self {
            username: username.into(),
            user_id: cookies.get("ds_user_id").cloned(),
            cookies,
            created_at: Utc::now(),
        }
    }

    /// A session is only usable if it carries the session cookie
    pub fn is_authenticated(&self) -> bool {
        self.cookies
            .get(SESSION_COOKIE)
            .map(|v| !v.is_empty())
            .unwrap_or(false)
    }

    pub fn csrf_token(&self) -> Option<&str> {
        self.cookies.get(CSRF_COOKIE).map(String::as_str)
    }

    /// Value for the `Cookie` request header
    pub fn cookie_header(&self) -> String {
        self.cookies
            .iter()
            .map(|(name, value)| format!("{}={}", name, value))
            .collect::<Vec<_>>()
            .join("; ")
    }
}

/// Session persisted as `session-<username>` in a directory.
pub struct Session {
    dir: PathBuf,
    username: String,
    pub data: Option<SessionData>,
}

impl Session {
    pub fn new(dir: impl Into<PathBuf>, username: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            username: username.into(),
            data: None,
        }
    }

    /// Load session from disk.
    ///
    /// Unreadable, malformed or unauthenticated files count as absent: they
    /// are removed and `false` is returned so the caller logs in again.
    pub fn load(&mut self) -> bool {
        let path = self.session_path();
        if !path.exists() {
            return false;
        }

        match Self::read(&path, &self.username) {
            Ok(data) => {
                debug!(path = %path.display(), "Loaded stored session");
                self.data = Some(data);
                true
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Discarding unusable session file");
                if let Err(e) = fs::remove_file(&path) {
                    warn!(path = %path.display(), error = %e, "Failed to remove session file");
                }
                false
            }
        }
    }

    fn read(path: &Path, username: &str) -> Result<SessionData> {
        let contents = fs::read_to_string(path).context("Failed to read session file")?;
        let data: SessionData =
            serde_json::from_str(&contents).context("Failed to parse session file")?;

        if data.username != username {
            anyhow::bail!("session belongs to {}", data.username);
        }
        if !data.is_authenticated() {
            anyhow::bail!("session has no {} cookie", SESSION_COOKIE);
        }
        Ok(data)
    }

    /// Save session to disk
    pub fn save(&self) -> Result<()> {
        if let Some(ref data) = self.data {
            let path = self.session_path();
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)?;
            }
            let contents = serde_json::to_string_pretty(data)?;
            fs::write(&path, contents).context("Failed to write session file")?;

            // The file grants full account access
            #[cfg(unix)]
            {
                let mut perms = fs::metadata(&path)?.permissions();
                perms.set_mode(0o600);
                fs::set_permissions(&path, perms)?;
            }
        }
        Ok(())
    }

    /// Clear session data
    pub fn clear(&mut self) -> Result<()> {
        self.data = None;
        let path = self.session_path();
        if path.exists() {
            fs::remove_file(path).context("Failed to remove session file")?;
        }
        Ok(())
    }

    /// Update session with new data
    pub fn update(&mut self, data: SessionData) {
        self.data = Some(data);
    }

    /// Return a usable session, logging in only when none is stored.
    ///
    /// A failed login is the one fatal error of a run. Failing to persist a
    /// fresh session is only logged: the run can still use it.
    pub async fn ensure(
        &mut self,
        client: &InstagramClient,
        credentials: &Credentials,
    ) -> Result<SessionData, MutualsError> {
        if self.data.is_none() {
            self.load();
        }

        if let Some(ref data) = self.data {
            info!(username = %self.username, "Session loaded successfully");
            return Ok(data.clone());
        }

        let password = credentials.password().ok_or_else(|| MutualsError::AuthenticationFailed {
            username: credentials.username().to_string(),
            reason: "no stored session and no password available".to_string(),
        })?;

        info!(username = %credentials.username(), "No stored session, logging in");
        let data = client
            .authenticate(credentials.username(), password)
            .await
            .map_err(|e| MutualsError::AuthenticationFailed {
                username: credentials.username().to_string(),
                reason: e.to_string(),
            })?;

        self.update(data.clone());
        if let Err(e) = self.save() {
            warn!(error = %e, "Failed to save session");
        } else {
            info!(path = %self.session_path().display(), "Session saved");
        }

        Ok(data)
    }

    pub fn session_path(&self) -> PathBuf {
        self.dir
            .join(format!("{}{}", SESSION_FILE_PREFIX, self.username))
    }
}
