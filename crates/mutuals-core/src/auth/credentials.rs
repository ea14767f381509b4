use std::fmt;

/// Environment variable holding the account username
pub const USERNAME_VAR: &str = "INSTAGRAM_USERNAME";

/// Environment variable holding the account password
pub const PASSWORD_VAR: &str = "INSTAGRAM_PASSWORD";

/// Login credentials for the account used to query Instagram.
///
/// The password is optional so that a run with a stored session never needs
/// one; it is only demanded when a fresh login is required.
#[derive(Clone)]
pub struct Credentials {
    username: String,
    password: Option<String>,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: Option<String>) -> Self {
        Self {
            username: username.into(),
            password: password.filter(|p| !p.is_empty()),
        }
    }

    /// Read credentials through `lookup` (normally `std::env::var`).
    /// Returns `None` when no username is configured.
    pub fn from_lookup<F>(lookup: F) -> Option<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let username = lookup(USERNAME_VAR)
            .map(|u| u.trim().to_string())
            .filter(|u| !u.is_empty())?;
        Some(Self::new(username, lookup(PASSWORD_VAR)))
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn password(&self) -> Option<&str> {
        self.password.as_deref()
    }

    pub fn has_password(&self) -> bool {
        self.password.is_some()
    }

    pub fn set_password(&mut self, password: String) {
        self.password = Some(password).filter(|p| !p.is_empty());
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}
