//! Run configuration.
//!
//! Configuration comes from the process environment (after `.env` has been
//! loaded by the binary). Command-line flags override individual fields.
//!
//! | Variable              | Default                     |
//! |-----------------------|-----------------------------|
//! | `INSTAGRAM_USERNAME`  | required                    |
//! | `INSTAGRAM_PASSWORD`  | prompted when a login is due |
//! | `MUTUALS_BASE_URL`    | `https://www.instagram.com` |
//! | `MUTUALS_SESSION_DIR` | `.`                         |
//! | `MUTUALS_RESULTS_DIR` | `results`                   |
//! | `MUTUALS_CONCURRENCY` | `1`                         |
//! | `MUTUALS_PAGE_SIZE`   | `50`                        |

use std::path::PathBuf;
use std::time::Duration;

use crate::api::client::{DEFAULT_BASE_URL, DEFAULT_PAGE_SIZE, REQUEST_TIMEOUT_SECS};
use crate::api::{ApiError, InstagramClient};
use crate::auth::credentials::USERNAME_VAR;
use crate::auth::{Credentials, Session};
use crate::error::MutualsError;
use crate::intersect::{IntersectOptions, DEFAULT_CONCURRENCY};
use crate::results::{ResultWriter, DEFAULT_RESULTS_DIR};

const BASE_URL_VAR: &str = "MUTUALS_BASE_URL";
const SESSION_DIR_VAR: &str = "MUTUALS_SESSION_DIR";
const RESULTS_DIR_VAR: &str = "MUTUALS_RESULTS_DIR";
const CONCURRENCY_VAR: &str = "MUTUALS_CONCURRENCY";
const PAGE_SIZE_VAR: &str = "MUTUALS_PAGE_SIZE";

#[derive(Debug, Clone)]
pub struct Config {
    pub credentials: Credentials,
    pub base_url: String,
    pub session_dir: PathBuf,
    pub results_dir: PathBuf,
    pub concurrency: usize,
    pub page_size: u32,
    pub request_timeout: Duration,
    pub fail_fast: bool,
}

impl Config {
    /// Load from the process environment
    pub fn from_env() -> Result<Self, MutualsError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load through `lookup`, which maps a variable name to its value
    pub fn from_lookup<F>(lookup: F) -> Result<Self, MutualsError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let credentials = Credentials::from_lookup(&lookup)
            .ok_or_else(|| MutualsError::Config(format!("{} is not set", USERNAME_VAR)))?;

        let non_empty = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        Ok(Self {
            credentials,
            base_url: non_empty(BASE_URL_VAR).unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            session_dir: non_empty(SESSION_DIR_VAR)
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(".")),
            results_dir: non_empty(RESULTS_DIR_VAR)
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_RESULTS_DIR)),
            concurrency: parse_var(CONCURRENCY_VAR, non_empty(CONCURRENCY_VAR))?
                .unwrap_or(DEFAULT_CONCURRENCY)
                .max(1),
            page_size: parse_var(PAGE_SIZE_VAR, non_empty(PAGE_SIZE_VAR))?
                .unwrap_or(DEFAULT_PAGE_SIZE)
                .max(1),
            request_timeout: Duration::from_secs(REQUEST_TIMEOUT_SECS),
            fail_fast: false,
        })
    }

    pub fn username(&self) -> &str {
        self.credentials.username()
    }

    /// Client for the configured endpoint, not yet authenticated
    pub fn client(&self) -> Result<InstagramClient, ApiError> {
        let mut client = InstagramClient::with_timeout(&self.base_url, self.request_timeout)?;
        client.set_page_size(self.page_size);
        Ok(client)
    }

    pub fn session(&self) -> Session {
        Session::new(&self.session_dir, self.username())
    }

    pub fn result_writer(&self) -> ResultWriter {
        ResultWriter::new(&self.results_dir)
    }

    pub fn intersect_options(&self) -> IntersectOptions {
        IntersectOptions {
            concurrency: self.concurrency,
            fail_fast: self.fail_fast,
        }
    }
}

fn parse_var<T: std::str::FromStr>(key: &str, value: Option<String>) -> Result<Option<T>, MutualsError> {
    value
        .map(|v| {
            v.parse::<T>()
                .map_err(|_| MutualsError::Config(format!("{} has an invalid value: {}", key, v)))
        })
        .transpose()
}
