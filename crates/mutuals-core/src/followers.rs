//! Follower fetching.
//!
//! `FollowerSource` is the seam between the intersection logic and the
//! network: the engine only sees `(source, profile) -> outcome`, so it runs
//! the same against the live client and against in-memory fakes.

use async_trait::async_trait;
use thiserror::Error;
use tracing::{info, warn};

use crate::api::{ApiError, InstagramClient};
use crate::error::MutualsError;
use crate::models::FollowerSet;

/// Why the followers of a profile could not be fetched
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchFailure {
    #[error("profile not found")]
    NotFound,

    #[error("profile is private and not followed by this account")]
    PrivateProfile,

    #[error("rate limited")]
    RateLimited,

    #[error("session was rejected")]
    Unauthorized,

    #[error("access denied")]
    AccessDenied,

    #[error("network error: {0}")]
    Network(String),

    #[error("unexpected response: {0}")]
    InvalidResponse(String),
}

impl From<ApiError> for FetchFailure {
    fn from(err: ApiError) -> Self {
        match err {
            ApiError::NotFound(_) => FetchFailure::NotFound,
            ApiError::RateLimited => FetchFailure::RateLimited,
            ApiError::Unauthorized | ApiError::LoginRejected(_) => FetchFailure::Unauthorized,
            ApiError::AccessDenied(_) => FetchFailure::AccessDenied,
            ApiError::NetworkError(e) => FetchFailure::Network(e.to_string()),
            ApiError::ServerError(msg) => FetchFailure::Network(msg),
            ApiError::InvalidResponse(msg) => FetchFailure::InvalidResponse(msg),
        }
    }
}

/// Result of fetching one profile's followers.
///
/// Keeps "has no followers" (`Fetched` with an empty set) apart from
/// "could not be fetched" (`Failed`).
#[derive(Debug, Clone)]
pub enum FetchOutcome {
    Fetched(FollowerSet),
    Failed(FetchFailure),
}

impl FetchOutcome {
    pub fn is_failed(&self) -> bool {
        matches!(self, FetchOutcome::Failed(_))
    }

    /// The followers to intersect with; a failed fetch contributes nothing
    pub fn into_set(self) -> FollowerSet {
        match self {
            FetchOutcome::Fetched(set) => set,
            FetchOutcome::Failed(_) => FollowerSet::new(),
        }
    }
}

/// Anything that can list the followers of a profile
#[async_trait]
pub trait FollowerSource: Send + Sync {
    async fn followers(&self, profile: &str) -> Result<FollowerSet, FetchFailure>;
}

#[async_trait]
impl FollowerSource for InstagramClient {
    async fn followers(&self, profile: &str) -> Result<FollowerSet, FetchFailure> {
        let resolved = self.fetch_profile(profile).await?;
        if !resolved.followers_visible() {
            return Err(FetchFailure::PrivateProfile);
        }
        Ok(self.fetch_all_followers(&resolved).await?)
    }
}

/// Fetch the followers of `profile`, logging the outcome either way
pub async fn fetch_followers<S>(source: &S, profile: &str) -> FetchOutcome
where
    S: FollowerSource + ?Sized,
{
    match source.followers(profile).await {
        Ok(set) => {
            info!(profile = %profile, followers = set.len(), "Fetched followers");
            FetchOutcome::Fetched(set)
        }
        Err(reason) => {
            let err = MutualsError::FetchFailed {
                profile: profile.to_string(),
                reason: reason.clone(),
            };
            warn!(profile = %profile, error = %err, "Error fetching followers");
            FetchOutcome::Failed(reason)
        }
    }
}
