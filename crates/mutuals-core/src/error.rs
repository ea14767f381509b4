//! Run-level error taxonomy.
//!
//! Only `AuthenticationFailed` (and configuration problems discovered before
//! login) end the run. Fetch and write failures are reported and the run
//! carries on with an empty follower set or without an output file.

use std::path::PathBuf;

use thiserror::Error;

use crate::followers::FetchFailure;

#[derive(Error, Debug)]
pub enum MutualsError {
    #[error("Authentication failed for {username}: {reason}")]
    AuthenticationFailed { username: String, reason: String },

    #[error("Failed to fetch followers of {profile}: {reason}")]
    FetchFailed { profile: String, reason: FetchFailure },

    #[error("Failed to write results to {}: {source}", path.display())]
    WriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, MutualsError>;
