//! Core library for mutuals.
//!
//! Logs into Instagram (reusing a stored session when there is one), fetches
//! the followers of several profiles and writes the followers they all share
//! to a text file.
//!
//! - [`auth`]: credentials and the `session-<username>` session store
//! - [`api`]: HTTP client for the Instagram web API
//! - [`followers`]: the `FollowerSource` seam and explicit fetch outcomes
//! - [`intersect`]: concurrent fetch + in-order set intersection
//! - [`results`]: the results file writer
//! - [`runner`]: one complete run after login

pub mod api;
pub mod auth;
pub mod config;
pub mod error;
pub mod followers;
pub mod intersect;
pub mod models;
pub mod results;
pub mod runner;

pub use api::{ApiError, InstagramClient};
pub use auth::{Credentials, Session, SessionData};
pub use config::Config;
pub use error::MutualsError;
pub use followers::{fetch_followers, FetchFailure, FetchOutcome, FollowerSource};
pub use intersect::{intersect, CommonFollowers, IntersectOptions, ProfileReport, ProfileStatus};
pub use models::{Follower, FollowerSet, Profile};
pub use results::ResultWriter;
pub use runner::{find_common_followers, parse_profiles, RunSummary};
