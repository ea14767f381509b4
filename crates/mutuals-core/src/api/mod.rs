//! REST API client module for Instagram's web API.
//!
//! This module provides the `InstagramClient` for logging in, resolving
//! usernames to profiles and paging through follower lists.
//!
//! Authentication is cookie based: the login exchange yields a `sessionid`
//! cookie which is replayed on every later request.

pub mod client;
pub mod error;

pub use client::InstagramClient;
pub use error::ApiError;
