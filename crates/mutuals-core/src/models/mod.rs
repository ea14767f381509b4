//! Data models for Instagram entities.
//!
//! This module contains the data structures used to represent
//! Instagram data including:
//!
//! - `Follower`, `FollowerSet`: follower identities keyed by user id
//! - `Profile`: a resolved profile handle (id, privacy, follower count)
//! - Wire types for the login, profile-info and followers endpoints

pub mod follower;
pub mod profile;

pub use follower::{Follower, FollowerSet, FollowersPage};
pub use profile::{LoginResponse, Profile, WebProfileInfoResponse};
