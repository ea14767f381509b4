//! Authentication module for managing the Instagram session.
//!
//! This module provides:
//! - `Credentials`: username/password read from the environment
//! - `Session`: cookie session persisted to `session-<username>`
//!
//! A stored session is reused on every run and never expires on its own.

pub mod credentials;
pub mod session;

pub use credentials::Credentials;
pub use session::{Session, SessionData};
