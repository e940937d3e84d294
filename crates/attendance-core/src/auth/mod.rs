//! Authentication state: credentials from the login form and the
//! persisted session.
//!
//! This module provides:
//! - `Credentials`: validated, never-persisted login input
//! - `SessionStore`: save/load/clear of the token and user record
//!
//! The token is kept in a cookie jar with a 7-day lifetime and the user
//! record in page storage; both live in the cache directory.

pub mod cookie;
pub mod credentials;
pub mod session;
pub mod storage;

pub use credentials::Credentials;
pub use session::{Session, SessionStore};
