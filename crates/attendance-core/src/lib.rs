//! Core library for the attendance login client.
//!
//! - `api`: gateway client and its error taxonomy
//! - `auth`: credentials and the persisted session (cookie jar + page storage)
//! - `app`: the logged-out / logged-in state machine
//! - `config`: configuration file and environment overrides

pub mod api;
pub mod app;
pub mod auth;
pub mod config;

pub use api::{AuthResult, GatewayClient, GatewayError};
pub use app::{App, AppContext, StatusMessage, StatusTone, View};
pub use auth::{Credentials, Session, SessionStore};
pub use config::Config;
