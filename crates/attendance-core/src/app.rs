//! Login flow state for the attendance client.
//!
//! `App` is the two-state machine between the login view and the main
//! view. It is built once from an `AppContext` holding the configuration,
//! the session store and the gateway client, and it is the only writer of
//! the session store.

use std::path::Path;

use anyhow::Result;
use tracing::{debug, error, info, warn};

use crate::api::{GatewayClient, GatewayError};
use crate::auth::{Credentials, Session, SessionStore};
use crate::config::Config;

// ============================================================================
// State Types
// ============================================================================

/// Which view is shown
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    LoggedOut,
    LoggedIn,
}

/// Color hint for the login status line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusTone {
    Info,
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusMessage {
    pub text: String,
    pub tone: StatusTone,
}

impl StatusMessage {
    fn new(text: impl Into<String>, tone: StatusTone) -> Self {
        Self {
            text: text.into(),
            tone,
        }
    }
}

const LOGGING_IN_MESSAGE: &str = "Logging in...";
const LOGIN_SUCCESS_MESSAGE: &str = "Login successful!";

// ============================================================================
// Application Context
// ============================================================================

/// Everything the login flow talks to, constructed once at startup.
pub struct AppContext {
    pub config: Config,
    pub sessions: SessionStore,
    pub gateway: GatewayClient,
}

impl AppContext {
    pub fn new(config: Config, sessions: SessionStore, gateway: GatewayClient) -> Self {
        Self {
            config,
            sessions,
            gateway,
        }
    }

    /// Build the context from configuration, keeping session files in `cache_dir`
    pub fn from_config(config: Config, cache_dir: &Path) -> Result<Self> {
        let gateway = GatewayClient::new(config.endpoint_url(), config.request_timeout())?;
        debug!(endpoint = gateway.endpoint(), ?cache_dir, "Gateway configured");
        let sessions = SessionStore::new(cache_dir);
        Ok(Self::new(config, sessions, gateway))
    }
}

// ============================================================================
// Login Flow
// ============================================================================

pub struct App {
    ctx: AppContext,
    view: View,
    session: Option<Session>,
    status: Option<StatusMessage>,
}

impl App {
    /// Decide the initial view from whatever session is stored.
    pub fn start(ctx: AppContext) -> Self {
        let session = ctx.sessions.load();
        let view = if session.is_some() {
            info!("User is already logged in");
            View::LoggedIn
        } else {
            info!("User needs to log in");
            View::LoggedOut
        };

        Self {
            ctx,
            view,
            session,
            status: None,
        }
    }

    pub fn view(&self) -> View {
        self.view
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    pub fn status(&self) -> Option<&StatusMessage> {
        self.status.as_ref()
    }

    pub fn context(&self) -> &AppContext {
        &self.ctx
    }

    pub fn context_mut(&mut self) -> &mut AppContext {
        &mut self.ctx
    }

    /// Put the in-progress status on the login form.
    ///
    /// `submit` does this itself; front ends that redraw between frames call
    /// it first so the status is visible while the request is in flight.
    pub fn begin_submit(&mut self) {
        if self.view == View::LoggedOut {
            self.status = Some(StatusMessage::new(LOGGING_IN_MESSAGE, StatusTone::Info));
        }
    }

    /// Handle a login form submission.
    ///
    /// On success the session is saved before the view switches. On failure
    /// the view stays on the login form and the status line carries the
    /// reason, which is also returned.
    pub async fn submit(&mut self, username: &str, password: &str) -> Result<(), GatewayError> {
        if self.view == View::LoggedIn {
            warn!("Ignoring login submission while already logged in");
            return Ok(());
        }

        self.begin_submit();

        let credentials = match Credentials::new(username, password) {
            Ok(credentials) => credentials,
            Err(e) => {
                debug!("Login form incomplete");
                self.status = Some(StatusMessage::new(e.to_string(), StatusTone::Error));
                return Err(e);
            }
        };

        match self.ctx.gateway.authenticate(&credentials).await {
            Ok(session) => {
                if let Err(e) = self.ctx.sessions.save(&session) {
                    warn!(error = %e, "Failed to save session");
                }
                self.session = Some(session);
                self.view = View::LoggedIn;
                self.status = Some(StatusMessage::new(
                    LOGIN_SUCCESS_MESSAGE,
                    StatusTone::Success,
                ));
                info!(username = credentials.username(), "Login successful");
                Ok(())
            }
            Err(e) => {
                error!(error = %e, "Login failed");
                self.status = Some(StatusMessage::new(e.to_string(), StatusTone::Error));
                Err(e)
            }
        }
    }

    /// Clear the stored session and go back to the login view.
    ///
    /// The view always ends up `LoggedOut`; a storage failure is returned
    /// after the in-memory state has been reset.
    pub fn logout(&mut self) -> Result<()> {
        info!("Logging out");
        let result = self.ctx.sessions.clear();
        self.session = None;
        self.view = View::LoggedOut;
        self.status = None;
        result
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use mockito::{Mock, Server, ServerGuard};
    use serde_json::json;
    use tempfile::TempDir;

    fn context(server: &ServerGuard, cache_dir: &Path) -> AppContext {
        let gateway = GatewayClient::new(server.url(), Duration::from_secs(5)).unwrap();
        AppContext::new(Config::default(), SessionStore::new(cache_dir), gateway)
    }

    async fn mock_login(server: &mut ServerGuard, status: usize, body: &str, hits: usize) -> Mock {
        server
            .mock("POST", "/")
            .with_status(status)
            .with_body(body)
            .expect(hits)
            .create_async()
            .await
    }

    // -------------------------------------------------------------------------
    // Startup
    // -------------------------------------------------------------------------

    #[tokio::test]
    async fn test_start_without_session_is_logged_out() {
        let server = Server::new_async().await;
        let dir = TempDir::new().unwrap();

        let app = App::start(context(&server, dir.path()));
        assert_eq!(app.view(), View::LoggedOut);
        assert!(app.session().is_none());
        assert!(app.status().is_none());
    }

    #[tokio::test]
    async fn test_start_with_stored_session_skips_gateway() {
        let mut server = Server::new_async().await;
        let mock = mock_login(&mut server, 200, "{}", 0).await;
        let dir = TempDir::new().unwrap();

        let stored = Session {
            token: "T".to_string(),
            user: json!({"id": 1}),
            backend_version: Some("v3".to_string()),
        };
        SessionStore::new(dir.path()).save(&stored).unwrap();

        let app = App::start(context(&server, dir.path()));
        assert_eq!(app.view(), View::LoggedIn);
        assert_eq!(app.session(), Some(&stored));
        mock.assert_async().await;
    }

    // -------------------------------------------------------------------------
    // Submission
    // -------------------------------------------------------------------------

    #[tokio::test]
    async fn test_submit_with_empty_field_never_calls_gateway() {
        let mut server = Server::new_async().await;
        let mock = mock_login(&mut server, 200, "{}", 0).await;
        let dir = TempDir::new().unwrap();
        let mut app = App::start(context(&server, dir.path()));

        for (user, pass) in [("", "pw"), ("   ", "pw"), ("alice", ""), ("", "")] {
            let result = app.submit(user, pass).await;
            assert!(matches!(result, Err(GatewayError::Validation)));
            assert_eq!(app.view(), View::LoggedOut);
            let status = app.status().unwrap();
            assert_eq!(status.text, "Username and password are required.");
            assert_eq!(status.tone, StatusTone::Error);
        }
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_begin_submit_shows_logging_in_before_request() {
        let mut server = Server::new_async().await;
        let mock = mock_login(&mut server, 200, "{}", 0).await;
        let dir = TempDir::new().unwrap();
        let mut app = App::start(context(&server, dir.path()));

        app.begin_submit();

        let status = app.status().unwrap();
        assert_eq!(status.text, "Logging in...");
        assert_eq!(status.tone, StatusTone::Info);
        assert_eq!(app.view(), View::LoggedOut);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_submit_success_saves_session_and_logs_in() {
        let mut server = Server::new_async().await;
        let mock = mock_login(
            &mut server,
            200,
            r#"{"success":true,"token":"T","user":{"id":1}}"#,
            1,
        )
        .await;
        let dir = TempDir::new().unwrap();
        let mut app = App::start(context(&server, dir.path()));

        app.submit("alice", "hunter2").await.unwrap();

        mock.assert_async().await;
        assert_eq!(app.view(), View::LoggedIn);
        assert_eq!(app.status().unwrap().text, "Login successful!");
        assert_eq!(app.status().unwrap().tone, StatusTone::Success);

        let expected = Session {
            token: "T".to_string(),
            user: json!({"id": 1}),
            backend_version: None,
        };
        assert_eq!(app.context().sessions.load(), Some(expected.clone()));
        assert_eq!(app.session(), Some(&expected));
    }

    #[tokio::test]
    async fn test_submit_server_error_stays_logged_out() {
        let mut server = Server::new_async().await;
        let _mock = mock_login(&mut server, 500, "server error", 1).await;
        let dir = TempDir::new().unwrap();
        let mut app = App::start(context(&server, dir.path()));

        assert!(app.submit("alice", "hunter2").await.is_err());
        assert_eq!(app.view(), View::LoggedOut);
        assert!(app.status().unwrap().text.contains("server error"));
        assert_eq!(app.context().sessions.load(), None);
    }

    #[tokio::test]
    async fn test_submit_rejected_shows_server_message() {
        let mut server = Server::new_async().await;
        let _mock = mock_login(
            &mut server,
            200,
            r#"{"success":false,"error":"bad password"}"#,
            1,
        )
        .await;
        let dir = TempDir::new().unwrap();
        let mut app = App::start(context(&server, dir.path()));

        assert!(app.submit("alice", "wrong").await.is_err());
        assert_eq!(app.view(), View::LoggedOut);
        assert_eq!(app.status().unwrap().text, "bad password");
    }

    #[tokio::test]
    async fn test_repeated_submissions_each_reach_gateway() {
        // There is no lockout between attempts; every submission is sent.
        let mut server = Server::new_async().await;
        let mock = mock_login(&mut server, 200, r#"{"success":false}"#, 2).await;
        let dir = TempDir::new().unwrap();
        let mut app = App::start(context(&server, dir.path()));

        assert!(app.submit("alice", "one").await.is_err());
        assert!(app.submit("alice", "two").await.is_err());
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_submit_ignored_when_logged_in() {
        let mut server = Server::new_async().await;
        let mock = mock_login(
            &mut server,
            200,
            r#"{"success":true,"token":"T","user":{}}"#,
            1,
        )
        .await;
        let dir = TempDir::new().unwrap();
        let mut app = App::start(context(&server, dir.path()));

        app.submit("alice", "hunter2").await.unwrap();
        app.submit("alice", "hunter2").await.unwrap();
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_submit_logs_in_even_if_session_cannot_be_saved() {
        let mut server = Server::new_async().await;
        let _mock = mock_login(
            &mut server,
            200,
            r#"{"success":true,"token":"T","user":{"id":1}}"#,
            1,
        )
        .await;
        let dir = TempDir::new().unwrap();
        // A regular file where the cache directory should be
        let blocked = dir.path().join("blocked");
        std::fs::write(&blocked, "").unwrap();
        let mut app = App::start(context(&server, &blocked));

        app.submit("alice", "hunter2").await.unwrap();
        assert_eq!(app.view(), View::LoggedIn);
        assert_eq!(app.session().unwrap().token, "T");
        assert_eq!(app.context().sessions.load(), None);
    }

    // -------------------------------------------------------------------------
    // Logout
    // -------------------------------------------------------------------------

    #[tokio::test]
    async fn test_logout_clears_session() {
        for body in [
            r#"{"success":true,"token":"T","user":{"id":1}}"#,
            r#"{"success":true,"token":"T","user":{"id":1},"scriptVersion":"v9"}"#,
        ] {
            let mut server = Server::new_async().await;
            let _mock = mock_login(&mut server, 200, body, 1).await;
            let dir = TempDir::new().unwrap();
            let mut app = App::start(context(&server, dir.path()));

            app.submit("alice", "hunter2").await.unwrap();
            app.logout().unwrap();

            assert_eq!(app.view(), View::LoggedOut);
            assert!(app.session().is_none());
            assert!(app.status().is_none());
            assert_eq!(app.context().sessions.load(), None);

            // A fresh start agrees
            let restarted = App::start(context(&server, dir.path()));
            assert_eq!(restarted.view(), View::LoggedOut);
        }
    }
}
