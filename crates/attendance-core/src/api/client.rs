//! Gateway client for the attendance backend.
//!
//! Login is one cross-origin style POST carrying
//! `{"action": "loginUser", "username", "password"}` as JSON. The gateway
//! answers with `{"success", "token", "user", "scriptVersion"}` or an error.

use std::time::Duration;

use anyhow::Result;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::auth::{Credentials, Session};

use super::GatewayError;

/// Action name the gateway dispatches login requests on
const LOGIN_ACTION: &str = "loginUser";

/// Outcome of a single login attempt.
pub type AuthResult = std::result::Result<Session, GatewayError>;

#[derive(Debug, Serialize)]
struct LoginRequest<'a> {
    action: &'static str,
    username: &'a str,
    password: &'a str,
}

/// Fields stay loosely typed; a value of the wrong JSON type reads as absent
/// rather than failing the whole response.
#[derive(Debug, Deserialize)]
struct LoginResponse {
    #[serde(default)]
    success: Value,
    #[serde(default)]
    token: Value,
    #[serde(default)]
    user: Value,
    #[serde(default)]
    error: Value,
    #[serde(rename = "scriptVersion", default)]
    script_version: Value,
}

impl LoginResponse {
    fn token(&self) -> Option<String> {
        self.token
            .as_str()
            .filter(|token| !token.is_empty())
            .map(str::to_string)
    }

    fn error(&self) -> Option<String> {
        self.error.as_str().map(str::to_string)
    }

    fn script_version(&self) -> Option<String> {
        self.script_version.as_str().map(str::to_string)
    }
}

/// HTTP client for the gateway endpoint.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Clone)]
pub struct GatewayClient {
    client: Client,
    endpoint: String,
}

impl GatewayClient {
    /// Create a client for the given endpoint URL
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Exchange credentials for a session. Issues exactly one request.
    pub async fn authenticate(&self, credentials: &Credentials) -> AuthResult {
        let body = LoginRequest {
            action: LOGIN_ACTION,
            username: credentials.username(),
            password: credentials.password(),
        };
        debug!(username = credentials.username(), endpoint = %self.endpoint, "Sending login request");

        let response = self.client.post(&self.endpoint).json(&body).send().await?;
        let response = Self::check_response(response).await?;

        let text = response.text().await?;
        let parsed: LoginResponse = serde_json::from_str(&text).map_err(|e| {
            warn!(error = %e, "Gateway returned a malformed login response");
            GatewayError::Parse(e.to_string())
        })?;

        if !is_truthy(&parsed.success) {
            debug!(error = %parsed.error, "Gateway rejected login");
            return Err(GatewayError::rejected(parsed.error()));
        }

        match parsed.token() {
            Some(token) => {
                let backend_version = parsed.script_version();
                info!(backend_version = ?backend_version, "Gateway accepted login");
                Ok(Session {
                    token,
                    user: parsed.user,
                    backend_version,
                })
            }
            None => {
                debug!("Gateway reported success without a usable token");
                Err(GatewayError::rejected(parsed.error()))
            }
        }
    }

    /// Check if response is successful, returning an error with body if not.
    async fn check_response(
        response: reqwest::Response,
    ) -> std::result::Result<reqwest::Response, GatewayError> {
        if response.status().is_success() {
            Ok(response)
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            warn!(status = status.as_u16(), "Gateway returned an error status");
            Err(GatewayError::from_status(status, &body))
        }
    }
}

/// JSON truthiness as the gateway's clients understand it
fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}
