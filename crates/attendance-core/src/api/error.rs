use thiserror::Error;

/// Message shown when the gateway rejects a login without saying why.
pub const INVALID_CREDENTIALS_MESSAGE: &str = "Invalid username or password.";

/// Message shown when the form is submitted with an empty field.
pub const MISSING_CREDENTIALS_MESSAGE: &str = "Username and password are required.";

/// Why a single login attempt failed.
///
/// Every variant is terminal for the attempt. The `Display` text is exactly
/// what the login status line shows.
#[derive(Error, Debug)]
pub enum GatewayError {
    /// Empty username or password, caught before any request is made.
    #[error("Username and password are required.")]
    Validation,

    /// The gateway answered with a non-2xx status.
    #[error("Network error: {status_text} - {body}")]
    Transport {
        status: u16,
        status_text: String,
        body: String,
    },

    /// A well-formed response that reports the login as failed.
    #[error("{0}")]
    Application(String),

    /// A 2xx response whose body is not the expected JSON object.
    #[error("Invalid response from server: {0}")]
    Parse(String),

    /// The request never got a response (DNS, refused connection, TLS, timeout).
    #[error("Unable to reach server: {0}")]
    Network(#[from] reqwest::Error),
}

/// Maximum length for response bodies quoted in error messages
const MAX_ERROR_BODY_LENGTH: usize = 500;

impl GatewayError {
    /// Truncate a response body to avoid flooding the status line
    fn truncate_body(body: &str) -> String {
        if body.len() <= MAX_ERROR_BODY_LENGTH {
            return body.to_string();
        }
        let mut end = MAX_ERROR_BODY_LENGTH;
        while !body.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}... (truncated, {} total bytes)", &body[..end], body.len())
    }

    pub fn from_status(status: reqwest::StatusCode, body: &str) -> Self {
        GatewayError::Transport {
            status: status.as_u16(),
            status_text: status.canonical_reason().unwrap_or_default().to_string(),
            body: Self::truncate_body(body),
        }
    }

    /// Rejection reported by the gateway, falling back to the generic message.
    pub fn rejected(message: Option<String>) -> Self {
        match message {
            Some(msg) if !msg.is_empty() => GatewayError::Application(msg),
            _ => GatewayError::Application(INVALID_CREDENTIALS_MESSAGE.to_string()),
        }
    }
}
