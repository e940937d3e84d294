use std::fmt;

use crate::api::GatewayError;

/// A username/password pair as entered in the login form.
///
/// Never persisted. The username is trimmed, the password is kept verbatim.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    username: String,
    password: String,
}

impl Credentials {
    /// Validate raw form input. Both fields must be non-empty after the
    /// username has been trimmed.
    pub fn new(username: &str, password: &str) -> Result<Self, GatewayError> {
        let username = username.trim();
        if username.is_empty() || password.is_empty() {
            return Err(GatewayError::Validation);
        }
        Ok(Self {
            username: username.to_string(),
            password: password.to_string(),
        })
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn password(&self) -> &str {
        &self.password
    }
}

// Keep the password out of logs and panic messages
impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}
