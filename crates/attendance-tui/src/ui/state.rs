//! Terminal-side state wrapped around the core login flow.
//!
//! `UiState` owns the core `App` plus everything that only matters to the
//! terminal: the login form contents, which field has focus, and whether a
//! quit confirmation is showing.

use attendance_core::{App, GatewayError, View};
use tracing::warn;

// ============================================================================
// Constants
// ============================================================================

/// Maximum length for username input.
const MAX_USERNAME_LENGTH: usize = 50;

/// Maximum length for password input.
/// 128 chars accommodates password managers and passphrases.
const MAX_PASSWORD_LENGTH: usize = 128;

// ============================================================================
// UI State Types
// ============================================================================

/// Overall terminal mode on top of the login/main view
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Normal,
    /// Login requested; runs after the next frame so "Logging in..." shows
    Submitting,
    ConfirmingQuit,
    Quitting,
}

/// Login form focus state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginFocus {
    Username,
    Password,
    Button,
}

impl LoginFocus {
    pub fn next(&self) -> Self {
        match self {
            LoginFocus::Username => LoginFocus::Password,
            LoginFocus::Password => LoginFocus::Button,
            LoginFocus::Button => LoginFocus::Username,
        }
    }

    pub fn prev(&self) -> Self {
        match self {
            LoginFocus::Username => LoginFocus::Button,
            LoginFocus::Password => LoginFocus::Username,
            LoginFocus::Button => LoginFocus::Password,
        }
    }
}

#[derive(Debug, Clone)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
    pub focus: LoginFocus,
}

impl LoginForm {
    pub fn new(username: String, password: String) -> Self {
        let mut form = Self {
            username,
            password,
            focus: LoginFocus::Username,
        };
        form.reset_focus();
        form
    }

    /// Put the cursor on the first field that still needs typing
    pub fn reset_focus(&mut self) {
        self.focus = if self.username.is_empty() {
            LoginFocus::Username
        } else {
            LoginFocus::Password
        };
    }

    pub fn push_char(&mut self, c: char) {
        match self.focus {
            LoginFocus::Username => {
                if can_add_username_char(self.username.chars().count(), c) {
                    self.username.push(c);
                }
            }
            LoginFocus::Password => {
                if can_add_password_char(self.password.chars().count(), c) {
                    self.password.push(c);
                }
            }
            LoginFocus::Button => {}
        }
    }

    pub fn pop_char(&mut self) {
        match self.focus {
            LoginFocus::Username => {
                self.username.pop();
            }
            LoginFocus::Password => {
                self.password.pop();
            }
            LoginFocus::Button => {}
        }
    }
}

// ============================================================================
// Terminal State
// ============================================================================

pub struct UiState {
    pub app: App,
    pub form: LoginForm,
    pub mode: Mode,
}

impl UiState {
    pub fn new(app: App, username: String, password: String) -> Self {
        Self {
            app,
            form: LoginForm::new(username, password),
            mode: Mode::Normal,
        }
    }

    /// Queue a submission. The main loop draws once, then calls `finish_login`.
    pub fn begin_login(&mut self) {
        self.app.begin_submit();
        self.mode = Mode::Submitting;
    }

    /// Run a queued submission, if any
    pub async fn finish_login(&mut self) {
        if self.mode != Mode::Submitting {
            return;
        }
        self.mode = Mode::Normal;
        // Failure is already on the status line
        let _ = self.attempt_login().await;
    }

    /// Submit the form. On success the password is wiped from memory and
    /// the username remembered for next time.
    pub async fn attempt_login(&mut self) -> Result<(), GatewayError> {
        self.app
            .submit(&self.form.username, &self.form.password)
            .await?;

        if self.app.view() == View::LoggedIn {
            self.form.password.clear();
            let config = &mut self.app.context_mut().config;
            config.last_username = Some(self.form.username.trim().to_string());
            if let Err(e) = config.save() {
                warn!(error = %e, "Failed to save config");
            }
        }
        Ok(())
    }

    pub fn logout(&mut self) {
        if let Err(e) = self.app.logout() {
            warn!(error = %e, "Failed to clear stored session");
        }
        self.form.password.clear();
        self.form.reset_focus();
    }
}

// ============================================================================
// Input validation helpers
// ============================================================================

/// Check if a character is valid for input (no control characters)
fn is_valid_input_char(c: char) -> bool {
    !c.is_control()
}

/// Check if a username character should be accepted
pub fn can_add_username_char(current_len: usize, c: char) -> bool {
    current_len < MAX_USERNAME_LENGTH && is_valid_input_char(c)
}

/// Check if a password character should be accepted
pub fn can_add_password_char(current_len: usize, c: char) -> bool {
    current_len < MAX_PASSWORD_LENGTH && is_valid_input_char(c)
}

// ============================================================================
// Tests
// ============================================================================
