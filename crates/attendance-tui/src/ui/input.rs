//! Keyboard input handling for the TUI.
//!
//! This module handles all keyboard events and translates them into
//! application state changes.

use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent};

use attendance_core::View;

use super::state::{LoginFocus, Mode, UiState};

/// Handle keyboard input. Returns true if the app should quit.
pub async fn handle_input(state: &mut UiState, key: KeyEvent) -> Result<bool> {
    // Handle quit confirmation
    if matches!(state.mode, Mode::ConfirmingQuit) {
        match key.code {
            KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => {
                state.mode = Mode::Quitting;
                return Ok(true);
            }
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                state.mode = Mode::Normal;
            }
            _ => {}
        }
        return Ok(false);
    }

    // Keys wait until a queued login has run
    if matches!(state.mode, Mode::Submitting) {
        return Ok(false);
    }

    match state.app.view() {
        View::LoggedOut => handle_login_input(state, key).await,
        View::LoggedIn => handle_main_input(state, key),
    }
}

fn handle_main_input(state: &mut UiState, key: KeyEvent) -> Result<bool> {
    match key.code {
        KeyCode::Char('l') => state.logout(),
        KeyCode::Char('q') | KeyCode::Esc => state.mode = Mode::ConfirmingQuit,
        _ => {}
    }
    Ok(false)
}

async fn handle_login_input(state: &mut UiState, key: KeyEvent) -> Result<bool> {
    match key.code {
        KeyCode::Esc => {
            // Quit if on login screen
            state.mode = Mode::Quitting;
            return Ok(true);
        }
        KeyCode::Down | KeyCode::Tab => state.form.focus = state.form.focus.next(),
        KeyCode::Up | KeyCode::BackTab => state.form.focus = state.form.focus.prev(),
        KeyCode::Enter => {
            let focus = state.form.focus;
            match focus {
                LoginFocus::Username => state.form.focus = LoginFocus::Password,
                LoginFocus::Password => state.form.focus = LoginFocus::Button,
                LoginFocus::Button => state.begin_login(),
            }
        }
        KeyCode::Backspace => state.form.pop_char(),
        KeyCode::Char(c) => state.form.push_char(c),
        _ => {}
    }
    Ok(false)
}
