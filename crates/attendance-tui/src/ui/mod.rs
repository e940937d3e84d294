//! Terminal UI module using ratatui.
//!
//! - `state`: login form and terminal mode around the core login flow
//! - `render`: login screen, main view and overlays
//! - `input`: keyboard event handling
//! - `styles`: color palette and text styling

pub mod input;
pub mod render;
pub mod state;
pub mod styles;
