//! Client for the attendance gateway.
//!
//! The gateway is a single POST endpoint. This module provides the
//! `GatewayClient` that exchanges credentials for a session token and the
//! `GatewayError` taxonomy that every failed attempt maps into.

pub mod client;
pub mod error;

pub use client::{AuthResult, GatewayClient};
pub use error::GatewayError;
