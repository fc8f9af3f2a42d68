//! Unified error type for the budsline-lib crate.
//!
//! [`BudslineError`] wraps gateway failures (`GatewayError`) and the
//! domain-specific error kinds (`Parse`, `Format`, `Config`, `Color`).
//! `From` impls allow `?` to propagate across module boundaries.

use std::fmt;

use crate::gateway::GatewayError;

/// Unified error type for budsline-lib operations.
#[derive(Debug)]
pub enum BudslineError {
    /// The external `earbuds` utility could not be run or failed.
    Gateway(GatewayError),
    /// Standard I/O error (config persistence).
    Io(std::io::Error),
    /// The status reply was not valid JSON or lacked required fields.
    Parse(String),
    /// The device reported a state that has no display mapping.
    Format(String),
    /// Configuration validation error.
    Config(String),
    /// Color parsing error.
    Color(String),
    /// An action needed the current device state but the buds are disconnected.
    NotConnected,
}

impl fmt::Display for BudslineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BudslineError::Gateway(e) => write!(f, "{e}"),
            BudslineError::Io(e) => write!(f, "I/O error: {e}"),
            BudslineError::Parse(e) => write!(f, "Parse error: {e}"),
            BudslineError::Format(e) => write!(f, "Format error: {e}"),
            BudslineError::Config(e) => write!(f, "Config error: {e}"),
            BudslineError::Color(e) => write!(f, "Color error: {e}"),
            BudslineError::NotConnected => write!(f, "Earbuds are not connected"),
        }
    }
}

impl std::error::Error for BudslineError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            BudslineError::Gateway(e) => Some(e),
            BudslineError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<GatewayError> for BudslineError {
    fn from(e: GatewayError) -> Self {
        BudslineError::Gateway(e)
    }
}

impl From<std::io::Error> for BudslineError {
    fn from(e: std::io::Error) -> Self {
        BudslineError::Io(e)
    }
}

impl From<serde_json::Error> for BudslineError {
    fn from(e: serde_json::Error) -> Self {
        BudslineError::Parse(e.to_string())
    }
}

/// Crate-level Result alias using [`BudslineError`].
pub type Result<T> = std::result::Result<T, BudslineError>;
