//! budsline — status line and controls for Galaxy Buds via the `earbuds` CLI.

pub mod color;
pub mod config;
pub mod control;
pub mod error;
pub mod gateway;
pub mod render;
pub mod snapshot;
pub mod watch;

pub use error::BudslineError;
