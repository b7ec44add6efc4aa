//! QuotePilot core — configuration, error type and domain types shared
//! by every other crate in the workspace.

pub mod config;
pub mod error;
pub mod types;

pub use config::QuotePilotConfig;
pub use error::{QuotePilotError, Result};
