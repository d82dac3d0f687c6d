//! tello-io - UDP control-link client for Tello quadcopters
//!
//! This library drives a Tello over its plaintext UDP SDK protocol and
//! ingests the independent state telemetry stream.
//!
//! The interesting part is the command/response correlation engine in
//! [`link`]: the protocol carries no request identifiers, so replies are
//! matched to commands purely by arrival order, one exchange in flight at a
//! time. Everything else is vocabulary ([`commands`]) and plumbing.

pub mod commands;
pub mod config;
pub mod drone;
pub mod error;
pub mod link;
pub mod telemetry;
pub mod transport;

// Re-export commonly used types
pub use config::AppConfig;
pub use drone::Tello;
pub use error::{Error, Result};
