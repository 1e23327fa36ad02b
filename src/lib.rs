//! Arena Server Library
//!
//! Lifecycle core of a multiplayer game server: settings validation, an
//! explicit run state machine, the WebSocket listener and the fan-out of
//! lifecycle events to collaborator subsystems.

pub mod config;
pub mod error;
pub mod http;
pub mod lifecycle;
pub mod net;
pub mod observability;
pub mod subsystems;

pub use config::schema::ServerSettings;
pub use error::ServerError;
pub use lifecycle::{Server, ServerBuilder, ServerState};

/// Crate version, logged at startup and reported by the console.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
