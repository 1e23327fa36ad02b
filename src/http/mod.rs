//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP/TLS connection (net::listener)
//!     → endpoint.rs (single upgrade route, admission checks)
//!     → WebSocket upgrade
//!     → SessionManager::attach
//! ```

pub mod endpoint;

pub use endpoint::{router, upgrade_path, EndpointState, OriginPolicy, PLAIN_PATH, SECURE_PATH};
