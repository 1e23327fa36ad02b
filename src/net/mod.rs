//! Network layer subsystem.
//!
//! # Data Flow
//! ```text
//! LifecycleController
//!     → listener.rs (spawn accept loop, completion signal, graceful close)
//!     → tls.rs (optional certificate loading)
//!     → http upgrade endpoint
//!     → connection.rs (per-client accounting, connection cap)
//! ```
//!
//! # Design Decisions
//! - One accept loop per server start, torn down by shutdown
//! - TLS is optional and selected by settings
//! - Every upgraded connection holds a guard for its lifetime

pub mod connection;
pub mod listener;
pub mod tls;

pub use listener::{Binding, ListenerError, ListenerHandle, ListenerOutcome, TlsMaterial};
