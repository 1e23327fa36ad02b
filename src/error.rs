//! Top-level error type returned by the lifecycle controller.

use thiserror::Error;

use crate::config::ValidationError;
use crate::lifecycle::ServerState;
use crate::net::ListenerError;
use crate::subsystems::StorageError;

#[derive(Debug, Error)]
pub enum ServerError {
    /// Settings failed validation; nothing was started.
    #[error("invalid configuration: {0}")]
    Config(#[from] ValidationError),

    /// `start` was called while the server was not stopped.
    #[error("server is already {state}")]
    AlreadyStarted { state: ServerState },

    /// Storage initialization failed and `storage.fail_fast` is set.
    #[error("storage initialization failed: {0}")]
    Storage(#[from] StorageError),

    /// The accept loop terminated without a close request.
    #[error("listener failed: {0}")]
    Fatal(ListenerError),

    /// The listener did not close cleanly during shutdown.
    #[error("shutdown did not complete cleanly: {0}")]
    Shutdown(ListenerError),
}

impl ServerError {
    /// Whether this error ended a running server, as opposed to preventing a start.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Fatal(_))
    }
}
