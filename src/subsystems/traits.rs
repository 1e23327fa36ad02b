//! Collaborator interfaces the lifecycle core calls into.

use std::net::SocketAddr;
use std::path::Path;

use async_trait::async_trait;
use axum::extract::ws::WebSocket;
use thiserror::Error;

use crate::subsystems::projection::{SettingsProjection, StorageCredentials};

/// Storage initialization failure.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Storage features are enabled but no storage manager was registered.
    #[error("storage is enabled but no storage manager is registered")]
    NotConfigured,

    #[error("{0}")]
    Init(String),
}

/// Failure while persisting recoverable state.
#[derive(Debug, Error)]
pub enum RecoveryError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(String),
}

/// A subsystem that follows the server lifecycle.
///
/// Hooks are synchronous and are called on the task driving the transition.
pub trait Subsystem: Send + Sync {
    /// Name used in logs.
    fn name(&self) -> &'static str;

    /// Receive the settings this subsystem needs. Called once per start,
    /// before `set_server_started(true)`.
    fn apply_settings(&self, _settings: &SettingsProjection) {}

    /// The server started (`true`) or stopped (`false`).
    fn set_server_started(&self, started: bool);

    /// Stop admitting new work; keep in-memory state.
    fn pause(&self);

    /// Admit work again after a pause.
    fn resume(&self);
}

/// Owner of user sessions. Receives every upgraded client connection.
#[async_trait]
pub trait SessionManager: Send + Sync {
    /// Whether new sessions are currently admitted.
    fn accepts_sessions(&self) -> bool;

    /// Take over an upgraded connection until it closes.
    async fn attach(&self, socket: WebSocket, peer: SocketAddr);
}

/// Storage backend for authentication and friending.
#[async_trait]
pub trait StorageManager: Send + Sync {
    async fn initialize(&self, credentials: StorageCredentials) -> Result<(), StorageError>;
}

/// Persists room and session state so it survives a restart.
#[async_trait]
pub trait StateRecovery: Send + Sync {
    async fn persist(&self, location: &Path) -> Result<(), RecoveryError>;
}
