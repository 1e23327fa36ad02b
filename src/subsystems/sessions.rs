//! Built-in session registry.
//!
//! # Responsibilities
//! - Track every live client connection under a unique session ID
//! - Refuse new sessions while the server is paused or stopped
//! - Log everyone off on pause (room state lives elsewhere and is kept)
//!
//! Message dispatch belongs to the protocol layer; frames are drained here
//! until the client closes or is kicked.

use std::net::SocketAddr;
use std::sync::{PoisonError, RwLock};
use std::time::Instant;

use async_trait::async_trait;
use axum::extract::ws::{Message, WebSocket};
use dashmap::DashMap;
use tokio::sync::broadcast;
use uuid::Uuid;

use crate::subsystems::projection::SettingsProjection;
use crate::subsystems::run_flags::RunFlags;
use crate::subsystems::traits::{SessionManager, Subsystem};

/// Unique identifier for a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionId(Uuid);

impl SessionId {
    /// Generate a new unique session ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "session-{}", self.0)
    }
}

/// A live session.
#[derive(Debug, Clone)]
pub struct SessionEntry {
    pub peer: SocketAddr,
    pub connected_at: Instant,
}

/// Default `SessionManager`.
pub struct SessionRegistry {
    run: RunFlags,
    settings: RwLock<Option<SettingsProjection>>,
    sessions: DashMap<SessionId, SessionEntry>,
    kick: broadcast::Sender<()>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        let (kick, _) = broadcast::channel(1);
        Self {
            run: RunFlags::default(),
            settings: RwLock::new(None),
            sessions: DashMap::new(),
            kick,
        }
    }

    /// Number of live sessions.
    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }

    /// Settings received at the last start.
    pub fn settings(&self) -> Option<SettingsProjection> {
        self.settings
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn disconnect_all(&self) {
        let live = self.sessions.len();
        if live > 0 {
            tracing::info!(sessions = live, "Logging off all sessions");
        }
        let _ = self.kick.send(());
    }
}

impl Default for SessionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl Subsystem for SessionRegistry {
    fn name(&self) -> &'static str {
        "sessions"
    }

    fn apply_settings(&self, settings: &SettingsProjection) {
        *self.settings.write().unwrap_or_else(PoisonError::into_inner) = Some(settings.clone());
    }

    fn set_server_started(&self, started: bool) {
        self.run.set_started(started);
        if !started {
            self.disconnect_all();
        }
    }

    fn pause(&self) {
        self.run.pause();
        self.disconnect_all();
    }

    fn resume(&self) {
        self.run.resume();
    }
}

#[async_trait]
impl SessionManager for SessionRegistry {
    fn accepts_sessions(&self) -> bool {
        self.run.is_active()
    }

    async fn attach(&self, mut socket: WebSocket, peer: SocketAddr) {
        // Subscribe before the final check so a concurrent pause cannot slip between them.
        let mut kicked = self.kick.subscribe();
        if !self.accepts_sessions() {
            let _ = socket.send(Message::Close(None)).await;
            return;
        }

        let id = SessionId::new();
        self.sessions.insert(
            id,
            SessionEntry {
                peer,
                connected_at: Instant::now(),
            },
        );
        tracing::info!(session_id = %id, peer = %peer, "Session attached");

        loop {
            tokio::select! {
                frame = socket.recv() => match frame {
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Ok(_)) => {}
                    Some(Err(e)) => {
                        tracing::debug!(session_id = %id, error = %e, "Session read failed");
                        break;
                    }
                },
                _ = kicked.recv() => {
                    let _ = socket.send(Message::Close(None)).await;
                    break;
                }
            }
        }

        if let Some((_, entry)) = self.sessions.remove(&id) {
            tracing::info!(
                session_id = %id,
                peer = %entry.peer,
                connected_secs = entry.connected_at.elapsed().as_secs(),
                "Session detached"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_id_unique() {
        assert_ne!(SessionId::new(), SessionId::new());
    }

    #[test]
    fn accepts_sessions_follows_lifecycle() {
        let registry = SessionRegistry::new();
        assert!(!registry.accepts_sessions());

        registry.set_server_started(true);
        assert!(registry.accepts_sessions());

        registry.pause();
        assert!(!registry.accepts_sessions());

        registry.resume();
        assert!(registry.accepts_sessions());

        registry.set_server_started(false);
        assert!(!registry.accepts_sessions());
    }

    #[test]
    fn keeps_applied_settings() {
        let registry = SessionRegistry::new();
        assert!(registry.settings().is_none());

        let projection = SettingsProjection::from_settings(&crate::config::ServerSettings::default());
        registry.apply_settings(&projection);
        assert_eq!(registry.settings(), Some(projection));
    }
}
