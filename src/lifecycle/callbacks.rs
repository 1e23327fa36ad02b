//! User hooks fired after lifecycle transitions.
//!
//! Every slot holds at most one handler. Handlers are registered on the
//! `ServerBuilder`, so they cannot change once the server exists.
//!
//! Handlers run synchronously on the task driving the transition, while the
//! transition lock is held:
//! - a handler that blocks, blocks the transition;
//! - a handler must not call back into the same `Server` (it would deadlock).

use std::net::SocketAddr;
use std::sync::Arc;

use axum::http::HeaderMap;

/// Handler for start/pause/resume/stop.
pub type LifecycleHook = Arc<dyn Fn() + Send + Sync>;

/// Handler deciding whether a client connection may be upgraded.
pub type ConnectHook = Arc<dyn Fn(&HeaderMap, SocketAddr) -> bool + Send + Sync>;

/// Lifecycle events with a callback slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleEvent {
    Start,
    Pause,
    Resume,
    Stop,
}

#[derive(Clone, Default)]
pub struct CallbackRegistry {
    on_start: Option<LifecycleHook>,
    on_pause: Option<LifecycleHook>,
    on_resume: Option<LifecycleHook>,
    on_stop: Option<LifecycleHook>,
    on_client_connect: Option<ConnectHook>,
}

impl CallbackRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the handler for `event`, replacing any previous one.
    pub fn set(&mut self, event: LifecycleEvent, hook: LifecycleHook) {
        let slot = match event {
            LifecycleEvent::Start => &mut self.on_start,
            LifecycleEvent::Pause => &mut self.on_pause,
            LifecycleEvent::Resume => &mut self.on_resume,
            LifecycleEvent::Stop => &mut self.on_stop,
        };
        *slot = Some(hook);
    }

    pub fn set_client_connect(&mut self, hook: ConnectHook) {
        self.on_client_connect = Some(hook);
    }

    /// Run the handler for `event`, if any.
    pub fn fire(&self, event: LifecycleEvent) {
        let slot = match event {
            LifecycleEvent::Start => &self.on_start,
            LifecycleEvent::Pause => &self.on_pause,
            LifecycleEvent::Resume => &self.on_resume,
            LifecycleEvent::Stop => &self.on_stop,
        };
        if let Some(hook) = slot {
            tracing::debug!(event = ?event, "Running lifecycle callback");
            hook();
        }
    }

    /// Ask the connect handler about a client. Admits everyone when unset.
    pub fn admit_client(&self, headers: &HeaderMap, peer: SocketAddr) -> bool {
        match &self.on_client_connect {
            Some(hook) => hook(headers, peer),
            None => true,
        }
    }
}

impl std::fmt::Debug for CallbackRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CallbackRegistry")
            .field("on_start", &self.on_start.is_some())
            .field("on_pause", &self.on_pause.is_some())
            .field("on_resume", &self.on_resume.is_some())
            .field("on_stop", &self.on_stop.is_some())
            .field("on_client_connect", &self.on_client_connect.is_some())
            .finish()
    }
}
