//! Lifecycle controller.
//!
//! # Responsibilities
//! - Own the server state and drive every transition through the table in `state.rs`
//! - Validate settings and notify collaborator subsystems in order
//! - Spawn and close the listener
//! - Turn a fatal listener outcome into an automatic pause
//!
//! # Design Decisions
//! - One `tokio::sync::Mutex` serializes start, pause, resume and shutdown
//! - `start` holds the lock only while starting, then waits on the listener
//!   outcome without it so other tasks can pause or shut down
//! - Callbacks run with the lock held and must not call back into the same `Server`

use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use axum::http::HeaderMap;
use tokio::sync::Mutex;

use crate::config::{validate, ServerSettings, ValidatedSettings};
use crate::error::ServerError;
use crate::http::{router, EndpointState, OriginPolicy};
use crate::lifecycle::callbacks::{CallbackRegistry, LifecycleEvent};
use crate::lifecycle::console::spawn_console;
use crate::lifecycle::notifier::SubsystemNotifier;
use crate::lifecycle::shutdown::ShutdownSignal;
use crate::lifecycle::state::{ServerState, Step, Transition};
use crate::net::connection::ConnectionTracker;
use crate::net::listener::{self, Binding, ListenerError, ListenerHandle, ListenerOutcome, TlsMaterial};
use crate::observability::metrics;
use crate::subsystems::{
    ActionRunner, RoomDirectory, SessionManager, SessionRegistry, SettingsProjection,
    StateRecovery, StorageCredentials, StorageError, StorageManager, Subsystem,
};

/// A game server instance. Cheap to clone; clones share one server.
#[derive(Clone)]
pub struct Server {
    inner: Arc<Inner>,
}

struct Inner {
    core: Mutex<Core>,
    notifier: SubsystemNotifier,
    callbacks: Arc<CallbackRegistry>,
    sessions: Arc<dyn SessionManager>,
    storage: Option<Arc<dyn StorageManager>>,
    recovery: Option<Arc<dyn StateRecovery>>,
}

#[derive(Default)]
struct Core {
    state: ServerState,
    settings: Option<ValidatedSettings>,
    listener: Option<ListenerHandle>,
    console: Option<ShutdownSignal>,
    /// Set when the accept loop died on its own. Cleared by the next start.
    listener_failed: bool,
}

impl Server {
    pub fn builder() -> ServerBuilder {
        ServerBuilder::default()
    }

    /// A server with the built-in collaborators and no callbacks.
    pub fn new() -> Self {
        Self::builder().build()
    }

    /// Validate `settings` (defaults when `None`), start every subsystem and
    /// serve until the listener terminates.
    ///
    /// Returns `Ok` after a requested shutdown has completed, or
    /// `ServerError::Fatal` when the listener died on its own; in that case
    /// the server has already been paused.
    pub async fn start(&self, settings: Option<ServerSettings>) -> Result<(), ServerError> {
        let outcome = {
            let mut core = self.inner.core.lock().await;
            if core.state.step(Transition::Start) == Step::Reject {
                return Err(ServerError::AlreadyStarted { state: core.state });
            }

            let settings = validate(settings).inspect_err(|e| {
                tracing::error!(error = %e, "Refusing to start with invalid settings");
            })?;

            tracing::info!(
                version = crate::VERSION,
                server_name = %settings.server_name,
                "Starting server"
            );

            let inner = &self.inner;
            inner
                .notifier
                .apply_settings(&SettingsProjection::from_settings(&settings));
            inner.notifier.set_server_started(true);

            if settings.storage.enabled {
                if let Err(e) = self.initialize_storage(&settings).await {
                    if settings.storage.fail_fast {
                        tracing::error!(error = %e, "Storage initialization failed, aborting start");
                        inner.notifier.set_server_started(false);
                        return Err(e.into());
                    }
                    tracing::error!(error = %e, "Storage initialization failed, continuing without persistence");
                }
            }

            let binding = binding_for(&settings);
            let endpoint = EndpointState {
                sessions: Arc::clone(&inner.sessions),
                callbacks: Arc::clone(&inner.callbacks),
                connections: ConnectionTracker::new(settings.max_connections),
                origin: OriginPolicy::from_settings(&settings),
            };
            let (handle, outcome) = listener::start(binding.clone(), router(binding.is_tls(), endpoint));

            if settings.admin.console {
                let signal = ShutdownSignal::new();
                spawn_console(self.clone(), signal.subscribe());
                core.console = Some(signal);
            }

            core.listener = Some(handle);
            core.listener_failed = false;
            core.settings = Some(settings);
            enter(&mut core, ServerState::Running);
            tracing::info!(address = %binding.address(), tls = binding.is_tls(), "Server running");
            inner.callbacks.fire(LifecycleEvent::Start);

            outcome
        };

        let outcome = outcome
            .await
            .unwrap_or(ListenerOutcome::Failed(ListenerError::Lost));
        metrics::record_listener_outcome(outcome.label());

        // A requested close finishes under the lock; wait for it.
        let mut core = self.inner.core.lock().await;
        match outcome {
            ListenerOutcome::Closed => Ok(()),
            ListenerOutcome::Failed(error) => {
                self.handle_listener_failure(&mut core, &error).await;
                Err(ServerError::Fatal(error))
            }
        }
    }

    /// Stop admitting sessions while keeping room and user state. No-op
    /// unless running.
    pub async fn pause(&self) {
        let mut core = self.inner.core.lock().await;
        self.pause_locked(&mut core);
    }

    /// Admit sessions again. No-op unless paused, or when the listener has
    /// already failed.
    pub async fn resume(&self) {
        let mut core = self.inner.core.lock().await;
        let Step::Enter(next) = core.state.step(Transition::Resume) else {
            tracing::debug!(state = %core.state, "Resume ignored");
            return;
        };
        if core.listener_failed {
            tracing::warn!("Listener has failed, staying paused");
            return;
        }

        self.inner.notifier.resume();
        enter(&mut core, next);
        self.inner.callbacks.fire(LifecycleEvent::Resume);
    }

    /// Pause, persist recoverable state, close the listener and stop.
    ///
    /// Safe to call more than once. Returns an error when the listener did
    /// not close within the grace period or ended with an error. After a fatal
    /// listener error the state was already persisted by the automatic pause,
    /// so it is not persisted again.
    pub async fn shut_down(&self) -> Result<(), ServerError> {
        let mut core = self.inner.core.lock().await;
        let Step::Enter(stopping) = core.state.step(Transition::ShutDown) else {
            tracing::debug!(state = %core.state, "Shutdown ignored");
            return Ok(());
        };

        tracing::info!("Shutting down");
        self.pause_locked(&mut core);
        enter(&mut core, stopping);

        let settings = core.settings.clone();
        if let Some(settings) = settings.as_ref().filter(|_| !core.listener_failed) {
            self.persist_recovery(settings).await;
        }

        let grace = settings
            .as_ref()
            .map(|s| Duration::from_secs(s.lifecycle.grace_period_secs))
            .unwrap_or_default();
        let closed = match core.listener.take() {
            Some(handle) => handle.close(grace).await,
            None => Ok(()),
        };
        if let Some(console) = core.console.take() {
            console.trigger();
        }

        self.inner.notifier.set_server_started(false);
        self.inner.callbacks.fire(LifecycleEvent::Stop);

        if let Step::Enter(next) = core.state.step(Transition::Finish) {
            enter(&mut core, next);
        }
        core.settings = None;

        match closed {
            Ok(()) => {
                tracing::info!("Server stopped");
                Ok(())
            }
            Err(e) => {
                tracing::error!(error = %e, "Listener did not close cleanly");
                Err(ServerError::Shutdown(e))
            }
        }
    }

    pub async fn state(&self) -> ServerState {
        self.inner.core.lock().await.state
    }

    /// The bound listener address, once listening.
    pub async fn local_addr(&self) -> Option<SocketAddr> {
        let handle = self.inner.core.lock().await.listener.clone()?;
        handle.local_addr().await
    }

    fn pause_locked(&self, core: &mut Core) {
        let Step::Enter(next) = core.state.step(Transition::Pause) else {
            tracing::debug!(state = %core.state, "Pause ignored");
            return;
        };

        self.inner.notifier.pause();
        enter(core, next);
        self.inner.callbacks.fire(LifecycleEvent::Pause);
    }

    async fn handle_listener_failure(&self, core: &mut Core, error: &ListenerError) {
        core.listener = None;
        core.listener_failed = true;

        if !matches!(core.state, ServerState::Running | ServerState::Paused) {
            // Shutdown already drove the terminal transition.
            tracing::debug!(state = %core.state, "Listener failed during shutdown");
            return;
        }

        tracing::error!(error = %error, "Listener failed, pausing server");
        self.pause_locked(core);
        if let Some(settings) = core.settings.clone() {
            self.persist_recovery(&settings).await;
        }
    }

    async fn initialize_storage(&self, settings: &ServerSettings) -> Result<(), StorageError> {
        let storage = self
            .inner
            .storage
            .as_ref()
            .ok_or(StorageError::NotConfigured)?;
        storage
            .initialize(StorageCredentials::from_settings(settings))
            .await?;
        tracing::info!("Storage initialized");
        Ok(())
    }

    async fn persist_recovery(&self, settings: &ServerSettings) {
        if !settings.recovery.enabled {
            return;
        }
        let Some(recovery) = &self.inner.recovery else {
            tracing::warn!("Recovery is enabled but no recovery handler is registered");
            return;
        };

        let location = Path::new(&settings.recovery.location);
        match recovery.persist(location).await {
            Ok(()) => tracing::info!(location = %location.display(), "Recoverable state persisted"),
            Err(e) => tracing::error!(location = %location.display(), error = %e, "Failed to persist recoverable state"),
        }
    }
}

impl Default for Server {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Server {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Server")
            .field("subsystems", &self.inner.notifier.names())
            .field("callbacks", &self.inner.callbacks)
            .finish_non_exhaustive()
    }
}

fn enter(core: &mut Core, next: ServerState) {
    tracing::debug!(from = %core.state, to = %next, "State transition");
    metrics::record_transition(core.state, next);
    core.state = next;
}

fn binding_for(settings: &ServerSettings) -> Binding {
    let tls = settings.tls.enabled.then(|| TlsMaterial {
        cert_path: PathBuf::from(&settings.tls.cert_file),
        key_path: PathBuf::from(&settings.tls.private_key_file),
    });

    Binding {
        host: settings.network.ip.clone(),
        port: settings.network.port,
        tls,
    }
}

/// Assembles a [`Server`] from its collaborators and callbacks.
///
/// Callbacks can only be registered here, so they are always in place
/// before the first start.
#[derive(Default)]
pub struct ServerBuilder {
    sessions: Option<(Arc<dyn SessionManager>, Arc<dyn Subsystem>)>,
    rooms: Option<Arc<dyn Subsystem>>,
    actions: Option<Arc<dyn Subsystem>>,
    storage: Option<(Arc<dyn StorageManager>, Arc<dyn Subsystem>)>,
    recovery: Option<Arc<dyn StateRecovery>>,
    callbacks: CallbackRegistry,
}

impl ServerBuilder {
    pub fn session_manager<T>(mut self, sessions: Arc<T>) -> Self
    where
        T: SessionManager + Subsystem + 'static,
    {
        let manager: Arc<dyn SessionManager> = sessions.clone();
        let subsystem: Arc<dyn Subsystem> = sessions;
        self.sessions = Some((manager, subsystem));
        self
    }

    pub fn rooms(mut self, rooms: Arc<dyn Subsystem>) -> Self {
        self.rooms = Some(rooms);
        self
    }

    pub fn actions(mut self, actions: Arc<dyn Subsystem>) -> Self {
        self.actions = Some(actions);
        self
    }

    pub fn storage<T>(mut self, storage: Arc<T>) -> Self
    where
        T: StorageManager + Subsystem + 'static,
    {
        let manager: Arc<dyn StorageManager> = storage.clone();
        let subsystem: Arc<dyn Subsystem> = storage;
        self.storage = Some((manager, subsystem));
        self
    }

    pub fn recovery(mut self, recovery: Arc<dyn StateRecovery>) -> Self {
        self.recovery = Some(recovery);
        self
    }

    pub fn on_start(mut self, hook: impl Fn() + Send + Sync + 'static) -> Self {
        self.callbacks.set(LifecycleEvent::Start, Arc::new(hook));
        self
    }

    pub fn on_pause(mut self, hook: impl Fn() + Send + Sync + 'static) -> Self {
        self.callbacks.set(LifecycleEvent::Pause, Arc::new(hook));
        self
    }

    pub fn on_resume(mut self, hook: impl Fn() + Send + Sync + 'static) -> Self {
        self.callbacks.set(LifecycleEvent::Resume, Arc::new(hook));
        self
    }

    pub fn on_stop(mut self, hook: impl Fn() + Send + Sync + 'static) -> Self {
        self.callbacks.set(LifecycleEvent::Stop, Arc::new(hook));
        self
    }

    /// Decide per connection attempt whether to upgrade it. Runs before the
    /// connection cap is checked.
    pub fn on_client_connect(
        mut self,
        hook: impl Fn(&HeaderMap, SocketAddr) -> bool + Send + Sync + 'static,
    ) -> Self {
        self.callbacks.set_client_connect(Arc::new(hook));
        self
    }

    pub fn build(self) -> Server {
        let (sessions, session_subsystem) = self.sessions.unwrap_or_else(|| {
            let registry = Arc::new(SessionRegistry::new());
            let manager: Arc<dyn SessionManager> = registry.clone();
            let subsystem: Arc<dyn Subsystem> = registry;
            (manager, subsystem)
        });
        let rooms = self
            .rooms
            .unwrap_or_else(|| Arc::new(RoomDirectory::new()) as Arc<dyn Subsystem>);
        let actions = self
            .actions
            .unwrap_or_else(|| Arc::new(ActionRunner::new()) as Arc<dyn Subsystem>);
        let (storage, storage_subsystem) = match self.storage {
            Some((manager, subsystem)) => (Some(manager), Some(subsystem)),
            None => (None, None),
        };

        Server {
            inner: Arc::new(Inner {
                core: Mutex::new(Core::default()),
                notifier: SubsystemNotifier::new(session_subsystem, rooms, actions, storage_subsystem),
                callbacks: Arc::new(self.callbacks),
                sessions,
                storage,
                recovery: self.recovery,
            }),
        }
    }
}
