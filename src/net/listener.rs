//! Listener manager: one accept loop per server start.
//!
//! # Responsibilities
//! - Resolve and bind the configured address (plain or TLS)
//! - Run the accept loop on its own task
//! - Report the loop's terminal outcome exactly once
//! - Close gracefully within a grace period on request
//!
//! # Design Decisions
//! - `start` never blocks; bind, resolve and TLS failures arrive as a fatal outcome
//! - The outcome is a tagged type: a requested close is `Closed`, anything else is `Failed`
//! - A oneshot channel carries the outcome, so a second delivery cannot happen

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum_server::Handle;
use thiserror::Error;
use tokio::net::TcpSocket;
use tokio::sync::{oneshot, watch};

use crate::net::tls::load_tls_config;

/// Extra time allowed after the grace period for the loop to wind down.
const CLOSE_MARGIN: Duration = Duration::from_secs(1);

const BACKLOG: u32 = 1024;

/// `None` while the loop runs, then `Ok` for a requested close or the
/// failure text.
type Finished = Option<Result<(), String>>;

/// Error type for listener operations.
#[derive(Debug, Error)]
pub enum ListenerError {
    #[error("failed to resolve {address}: {source}")]
    Resolve {
        address: String,
        source: std::io::Error,
    },

    #[error("{0} did not resolve to any address")]
    NoAddress(String),

    /// Every resolved address refused the bind; carries the last error.
    #[error("failed to bind {address}: {source}")]
    Bind {
        address: String,
        source: std::io::Error,
    },

    #[error("failed to load TLS material: {0}")]
    Tls(std::io::Error),

    #[error("accept loop failed: {0}")]
    Serve(std::io::Error),

    /// The loop returned although nobody asked it to close.
    #[error("accept loop exited without a close request")]
    Exited,

    /// The listener task went away without reporting.
    #[error("listener task ended without reporting an outcome")]
    Lost,

    #[error("listener did not close within {0:?}")]
    CloseTimeout(Duration),

    /// The loop ended with an error instead of closing cleanly.
    #[error("listener ended with an error: {0}")]
    Terminated(String),
}

/// Terminal outcome of an accept loop.
#[derive(Debug)]
pub enum ListenerOutcome {
    /// Closed on request.
    Closed,
    /// Anything else.
    Failed(ListenerError),
}

impl ListenerOutcome {
    pub fn label(&self) -> &'static str {
        match self {
            ListenerOutcome::Closed => "closed",
            ListenerOutcome::Failed(_) => "failed",
        }
    }
}

/// Where and how to listen.
#[derive(Debug, Clone)]
pub struct Binding {
    /// IP address or resolvable host name.
    pub host: String,
    pub port: u16,
    pub tls: Option<TlsMaterial>,
}

/// Certificate and private key locations (PEM).
#[derive(Debug, Clone)]
pub struct TlsMaterial {
    pub cert_path: PathBuf,
    pub key_path: PathBuf,
}

impl Binding {
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn is_tls(&self) -> bool {
        self.tls.is_some()
    }
}

/// Control handle for a running accept loop.
#[derive(Debug, Clone)]
pub struct ListenerHandle {
    handle: Handle,
    close_requested: Arc<AtomicBool>,
    finished: watch::Receiver<Finished>,
}

impl ListenerHandle {
    /// The bound address, once listening. `None` if binding failed.
    pub async fn local_addr(&self) -> Option<SocketAddr> {
        let mut finished = self.finished.clone();
        tokio::select! {
            biased;
            addr = self.handle.listening() => addr,
            _ = finished.wait_for(Option::is_some) => None,
        }
    }

    /// Stop accepting, give in-flight connections `grace` to finish, then
    /// force-close the rest. Waits for the loop to terminate.
    ///
    /// Fails if the loop does not stop in time or stopped with an error.
    pub async fn close(&self, grace: Duration) -> Result<(), ListenerError> {
        self.close_requested.store(true, Ordering::SeqCst);
        self.handle.graceful_shutdown(Some(grace));

        let mut finished = self.finished.clone();
        let limit = grace + CLOSE_MARGIN;
        let waited = tokio::time::timeout(limit, finished.wait_for(Option::is_some))
            .await
            .map(|result| result.map(|value| value.clone()));
        match waited {
            Ok(Ok(Some(Ok(())))) => Ok(()),
            Ok(Ok(Some(Err(reason)))) => Err(ListenerError::Terminated(reason)),
            // The sender only drops after publishing.
            Ok(Ok(None)) | Ok(Err(_)) => Err(ListenerError::Lost),
            Err(_) => Err(ListenerError::CloseTimeout(limit)),
        }
    }
}

/// Spawn the accept loop serving `router`. Returns immediately.
pub fn start(binding: Binding, router: Router) -> (ListenerHandle, oneshot::Receiver<ListenerOutcome>) {
    let handle = Handle::new();
    let close_requested = Arc::new(AtomicBool::new(false));
    let (finished_tx, finished_rx) = watch::channel(None);
    let (outcome_tx, outcome_rx) = oneshot::channel();

    let listener = ListenerHandle {
        handle: handle.clone(),
        close_requested: close_requested.clone(),
        finished: finished_rx,
    };

    tokio::spawn(async move {
        let result = serve(&binding, router, handle).await;
        let outcome = match result {
            Ok(()) if close_requested.load(Ordering::SeqCst) => ListenerOutcome::Closed,
            Ok(()) => ListenerOutcome::Failed(ListenerError::Exited),
            Err(e) => ListenerOutcome::Failed(e),
        };

        let finished = match &outcome {
            ListenerOutcome::Closed => {
                tracing::info!(address = %binding.address(), "Listener closed");
                Ok(())
            }
            ListenerOutcome::Failed(e) => {
                tracing::error!(address = %binding.address(), error = %e, "Listener failed");
                Err(e.to_string())
            }
        };

        finished_tx.send_replace(Some(finished));
        let _ = outcome_tx.send(outcome);
    });

    (listener, outcome_rx)
}

async fn serve(binding: &Binding, router: Router, handle: Handle) -> Result<(), ListenerError> {
    let address = binding.address();
    let candidates: Vec<SocketAddr> = tokio::net::lookup_host((binding.host.as_str(), binding.port))
        .await
        .map_err(|source| ListenerError::Resolve {
            address: address.clone(),
            source,
        })?
        .collect();
    if candidates.is_empty() {
        return Err(ListenerError::NoAddress(address));
    }

    // Load TLS material before binding so a bad certificate never holds the port.
    let tls = match &binding.tls {
        Some(tls) => Some(
            load_tls_config(&tls.cert_path, &tls.key_path)
                .await
                .map_err(ListenerError::Tls)?,
        ),
        None => None,
    };

    let (listener, addr) = bind_first(&address, &candidates)?;
    let app = router.into_make_service_with_connect_info::<SocketAddr>();

    match tls {
        Some(config) => {
            tracing::info!(address = %addr, "Listening (TLS)");
            axum_server::from_tcp_rustls(listener, config)
                .handle(handle)
                .serve(app)
                .await
                .map_err(ListenerError::Serve)
        }
        None => {
            tracing::info!(address = %addr, "Listening");
            axum_server::from_tcp(listener)
                .handle(handle)
                .serve(app)
                .await
                .map_err(ListenerError::Serve)
        }
    }
}

/// Bind the first resolved address that accepts, in resolver order.
fn bind_first(
    address: &str,
    candidates: &[SocketAddr],
) -> Result<(std::net::TcpListener, SocketAddr), ListenerError> {
    let mut last_error = None;
    for &addr in candidates {
        match bind_one(addr) {
            Ok(listener) => return Ok((listener, addr)),
            Err(e) => {
                tracing::debug!(address = %addr, error = %e, "Bind failed, trying next address");
                last_error = Some(e);
            }
        }
    }

    Err(match last_error {
        Some(source) => ListenerError::Bind {
            address: address.to_string(),
            source,
        },
        None => ListenerError::NoAddress(address.to_string()),
    })
}

fn bind_one(addr: SocketAddr) -> std::io::Result<std::net::TcpListener> {
    let socket = if addr.is_ipv4() {
        TcpSocket::new_v4()?
    } else {
        TcpSocket::new_v6()?
    };
    socket.set_reuseaddr(true)?;
    socket.bind(addr)?;
    socket.listen(BACKLOG)?.into_std()
}
