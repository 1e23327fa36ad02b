//! WebSocket upgrade endpoint.
//!
//! # Responsibilities
//! - Expose one upgrade route: `/wss` under TLS, `/ws` otherwise
//! - Apply admission checks before upgrading
//! - Hand the upgraded socket to the session manager
//!
//! # Admission order
//! ```text
//! sessions admitted? → origin policy → connect callback → connection cap → upgrade
//! ```

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    extract::{
        ws::{rejection::WebSocketUpgradeRejection, WebSocketUpgrade},
        ConnectInfo, State,
    },
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use tower_http::trace::TraceLayer;

use crate::config::ServerSettings;
use crate::lifecycle::CallbackRegistry;
use crate::net::connection::ConnectionTracker;
use crate::subsystems::SessionManager;

/// Upgrade path for plain connections.
pub const PLAIN_PATH: &str = "/ws";

/// Upgrade path for TLS connections.
pub const SECURE_PATH: &str = "/wss";

/// The upgrade path for the given transport.
pub fn upgrade_path(tls: bool) -> &'static str {
    if tls {
        SECURE_PATH
    } else {
        PLAIN_PATH
    }
}

/// Rejects browser requests from foreign origins when enabled.
#[derive(Debug, Clone, Default)]
pub struct OriginPolicy {
    enabled: bool,
    allowed_hosts: Vec<String>,
}

impl OriginPolicy {
    pub fn from_settings(settings: &ServerSettings) -> Self {
        let allowed_hosts = [&settings.network.host_name, &settings.network.host_alias]
            .into_iter()
            .map(|host| host_of(host).to_ascii_lowercase())
            .filter(|host| !host.is_empty())
            .collect();

        Self {
            enabled: settings.access.origin_only,
            allowed_hosts,
        }
    }

    /// Requests without an `Origin` header are not from a browser and pass.
    pub fn allows(&self, headers: &HeaderMap) -> bool {
        if !self.enabled {
            return true;
        }
        let Some(origin) = headers.get(header::ORIGIN) else {
            return true;
        };

        match origin.to_str() {
            Ok(origin) => {
                let host = host_of(origin);
                self.allowed_hosts
                    .iter()
                    .any(|allowed| allowed.eq_ignore_ascii_case(host))
            }
            Err(_) => false,
        }
    }
}

/// Host part of an origin or host setting: no scheme, path or port.
fn host_of(value: &str) -> &str {
    let without_scheme = value.split_once("://").map_or(value, |(_, rest)| rest);
    let authority = without_scheme.split('/').next().unwrap_or_default();

    if authority.starts_with('[') {
        // IPv6 literal, keep the brackets.
        return authority.split_inclusive(']').next().unwrap_or(authority);
    }
    authority.split(':').next().unwrap_or(authority)
}

/// State shared by upgrade requests.
#[derive(Clone)]
pub struct EndpointState {
    pub sessions: Arc<dyn SessionManager>,
    pub callbacks: Arc<CallbackRegistry>,
    pub connections: ConnectionTracker,
    pub origin: OriginPolicy,
}

/// Build the router serving the upgrade endpoint. Any other path is 404.
pub fn router(tls: bool, state: EndpointState) -> Router {
    Router::new()
        .route(upgrade_path(tls), get(upgrade_handler))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

async fn upgrade_handler(
    State(state): State<EndpointState>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
    upgrade: Result<WebSocketUpgrade, WebSocketUpgradeRejection>,
) -> Response {
    if !state.sessions.accepts_sessions() {
        tracing::debug!(peer = %peer, "Refusing connection while not accepting sessions");
        return (StatusCode::SERVICE_UNAVAILABLE, "Server is not accepting sessions").into_response();
    }

    if !state.origin.allows(&headers) {
        tracing::warn!(peer = %peer, origin = ?headers.get(header::ORIGIN), "Origin not allowed");
        return (StatusCode::FORBIDDEN, "Origin not allowed").into_response();
    }

    if !state.callbacks.admit_client(&headers, peer) {
        tracing::debug!(peer = %peer, "Connection refused by connect callback");
        return (StatusCode::FORBIDDEN, "Connection refused").into_response();
    }

    let Some(guard) = state.connections.try_track() else {
        tracing::warn!(peer = %peer, active = state.connections.active_count(), "Connection limit reached");
        return (StatusCode::SERVICE_UNAVAILABLE, "Connection limit reached").into_response();
    };

    let upgrade = match upgrade {
        Ok(upgrade) => upgrade,
        Err(rejection) => return rejection.into_response(),
    };

    tracing::debug!(peer = %peer, connection_id = %guard.id(), "Upgrading connection");
    let sessions = Arc::clone(&state.sessions);
    upgrade.on_upgrade(move |socket| async move {
        let _guard = guard;
        sessions.attach(socket, peer).await;
    })
}
