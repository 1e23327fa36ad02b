//! Metrics collection and exposition.
//!
//! # Metrics
//! - `arena_lifecycle_transitions_total` (counter): transitions by from/to state
//! - `arena_server_state` (gauge): 0=stopped, 1=running, 2=paused, 3=stopping
//! - `arena_active_connections` (gauge): upgraded client connections
//! - `arena_listener_outcomes_total` (counter): accept loop terminations by outcome
//!
//! Recording is a no-op until a recorder is installed.

use std::net::SocketAddr;

use metrics::{counter, gauge};
use metrics_exporter_prometheus::PrometheusBuilder;

use crate::lifecycle::ServerState;

/// Install the Prometheus exporter listening on `addr`.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_transition(from: ServerState, to: ServerState) {
    counter!(
        "arena_lifecycle_transitions_total",
        "from" => from.as_str(),
        "to" => to.as_str()
    )
    .increment(1);
    gauge!("arena_server_state").set(to.as_gauge());
}

pub fn set_active_connections(count: usize) {
    gauge!("arena_active_connections").set(count as f64);
}

pub fn record_listener_outcome(outcome: &'static str) {
    counter!("arena_listener_outcomes_total", "outcome" => outcome).increment(1);
}
