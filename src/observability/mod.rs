//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Lifecycle controller, listener, upgrade endpoint produce:
//!     → tracing events (structured fields)
//!     → metrics.rs (counters, gauges)
//!
//! Consumers:
//!     → logging.rs subscriber (stdout)
//!     → Prometheus scrape endpoint (optional)
//! ```

pub mod logging;
pub mod metrics;
