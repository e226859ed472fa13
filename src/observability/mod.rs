//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Classifier and HTTP server produce:
//!     → logging.rs (structured log events via tracing)
//!     → metrics.rs (counters, histograms)
//!
//! Consumers:
//!     → Log aggregation (stdout)
//!     → Metrics endpoint (Prometheus scrape)
//! ```
//!
//! # Design Decisions
//! - Request ID flows through every log line of a request
//! - Metrics are cheap; with no recorder installed they are no-ops

pub mod logging;
pub mod metrics;
