//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → logging.rs (structured log events via tracing)
//!     → metrics.rs (counters, histograms)
//!
//! Consumers:
//!     → stderr (every process, including workers and the store)
//!     → Metrics endpoint (Prometheus scrape, public process only)
//! ```
//!
//! # Design Decisions
//! - Structured key/value fields for machine parsing
//! - Request ID flows from the primary into workers via header
//! - Metrics are cheap (atomic increments)

pub mod logging;
pub mod metrics;
