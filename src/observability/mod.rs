//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → logging.rs (structured tracing events)
//!     → metrics.rs (counters, histograms)
//!
//! Consumers:
//!     → stdout
//!     → Metrics endpoint (Prometheus scrape)
//! ```
//!
//! # Design Decisions
//! - Structured fields (route, attempt, operation, identity) on every event
//! - Request ID flows through the HTTP layer
//! - Secrets are never logged

pub mod logging;
pub mod metrics;
