//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Remote operation attempt fails:
//!     → retries.rs (attempts left on this route?)
//!     → backoff.rs (how long to wait before the next one)
//!     → otherwise the client advances to the next route
//! ```
//!
//! # Design Decisions
//! - Every attempt has its own deadline (enforced by the client)
//! - Backoff is deterministic unless jitter is switched on
//! - Only read-only operations go through this path

pub mod backoff;
pub mod retries;

pub use retries::RetryPolicy;
