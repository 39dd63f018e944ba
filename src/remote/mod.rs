//! Remote data access subsystem.
//!
//! # Data Flow
//! ```text
//! Operation (name + params)
//!     → client.rs (walk StrategyList in order)
//!         → route.rs (build address for this route)
//!         → transport.rs (HTTP GET with per-attempt timeout)
//!         → route.rs (transform payload into candidate envelope)
//!         → envelope.rs (OK → result, FAILED → rejection)
//!         → on failure: retry with backoff, or next route
//!     → typed result or RemoteUnavailable
//! ```
//!
//! # Design Decisions
//! - Route order encodes preference: first-party relay, then direct, then public proxies
//! - Routes are built once at startup and never mutated
//! - Only RemoteUnavailable escapes the client

pub mod client;
pub mod envelope;
pub mod error;
pub mod operation;
pub mod queries;
pub mod route;
pub mod transport;
pub mod types;

#[cfg(test)]
pub(crate) mod testing;

pub use client::{ClientBuildError, ResilientClient};
pub use error::{FetchError, FetchResult};
pub use operation::Operation;
pub use route::{ApiRoute, ProxyRoute, Route, StrategyList};
pub use transport::{HttpTransport, RawResponse, Transport, TransportError};
