//! Codeforces contest and solve tracker.
//!
//! A resilient remote client with ordered route failover, solve statistics
//! over submission histories, and a credential gate with a daily quota for
//! the limited tier.

pub mod config;
pub mod gate;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod remote;
pub mod resilience;
pub mod stats;

pub use config::schema::TrackerConfig;
pub use gate::QuotaGate;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use remote::ResilientClient;
