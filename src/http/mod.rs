//! HTTP subsystem.
//!
//! # Data Flow
//! ```text
//! TcpListener
//!     → server.rs (router, layers: trace → request id → timeout → body limit)
//!     → handlers.rs
//!         → /api/verify      → gate (credential tier, daily quota)
//!         → /api/contests    → remote client (upcoming contests)
//!         → /api/users       → remote client (tracked profiles)
//!         → /api/leaderboard → stats (batched solve counts)
//!     → relay.rs
//!         → /api/cf/{method} → upstream API, forwarded verbatim
//!     → response.rs (status codes and JSON bodies)
//! ```
//!
//! # Design Decisions
//! - Handlers own no state; everything shared lives in `AppState`
//! - Remote failures surface as 503 after the client has exhausted every route

pub mod handlers;
pub mod relay;
pub mod request;
pub mod response;
pub mod server;

pub use request::{UuidRequestId, X_REQUEST_ID};
pub use response::ApiError;
pub use server::{AppState, HttpServer};
