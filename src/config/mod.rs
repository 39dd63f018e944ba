//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize, apply secret env overrides)
//!     → validation.rs (semantic checks)
//!     → TrackerConfig (validated, immutable)
//!     → shared via Arc to all subsystems
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; changes require a restart
//! - All fields have defaults to allow minimal configs
//! - Secrets come from the environment, never from defaults

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_client_config, load_config, load_default, ConfigError};
pub use schema::{
    GateConfig, LeaderboardConfig, ListenerConfig, ObservabilityConfig, RemoteConfig,
    RouteConfig, RouteKind, StoreBackend, StoreConfig, TrackerConfig, TransformKind,
};
