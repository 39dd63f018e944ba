//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the tracker.
//! All types derive Serde traits for deserialization from config files.

use std::net::SocketAddr;

use serde::{Deserialize, Serialize};

/// Base of the built-in relay route before it is aligned with the listener.
pub const DEFAULT_RELAY_BASE: &str = "http://127.0.0.1:8080/api/cf";

/// Root configuration for the tracker.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct TrackerConfig {
    /// Listener configuration (bind address, limits).
    pub listener: ListenerConfig,

    /// Remote API access: routes, retries, timeouts.
    pub remote: RemoteConfig,

    /// Access gate secrets and quota.
    pub gate: GateConfig,

    /// Counter store backing the gate.
    pub store: StoreConfig,

    /// Leaderboard batching policy.
    pub leaderboard: LeaderboardConfig,

    /// Remote handles shown on the data endpoints.
    pub tracked: Vec<String>,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

impl TrackerConfig {
    /// Point the built-in relay route at this server's own listener.
    ///
    /// Only a relay still on [`DEFAULT_RELAY_BASE`] is touched; explicitly
    /// configured relays are left alone. An unspecified bind IP is reached
    /// over loopback.
    pub fn align_default_relay(&mut self) {
        let Ok(bind) = self.listener.bind_address.parse::<SocketAddr>() else {
            return;
        };
        let host = if bind.ip().is_unspecified() {
            "127.0.0.1".to_string()
        } else {
            match bind {
                SocketAddr::V4(v4) => v4.ip().to_string(),
                SocketAddr::V6(v6) => format!("[{}]", v6.ip()),
            }
        };
        let base = format!("http://{}:{}/api/cf", host, bind.port());

        for route in &mut self.remote.routes {
            if route.kind == RouteKind::Relay && route.base_url == DEFAULT_RELAY_BASE {
                route.base_url = base.clone();
            }
        }
    }
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,

    /// Whole-request timeout in seconds.
    pub request_timeout_secs: u64,

    /// Maximum accepted request body in bytes.
    pub max_body_size: usize,

    /// Charge quota to the first `X-Forwarded-For` hop. Only safe behind a
    /// proxy that overwrites the header; when off the socket peer is used.
    pub trust_forwarded_for: bool,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
            request_timeout_secs: 60,
            max_body_size: 16 * 1024,
            trust_forwarded_for: true,
        }
    }
}

/// How a route turns an operation into an address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RouteKind {
    /// First-party relay mounted next to the application.
    Relay,
    /// The upstream API itself.
    Direct,
    /// Public CORS proxy wrapping the encoded upstream URL.
    Proxy,
}

/// Reshaping applied to a route's raw payload before envelope decoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TransformKind {
    #[default]
    Identity,
    /// Payload is `{"contents": "<json text>"}`.
    Contents,
}

/// One entry of the ordered strategy list.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RouteConfig {
    /// Route identifier for logging/metrics.
    pub name: String,

    pub kind: RouteKind,

    /// Relay/direct: API base. Proxy: proxy endpoint.
    pub base_url: String,

    /// Proxy only: query key carrying the encoded target. `None` puts the
    /// encoded target as the whole query string.
    #[serde(default)]
    pub query_key: Option<String>,

    /// HTTP status meaning "this route is not deployed here".
    #[serde(default)]
    pub unavailable_status: Option<u16>,

    #[serde(default)]
    pub transform: TransformKind,
}

/// Remote API access configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RemoteConfig {
    /// Upstream API base, wrapped by proxy routes.
    pub upstream_url: String,

    /// Attempts per route before advancing.
    pub max_attempts: u32,

    /// Base delay for exponential backoff in milliseconds.
    pub base_delay_ms: u64,

    /// Maximum delay for exponential backoff in milliseconds.
    pub max_delay_ms: u64,

    /// Add up to 10% random jitter to each delay.
    pub jitter: bool,

    /// Per-attempt timeout in seconds.
    pub attempt_timeout_secs: u64,

    /// Ordered strategy list.
    pub routes: Vec<RouteConfig>,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            upstream_url: "https://codeforces.com/api".to_string(),
            max_attempts: 3,
            base_delay_ms: 500,
            max_delay_ms: 8_000,
            jitter: false,
            attempt_timeout_secs: 8,
            routes: default_routes(),
        }
    }
}

fn default_routes() -> Vec<RouteConfig> {
    vec![
        RouteConfig {
            name: "relay".to_string(),
            kind: RouteKind::Relay,
            base_url: DEFAULT_RELAY_BASE.to_string(),
            query_key: None,
            unavailable_status: Some(404),
            transform: TransformKind::Identity,
        },
        RouteConfig {
            name: "direct".to_string(),
            kind: RouteKind::Direct,
            base_url: "https://codeforces.com/api".to_string(),
            query_key: None,
            unavailable_status: None,
            transform: TransformKind::Identity,
        },
        RouteConfig {
            name: "corsproxy".to_string(),
            kind: RouteKind::Proxy,
            base_url: "https://corsproxy.io/".to_string(),
            query_key: None,
            unavailable_status: None,
            transform: TransformKind::Identity,
        },
        RouteConfig {
            name: "codetabs".to_string(),
            kind: RouteKind::Proxy,
            base_url: "https://api.codetabs.com/v1/proxy".to_string(),
            query_key: Some("quest".to_string()),
            unavailable_status: None,
            transform: TransformKind::Identity,
        },
    ]
}

/// Access gate configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct GateConfig {
    /// Unlimited, uncounted tier.
    pub privileged_secret: String,

    /// Daily-limited tier.
    pub limited_secret: String,

    /// Limited-tier requests allowed per identity per UTC day.
    pub daily_limit: u64,

    /// Counter key prefix.
    pub key_prefix: String,

    /// Expiry armed on a fresh bucket, in seconds.
    pub bucket_ttl_secs: u64,
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            privileged_secret: String::new(),
            limited_secret: String::new(),
            daily_limit: 10,
            key_prefix: "guest_usage".to_string(),
            bucket_ttl_secs: 86_400,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StoreBackend {
    #[default]
    Memory,
    Redis,
}

/// Counter store configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct StoreConfig {
    pub backend: StoreBackend,

    pub redis_url: String,

    /// Connection timeout in milliseconds.
    pub connect_timeout_ms: u64,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: StoreBackend::Memory,
            redis_url: "redis://127.0.0.1:6379".to_string(),
            connect_timeout_ms: 500,
        }
    }
}

/// Leaderboard batching configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LeaderboardConfig {
    /// Identities fetched concurrently per chunk.
    pub chunk_size: usize,

    /// Pause between chunks in milliseconds.
    pub chunk_delay_ms: u64,

    /// Submission history entries requested per identity.
    pub history_count: u32,
}

impl Default for LeaderboardConfig {
    fn default() -> Self {
        Self {
            chunk_size: 3,
            chunk_delay_ms: 500,
            history_count: 5000,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}
