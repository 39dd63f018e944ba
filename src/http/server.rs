//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with all handlers
//! - Wire up middleware (tracing, limits, request ID, timeout)
//! - Bind server to listener
//! - Stop accepting on shutdown and drain in-flight requests

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    routing::{get, post},
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{
    limit::RequestBodyLimitLayer,
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::TrackerConfig;
use crate::gate::QuotaGate;
use crate::http::handlers::{
    contests_handler, health_handler, leaderboard_handler, users_handler, verify_handler,
};
use crate::http::relay::{relay_handler, Relay};
use crate::http::request::UuidRequestId;
use crate::lifecycle::shutdown::wait;
use crate::remote::{ClientBuildError, ResilientClient};
use crate::stats::{BatchPolicy, SolveCounter};

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub client: Arc<ResilientClient>,
    pub counter: SolveCounter,
    pub gate: Arc<QuotaGate>,
    pub relay: Relay,
    pub tracked: Arc<Vec<String>>,
    pub batch: BatchPolicy,
    pub trust_forwarded_for: bool,
}

impl AppState {
    pub fn new(
        config: &TrackerConfig,
        client: Arc<ResilientClient>,
        gate: Arc<QuotaGate>,
    ) -> Result<Self, ClientBuildError> {
        let relay = Relay::new(
            &config.remote.upstream_url,
            Duration::from_secs(config.remote.attempt_timeout_secs),
        )?;

        Ok(Self {
            counter: SolveCounter::new(client.clone(), config.leaderboard.history_count),
            client,
            gate,
            relay,
            tracked: Arc::new(config.tracked.clone()),
            batch: BatchPolicy::from(&config.leaderboard),
            trust_forwarded_for: config.listener.trust_forwarded_for,
        })
    }
}

/// HTTP server for the tracker API.
pub struct HttpServer {
    router: Router,
}

impl HttpServer {
    pub fn new(config: &TrackerConfig, state: AppState) -> Self {
        Self {
            router: Self::build_router(config, state),
        }
    }

    /// The fully layered router, for in-process use.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    pub fn build_router(config: &TrackerConfig, state: AppState) -> Router {
        Router::new()
            .route("/api/verify", post(verify_handler))
            .route("/api/cf/{method}", get(relay_handler))
            .route("/api/contests", get(contests_handler))
            .route("/api/users", get(users_handler))
            .route("/api/leaderboard", get(leaderboard_handler))
            .route("/health", get(health_handler))
            .with_state(state)
            .layer(RequestBodyLimitLayer::new(config.listener.max_body_size))
            .layer(TimeoutLayer::new(Duration::from_secs(
                config.listener.request_timeout_secs,
            )))
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(SetRequestIdLayer::x_request_id(UuidRequestId))
            .layer(TraceLayer::new_for_http())
    }

    /// Serve until `shutdown` fires, then drain in-flight requests.
    pub async fn run(
        self,
        listener: TcpListener,
        shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        let app = self
            .router
            .into_make_service_with_connect_info::<SocketAddr>();

        axum::serve(listener, app)
            .with_graceful_shutdown(wait(shutdown))
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}
