//! Resilient remote client.
//!
//! # Responsibilities
//! - Walk the strategy list in order for each operation
//! - Retry a route with exponential backoff before abandoning it
//! - Skip a route at once when it reports itself unavailable
//! - Normalize every route's response into one result or one failure
//!
//! # Design Decisions
//! - Calls share no mutable state; concurrent calls are independent
//! - No single-flight: identical concurrent calls each hit the network
//! - A FAILED envelope is retried exactly like a network error
//! - Dropping the returned future abandons the retry loop

use std::sync::Arc;
use std::time::{Duration, Instant};

use serde::de::DeserializeOwned;
use serde_json::Value;
use tokio::time::timeout;

use crate::config::RemoteConfig;
use crate::observability::metrics;
use crate::remote::envelope::Envelope;
use crate::remote::error::{FetchError, FetchResult};
use crate::remote::operation::Operation;
use crate::remote::route::{Route, StrategyList};
use crate::remote::transport::{HttpTransport, Transport};
use crate::resilience::RetryPolicy;

#[derive(Debug, thiserror::Error)]
pub enum ClientBuildError {
    #[error("invalid route url: {0}")]
    Url(#[from] url::ParseError),

    #[error("http client: {0}")]
    Http(#[from] reqwest::Error),
}

#[derive(Clone)]
pub struct ResilientClient {
    routes: StrategyList,
    transport: Arc<dyn Transport>,
    policy: RetryPolicy,
    attempt_timeout: Duration,
}

impl ResilientClient {
    pub fn new(
        routes: StrategyList,
        transport: Arc<dyn Transport>,
        policy: RetryPolicy,
        attempt_timeout: Duration,
    ) -> Self {
        Self {
            routes,
            transport,
            policy,
            attempt_timeout,
        }
    }

    /// Client over HTTP with the configured routes and retry policy.
    pub fn from_config(config: &RemoteConfig) -> Result<Self, ClientBuildError> {
        let attempt_timeout = Duration::from_secs(config.attempt_timeout_secs);
        let routes = StrategyList::from_config(config)?;
        let transport = HttpTransport::new(attempt_timeout)?;

        tracing::info!(
            routes = ?routes.names(),
            max_attempts = config.max_attempts,
            base_delay_ms = config.base_delay_ms,
            "Remote client initialized"
        );

        Ok(Self::new(
            routes,
            Arc::new(transport),
            RetryPolicy::from(config),
            attempt_timeout,
        ))
    }

    pub fn routes(&self) -> &StrategyList {
        &self.routes
    }

    pub fn policy(&self) -> RetryPolicy {
        self.policy
    }

    /// Execute `operation`, decoding the envelope's result as `T`.
    pub async fn execute<T: DeserializeOwned>(&self, operation: &Operation) -> FetchResult<T> {
        self.run(operation, self.policy).await
    }

    /// Like [`execute`](Self::execute) with a different per-route attempt budget.
    pub async fn execute_with_attempts<T: DeserializeOwned>(
        &self,
        operation: &Operation,
        attempts: u32,
    ) -> FetchResult<T> {
        self.run(operation, self.policy.with_attempts(attempts)).await
    }

    async fn run<T: DeserializeOwned>(
        &self,
        operation: &Operation,
        policy: RetryPolicy,
    ) -> FetchResult<T> {
        let start_time = Instant::now();
        let mut last_error = None;
        let mut total_attempts = 0;

        for route in self.routes.iter() {
            let mut attempt = 0;
            loop {
                attempt += 1;
                total_attempts += 1;

                match self.attempt::<T>(route.as_ref(), operation).await {
                    Ok(result) => {
                        metrics::record_fetch_attempt(route.name(), "ok");
                        metrics::record_operation(operation.name(), "ok", start_time);
                        tracing::debug!(
                            operation = %operation.name(),
                            route = %route.name(),
                            attempt,
                            "Remote operation succeeded"
                        );
                        return Ok(result);
                    }
                    Err(err) if err.is_route_unavailable() => {
                        metrics::record_fetch_attempt(route.name(), err.kind());
                        tracing::info!(
                            operation = %operation.name(),
                            route = %route.name(),
                            error = %err,
                            "Route unavailable, moving to next route"
                        );
                        last_error = Some(err);
                        break;
                    }
                    Err(err) => {
                        metrics::record_fetch_attempt(route.name(), err.kind());
                        tracing::warn!(
                            operation = %operation.name(),
                            route = %route.name(),
                            attempt,
                            error = %err,
                            "Remote attempt failed"
                        );
                        last_error = Some(err);

                        match policy.delay_after(attempt) {
                            Some(delay) => {
                                tracing::debug!(
                                    route = %route.name(),
                                    delay = ?delay,
                                    "Backing off"
                                );
                                tokio::time::sleep(delay).await;
                            }
                            None => break,
                        }
                    }
                }
            }
        }

        metrics::record_operation(operation.name(), "unavailable", start_time);
        let last = last_error
            .unwrap_or_else(|| FetchError::Transient("no routes configured".to_string()));
        tracing::error!(
            operation = %operation.name(),
            attempts = total_attempts,
            error = %last,
            "All routes exhausted"
        );

        Err(FetchError::RemoteUnavailable {
            operation: operation.name().to_string(),
            attempts: total_attempts,
            last: Box::new(last),
        })
    }

    async fn attempt<T: DeserializeOwned>(
        &self,
        route: &dyn Route,
        operation: &Operation,
    ) -> FetchResult<T> {
        let url = route.build_address(operation)?;

        let response = match timeout(self.attempt_timeout, self.transport.get(&url)).await {
            Ok(Ok(response)) => response,
            Ok(Err(e)) => return Err(FetchError::Transient(e.to_string())),
            Err(_) => {
                return Err(FetchError::Transient(format!(
                    "timed out after {:?}",
                    self.attempt_timeout
                )))
            }
        };

        if route.signals_unavailable(response.status) {
            return Err(FetchError::RouteUnavailable {
                route: route.name().to_string(),
                reason: format!("HTTP {}", response.status),
            });
        }

        let raw: Value = match serde_json::from_str(&response.body) {
            Ok(raw) => raw,
            Err(_) if !(200..300).contains(&response.status) => {
                return Err(FetchError::Transient(format!("HTTP {}", response.status)))
            }
            Err(e) => {
                return Err(FetchError::Transient(format!("undecodable response: {}", e)))
            }
        };

        let candidate = route.transform_response(raw)?;
        let envelope: Envelope<T> = match serde_json::from_value(candidate) {
            Ok(envelope) => envelope,
            Err(_) if !(200..300).contains(&response.status) => {
                return Err(FetchError::Transient(format!("HTTP {}", response.status)))
            }
            Err(e) => return Err(FetchError::Transient(format!("unexpected envelope: {}", e))),
        };

        envelope.into_result()
    }
}

impl std::fmt::Debug for ResilientClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResilientClient")
            .field("routes", &self.routes.names())
            .field("policy", &self.policy)
            .field("attempt_timeout", &self.attempt_timeout)
            .finish()
    }
}
