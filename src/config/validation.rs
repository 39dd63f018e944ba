//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (attempts > 0, limit > 0, chunk size > 0)
//! - Check route URLs parse and route names are unique
//! - Refuse empty or shared gate secrets
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: TrackerConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::collections::HashSet;

use thiserror::Error;
use url::Url;

use crate::config::schema::{RouteKind, StoreBackend, TrackerConfig};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("remote.routes must not be empty")]
    NoRoutes,

    #[error("route '{name}' has invalid url '{url}'")]
    InvalidRouteUrl { name: String, url: String },

    #[error("route name '{0}' is used more than once")]
    DuplicateRoute(String),

    #[error("remote.upstream_url '{0}' is not a valid url")]
    InvalidUpstream(String),

    #[error("{0} must be greater than zero")]
    Zero(&'static str),

    #[error("gate.{0} must be set")]
    MissingSecret(&'static str),

    #[error("gate secrets must differ")]
    SharedSecret,

    #[error("store.redis_url '{0}' must use the redis:// or rediss:// scheme")]
    InvalidRedisUrl(String),

    #[error("listener.bind_address '{0}' is not a socket address")]
    InvalidBindAddress(String),
}

impl ValidationError {
    /// Errors that only matter to a process serving the gate.
    pub fn is_secret_error(&self) -> bool {
        matches!(self, ValidationError::MissingSecret(_) | ValidationError::SharedSecret)
    }
}

pub fn validate_config(config: &TrackerConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<std::net::SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidBindAddress(
            config.listener.bind_address.clone(),
        ));
    }

    let remote = &config.remote;
    if remote.routes.is_empty() {
        errors.push(ValidationError::NoRoutes);
    }
    if remote.max_attempts == 0 {
        errors.push(ValidationError::Zero("remote.max_attempts"));
    }
    if remote.attempt_timeout_secs == 0 {
        errors.push(ValidationError::Zero("remote.attempt_timeout_secs"));
    }
    if Url::parse(&remote.upstream_url).is_err() {
        errors.push(ValidationError::InvalidUpstream(remote.upstream_url.clone()));
    }

    let mut seen = HashSet::new();
    for route in &remote.routes {
        if !seen.insert(route.name.as_str()) {
            errors.push(ValidationError::DuplicateRoute(route.name.clone()));
        }
        let parsed = Url::parse(&route.base_url);
        let usable = match (&parsed, route.kind) {
            (Ok(url), RouteKind::Relay | RouteKind::Direct) => !url.cannot_be_a_base(),
            (Ok(_), RouteKind::Proxy) => true,
            (Err(_), _) => false,
        };
        if !usable {
            errors.push(ValidationError::InvalidRouteUrl {
                name: route.name.clone(),
                url: route.base_url.clone(),
            });
        }
    }

    let gate = &config.gate;
    if gate.privileged_secret.is_empty() {
        errors.push(ValidationError::MissingSecret("privileged_secret"));
    }
    if gate.limited_secret.is_empty() {
        errors.push(ValidationError::MissingSecret("limited_secret"));
    }
    if !gate.privileged_secret.is_empty() && gate.privileged_secret == gate.limited_secret {
        errors.push(ValidationError::SharedSecret);
    }
    if gate.daily_limit == 0 {
        errors.push(ValidationError::Zero("gate.daily_limit"));
    }
    if gate.bucket_ttl_secs == 0 {
        errors.push(ValidationError::Zero("gate.bucket_ttl_secs"));
    }

    if config.store.backend == StoreBackend::Redis {
        let scheme_ok = Url::parse(&config.store.redis_url)
            .map(|u| matches!(u.scheme(), "redis" | "rediss"))
            .unwrap_or(false);
        if !scheme_ok {
            errors.push(ValidationError::InvalidRedisUrl(config.store.redis_url.clone()));
        }
    }

    if config.leaderboard.chunk_size == 0 {
        errors.push(ValidationError::Zero("leaderboard.chunk_size"));
    }
    if config.leaderboard.history_count == 0 {
        errors.push(ValidationError::Zero("leaderboard.history_count"));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid() -> TrackerConfig {
        let mut config = TrackerConfig::default();
        config.gate.privileged_secret = "admin".into();
        config.gate.limited_secret = "guest".into();
        config
    }

    #[test]
    fn test_valid_config() {
        assert!(validate_config(&valid()).is_ok());
    }

    #[test]
    fn test_collects_all_errors() {
        let mut config = valid();
        config.gate.privileged_secret.clear();
        config.remote.max_attempts = 0;
        config.leaderboard.chunk_size = 0;

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 3);
        assert!(errors.contains(&ValidationError::MissingSecret("privileged_secret")));
        assert!(errors.contains(&ValidationError::Zero("remote.max_attempts")));
    }

    #[test]
    fn test_shared_secret_rejected() {
        let mut config = valid();
        config.gate.limited_secret = "admin".into();
        assert_eq!(
            validate_config(&config).unwrap_err(),
            vec![ValidationError::SharedSecret]
        );
    }

    #[test]
    fn test_route_checks() {
        let mut config = valid();
        let mut dup = config.remote.routes[0].clone();
        dup.base_url = "not a url".into();
        config.remote.routes.push(dup);

        let errors = validate_config(&config).unwrap_err();
        assert!(errors.contains(&ValidationError::DuplicateRoute("relay".into())));
        assert!(errors
            .iter()
            .any(|e| matches!(e, ValidationError::InvalidRouteUrl { .. })));
    }

    #[test]
    fn test_redis_scheme() {
        let mut config = valid();
        config.store.backend = StoreBackend::Redis;
        config.store.redis_url = "http://localhost:6379".into();
        assert_eq!(
            validate_config(&config).unwrap_err(),
            vec![ValidationError::InvalidRedisUrl("http://localhost:6379".into())]
        );
    }
}
