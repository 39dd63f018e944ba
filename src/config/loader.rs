//! Configuration loading from disk and environment.

use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::config::schema::TrackerConfig;
use crate::config::validation::{validate_config, ValidationError};

pub const ENV_PRIVILEGED_SECRET: &str = "ADMIN_PASS";
pub const ENV_LIMITED_SECRET: &str = "GUEST_PASS";
pub const ENV_DAILY_LIMIT: &str = "GUEST_DAILY_LIMIT";

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid {name}: {value}")]
    Env { name: &'static str, value: String },

    #[error("Validation failed: {}", join(.0))]
    Validation(Vec<ValidationError>),
}

fn join(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<TrackerConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    let config: TrackerConfig = toml::from_str(&content)?;
    finish(config)
}

/// Build a configuration from defaults when no file is given.
pub fn load_default() -> Result<TrackerConfig, ConfigError> {
    finish(TrackerConfig::default())
}

/// Like [`load_config`] / [`load_default`] but without requiring gate
/// secrets, for tools that only talk to the remote API.
pub fn load_client_config(path: Option<&Path>) -> Result<TrackerConfig, ConfigError> {
    let mut config = match path {
        Some(path) => toml::from_str(&fs::read_to_string(path)?)?,
        None => TrackerConfig::default(),
    };
    apply_env_overrides(&mut config, |name| std::env::var(name).ok())?;
    config.align_default_relay();

    let errors: Vec<ValidationError> = validate_config(&config)
        .err()
        .unwrap_or_default()
        .into_iter()
        .filter(|e| !e.is_secret_error())
        .collect();
    if errors.is_empty() {
        Ok(config)
    } else {
        Err(ConfigError::Validation(errors))
    }
}

fn finish(mut config: TrackerConfig) -> Result<TrackerConfig, ConfigError> {
    apply_env_overrides(&mut config, |name| std::env::var(name).ok())?;
    config.align_default_relay();
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

/// Secrets are expected from the environment rather than the file.
pub fn apply_env_overrides<F>(config: &mut TrackerConfig, lookup: F) -> Result<(), ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(secret) = lookup(ENV_PRIVILEGED_SECRET) {
        config.gate.privileged_secret = secret;
    }
    if let Some(secret) = lookup(ENV_LIMITED_SECRET) {
        config.gate.limited_secret = secret;
    }
    if let Some(raw) = lookup(ENV_DAILY_LIMIT) {
        config.gate.daily_limit = raw.trim().parse().map_err(|_| ConfigError::Env {
            name: ENV_DAILY_LIMIT,
            value: raw.clone(),
        })?;
    }
    Ok(())
}
