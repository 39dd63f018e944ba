//! Credential tiers and the daily limited-tier quota.

use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use thiserror::Error;

use crate::config::GateConfig;
use crate::gate::store::{CounterStore, StoreError};
use crate::observability::metrics;

/// Outcome of one access attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "decision", rename_all = "snake_case")]
pub enum Decision {
    /// Unlimited and uncounted.
    Privileged,
    /// Admitted; `remaining` more requests today.
    Limited { remaining: u64 },
    /// Credential matched no tier.
    Rejected,
    /// Limited tier over today's budget.
    Exhausted { limit_per_day: u64 },
}

impl Decision {
    pub fn is_admitted(&self) -> bool {
        matches!(self, Decision::Privileged | Decision::Limited { .. })
    }

    fn label(&self) -> &'static str {
        match self {
            Decision::Privileged => "privileged",
            Decision::Limited { .. } => "limited",
            Decision::Rejected => "rejected",
            Decision::Exhausted { .. } => "exhausted",
        }
    }
}

/// The store failed; the request was neither admitted nor refused.
#[derive(Debug, Error)]
pub enum GateError {
    #[error("quota store error: {0}")]
    Store(#[from] StoreError),
}

/// Counter key for one (identity, UTC day) bucket, e.g.
/// `guest_usage:2026-01-07:1.2.3.4`.
pub fn bucket_key(prefix: &str, day: NaiveDate, identity: &str) -> String {
    format!("{}:{}:{}", prefix, day.format("%Y-%m-%d"), identity)
}

pub struct QuotaGate {
    privileged_secret: String,
    limited_secret: String,
    daily_limit: u64,
    key_prefix: String,
    bucket_ttl_secs: u64,
    store: Arc<dyn CounterStore>,
}

impl QuotaGate {
    pub fn new(config: &GateConfig, store: Arc<dyn CounterStore>) -> Self {
        Self {
            privileged_secret: config.privileged_secret.clone(),
            limited_secret: config.limited_secret.clone(),
            daily_limit: config.daily_limit,
            key_prefix: config.key_prefix.clone(),
            bucket_ttl_secs: config.bucket_ttl_secs,
            store,
        }
    }

    pub fn daily_limit(&self) -> u64 {
        self.daily_limit
    }

    /// Classify `credential` and, for the limited tier, charge one request
    /// to `identity`'s bucket for the UTC day of `now`.
    ///
    /// The counter is never rolled back: a refused request still counts, and
    /// the stored value may exceed the limit.
    pub async fn authorize(
        &self,
        credential: &str,
        identity: &str,
        now: DateTime<Utc>,
    ) -> Result<Decision, GateError> {
        let decision = if secret_matches(&self.privileged_secret, credential) {
            Decision::Privileged
        } else if secret_matches(&self.limited_secret, credential) {
            self.charge(identity, now).await?
        } else {
            Decision::Rejected
        };

        metrics::record_gate_decision(decision.label());
        tracing::debug!(identity = %identity, decision = decision.label(), "Access decision");
        Ok(decision)
    }

    async fn charge(&self, identity: &str, now: DateTime<Utc>) -> Result<Decision, GateError> {
        let key = bucket_key(&self.key_prefix, now.date_naive(), identity);

        let used = self.store.increment(&key).await.map_err(|e| {
            tracing::error!(key = %key, error = %e, "Quota increment failed");
            e
        })?;

        if used == 1 {
            self.store.set_expiry(&key, self.bucket_ttl_secs).await.map_err(|e| {
                tracing::error!(key = %key, error = %e, "Arming quota expiry failed");
                e
            })?;
        }

        if used <= self.daily_limit {
            Ok(Decision::Limited {
                remaining: self.daily_limit - used,
            })
        } else {
            tracing::warn!(
                identity = %identity,
                used,
                limit = self.daily_limit,
                "Daily quota exhausted"
            );
            Ok(Decision::Exhausted {
                limit_per_day: self.daily_limit,
            })
        }
    }
}

impl std::fmt::Debug for QuotaGate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QuotaGate")
            .field("daily_limit", &self.daily_limit)
            .field("key_prefix", &self.key_prefix)
            .field("bucket_ttl_secs", &self.bucket_ttl_secs)
            .finish_non_exhaustive()
    }
}

/// An unset secret matches nothing, not even an empty credential.
fn secret_matches(secret: &str, credential: &str) -> bool {
    !secret.is_empty() && secret == credential
}
