//! Durable counters with expiry.
//!
//! # Responsibilities
//! - Atomically increment a named counter and return the new value
//! - Arm an expiry on a counter so unused buckets clean themselves up
//!
//! # Design Decisions
//! - Atomicity is the store's job; callers never lock
//! - Expired counters read as absent and restart from zero
//! - Redis in production, DashMap for single-process deployments and tests

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use redis::aio::ConnectionManager;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("counter store unavailable: {0}")]
    Unavailable(String),

    #[error("counter store command failed: {0}")]
    Command(String),
}

impl From<redis::RedisError> for StoreError {
    fn from(e: redis::RedisError) -> Self {
        if e.is_io_error()
            || e.is_connection_dropped()
            || e.is_connection_refusal()
            || e.is_timeout()
        {
            StoreError::Unavailable(e.to_string())
        } else {
            StoreError::Command(e.to_string())
        }
    }
}

#[async_trait]
pub trait CounterStore: Send + Sync {
    /// Add one to `key`, creating it at zero first if absent. Returns the
    /// post-increment value.
    async fn increment(&self, key: &str) -> Result<u64, StoreError>;

    /// Expire `key` `seconds` from now.
    async fn set_expiry(&self, key: &str, seconds: u64) -> Result<(), StoreError>;
}

pub type Clock = Arc<dyn Fn() -> DateTime<Utc> + Send + Sync>;

#[derive(Debug, Clone, Copy)]
struct Record {
    count: u64,
    expires_at: Option<DateTime<Utc>>,
}

impl Record {
    fn is_live(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.map_or(true, |at| at > now)
    }
}

/// In-process counter store. Each increment runs under the key's shard
/// lock, so concurrent increments of one key never observe the same value.
pub struct MemoryCounterStore {
    records: DashMap<String, Record>,
    clock: Clock,
}

impl MemoryCounterStore {
    pub fn new() -> Self {
        Self::with_clock(Arc::new(Utc::now))
    }

    pub fn with_clock(clock: Clock) -> Self {
        Self {
            records: DashMap::new(),
            clock,
        }
    }

    /// Current value of `key`, if it exists and has not expired.
    pub fn get(&self, key: &str) -> Option<u64> {
        let now = (self.clock)();
        self.records
            .get(key)
            .filter(|r| r.is_live(now))
            .map(|r| r.count)
    }

    /// Drop expired records. Returns how many were removed, net of keys
    /// inserted concurrently.
    pub fn purge_expired(&self) -> usize {
        let now = (self.clock)();
        let before = self.records.len();
        self.records.retain(|_, r| r.is_live(now));
        before.saturating_sub(self.records.len())
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl Default for MemoryCounterStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CounterStore for MemoryCounterStore {
    async fn increment(&self, key: &str) -> Result<u64, StoreError> {
        let now = (self.clock)();
        let mut record = self.records.entry(key.to_string()).or_insert(Record {
            count: 0,
            expires_at: None,
        });
        if !record.is_live(now) {
            *record = Record {
                count: 0,
                expires_at: None,
            };
        }
        record.count += 1;
        Ok(record.count)
    }

    async fn set_expiry(&self, key: &str, seconds: u64) -> Result<(), StoreError> {
        let now = (self.clock)();
        let ttl = chrono::Duration::seconds(seconds.min(u32::MAX as u64) as i64);
        if let Some(mut record) = self.records.get_mut(key) {
            record.expires_at = Some(now + ttl);
        }
        Ok(())
    }
}

/// Redis-backed store using `INCR` and `EXPIRE`.
#[derive(Clone)]
pub struct RedisCounterStore {
    connection: ConnectionManager,
}

impl RedisCounterStore {
    pub async fn connect(redis_url: &str, timeout: Duration) -> Result<Self, StoreError> {
        let client = redis::Client::open(redis_url)?;
        let connection = tokio::time::timeout(timeout, client.get_connection_manager())
            .await
            .map_err(|_| {
                StoreError::Unavailable(format!(
                    "connecting to redis timed out after {:?}",
                    timeout
                ))
            })??;

        tracing::info!("Connected to redis counter store");
        Ok(Self { connection })
    }
}

#[async_trait]
impl CounterStore for RedisCounterStore {
    async fn increment(&self, key: &str) -> Result<u64, StoreError> {
        let mut connection = self.connection.clone();
        let value: u64 = redis::cmd("INCR").arg(key).query_async(&mut connection).await?;
        Ok(value)
    }

    async fn set_expiry(&self, key: &str, seconds: u64) -> Result<(), StoreError> {
        let mut connection = self.connection.clone();
        let _: i64 = redis::cmd("EXPIRE")
            .arg(key)
            .arg(seconds)
            .query_async(&mut connection)
            .await?;
        Ok(())
    }
}
