//! Access gate subsystem.
//!
//! # Data Flow
//! ```text
//! POST /api/verify {password}
//!     → quota.rs (privileged? limited? neither?)
//!         → limited: store.rs INCR bucket (identity, UTC day)
//!         → first unit: EXPIRE bucket 24h
//!         → compare with daily limit
//!     → Decision or GateError
//! ```
//!
//! # Design Decisions
//! - Privileged requests are never counted
//! - The store's atomic increment is the only concurrency control
//! - Store failures are errors, never admissions or refusals

pub mod quota;
pub mod store;

pub use quota::{bucket_key, Decision, GateError, QuotaGate};
pub use store::{CounterStore, MemoryCounterStore, RedisCounterStore, StoreError};

use std::sync::{Arc, Weak};
use std::time::Duration;

use crate::config::{StoreBackend, StoreConfig};

/// Build the counter store selected by configuration.
pub async fn build_store(config: &StoreConfig) -> Result<Arc<dyn CounterStore>, StoreError> {
    match config.backend {
        StoreBackend::Memory => {
            tracing::warn!("Using in-memory counter store; quotas reset on restart");
            let store = Arc::new(MemoryCounterStore::new());
            spawn_purger(Arc::downgrade(&store));
            Ok(store)
        }
        StoreBackend::Redis => {
            let timeout = Duration::from_millis(config.connect_timeout_ms);
            Ok(Arc::new(RedisCounterStore::connect(&config.redis_url, timeout).await?))
        }
    }
}

const PURGE_INTERVAL: Duration = Duration::from_secs(600);

/// Periodically drop expired buckets until the store itself is dropped.
fn spawn_purger(store: Weak<MemoryCounterStore>) {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(PURGE_INTERVAL);
        ticker.tick().await;
        loop {
            ticker.tick().await;
            let Some(store) = store.upgrade() else { break };
            let removed = store.purge_expired();
            if removed > 0 {
                tracing::debug!(removed, remaining = store.len(), "Purged expired quota buckets");
            }
        }
    });
}
