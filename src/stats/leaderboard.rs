//! Batched leaderboard over many identities.
//!
//! Identities are processed in small concurrent chunks with a pause between
//! chunks, keeping the request rate under the remote's per-second ceiling.
//! This is the expected way to call [`SolveCounter`] for more than a handful
//! of identities.

use std::time::Duration;

use futures_util::future::join_all;
use serde::Serialize;

use crate::config::LeaderboardConfig;
use crate::stats::solve_counter::{SolveCounter, SolveStat};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchPolicy {
    pub chunk_size: usize,
    pub chunk_delay: Duration,
}

impl Default for BatchPolicy {
    fn default() -> Self {
        Self::from(&LeaderboardConfig::default())
    }
}

impl From<&LeaderboardConfig> for BatchPolicy {
    fn from(config: &LeaderboardConfig) -> Self {
        Self {
            chunk_size: config.chunk_size.max(1),
            chunk_delay: Duration::from_millis(config.chunk_delay_ms),
        }
    }
}

/// Stats for every handle, in input order. `None` marks a handle whose
/// history could not be fetched.
pub async fn compute_batch<S: AsRef<str>>(
    counter: &SolveCounter,
    handles: &[S],
    policy: BatchPolicy,
) -> Vec<(String, Option<SolveStat>)> {
    let mut results = Vec::with_capacity(handles.len());
    let chunks: Vec<&[S]> = handles.chunks(policy.chunk_size.max(1)).collect();

    for (i, chunk) in chunks.iter().enumerate() {
        let stats = join_all(chunk.iter().map(|h| counter.compute_stats(h.as_ref()))).await;
        results.extend(
            chunk
                .iter()
                .map(|h| h.as_ref().to_string())
                .zip(stats),
        );

        if i + 1 < chunks.len() && !policy.chunk_delay.is_zero() {
            tokio::time::sleep(policy.chunk_delay).await;
        }
    }

    results
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Leaderboard {
    /// Ranked by solves in the last 24 hours.
    pub recent: Vec<SolveStat>,
    /// Ranked by lifetime solves.
    pub all_time: Vec<SolveStat>,
    /// Handles left out because their history could not be fetched.
    pub missing: Vec<String>,
}

impl Leaderboard {
    pub fn from_results(results: Vec<(String, Option<SolveStat>)>) -> Self {
        let mut stats = Vec::with_capacity(results.len());
        let mut missing = Vec::new();
        for (handle, stat) in results {
            match stat {
                Some(stat) => stats.push(stat),
                None => missing.push(handle),
            }
        }

        let mut recent = stats.clone();
        recent.sort_by(|a, b| b.recent.cmp(&a.recent));
        let mut all_time = stats;
        all_time.sort_by(|a, b| b.all_time.cmp(&a.all_time));

        Self {
            recent,
            all_time,
            missing,
        }
    }
}

pub async fn build_leaderboard<S: AsRef<str>>(
    counter: &SolveCounter,
    handles: &[S],
    policy: BatchPolicy,
) -> Leaderboard {
    let board = Leaderboard::from_results(compute_batch(counter, handles, policy).await);
    if !board.missing.is_empty() {
        tracing::warn!(missing = ?board.missing, "Leaderboard built with missing identities");
    }
    board
}
