//! Distinct solved-problem counts per identity.

use std::collections::HashSet;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::remote::types::Submission;
use crate::remote::ResilientClient;

/// Width of the "recent" window in seconds.
pub const RECENT_WINDOW_SECS: i64 = 86_400;

/// Upper bound on history entries requested per identity.
pub const DEFAULT_HISTORY_COUNT: u32 = 5000;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SolveStat {
    pub handle: String,
    /// Distinct accepted problems over the whole history.
    pub all_time: usize,
    /// Distinct accepted problems submitted in the trailing 24 hours.
    pub recent: usize,
}

/// Count distinct accepted problems in `submissions`.
///
/// `now` is captured once by the caller so every entry is judged against the
/// same window.
pub fn tally(handle: &str, submissions: &[Submission], now: i64) -> SolveStat {
    let cutoff = now - RECENT_WINDOW_SECS;
    let mut all_time = HashSet::new();
    let mut recent = HashSet::new();

    for sub in submissions.iter().filter(|s| s.is_accepted()) {
        let key = sub.problem_key();
        all_time.insert(key);
        if sub.creation_time_seconds >= cutoff {
            recent.insert(key);
        }
    }

    SolveStat {
        handle: handle.to_string(),
        all_time: all_time.len(),
        recent: recent.len(),
    }
}

/// Derives [`SolveStat`]s from submission histories.
///
/// Failures are isolated per identity: a handle whose history cannot be
/// fetched yields `None` and never aborts anything else.
#[derive(Debug, Clone)]
pub struct SolveCounter {
    client: Arc<ResilientClient>,
    history_count: u32,
}

impl SolveCounter {
    pub fn new(client: Arc<ResilientClient>, history_count: u32) -> Self {
        Self {
            client,
            history_count,
        }
    }

    pub async fn compute_stats(&self, handle: &str) -> Option<SolveStat> {
        let now = chrono::Utc::now().timestamp();
        match self.client.submissions(handle, self.history_count).await {
            Ok(submissions) => {
                let stat = tally(handle, &submissions, now);
                tracing::debug!(
                    handle = %handle,
                    submissions = submissions.len(),
                    all_time = stat.all_time,
                    recent = stat.recent,
                    "Solve stats computed"
                );
                Some(stat)
            }
            Err(e) => {
                tracing::warn!(handle = %handle, error = %e, "Could not fetch stats");
                None
            }
        }
    }
}
