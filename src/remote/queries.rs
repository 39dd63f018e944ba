//! Typed queries built on the resilient client.

use crate::remote::client::ResilientClient;
use crate::remote::error::FetchResult;
use crate::remote::operation::Operation;
use crate::remote::types::{Contest, Submission, UserProfile};

/// The contest list is large and slow upstream; it gets a longer budget.
pub const CONTEST_LIST_ATTEMPTS: u32 = 5;

/// Profile lookups back the main dashboard view and get the same budget.
pub const USER_INFO_ATTEMPTS: u32 = 5;

impl ResilientClient {
    /// Contests that have not started, soonest first.
    pub async fn upcoming_contests(&self) -> FetchResult<Vec<Contest>> {
        let contests: Vec<Contest> = self
            .execute_with_attempts(&Operation::contest_list(false), CONTEST_LIST_ATTEMPTS)
            .await?;

        let mut upcoming: Vec<Contest> =
            contests.into_iter().filter(Contest::is_upcoming).collect();
        upcoming.sort_by_key(|c| c.start_time_seconds.unwrap_or(i64::MAX));
        Ok(upcoming)
    }

    /// Profiles for `handles`, highest rating first. Unrated profiles come
    /// last, in the order the remote returned them.
    pub async fn user_profiles<S: AsRef<str>>(
        &self,
        handles: &[S],
    ) -> FetchResult<Vec<UserProfile>> {
        if handles.is_empty() {
            return Ok(Vec::new());
        }
        let mut profiles: Vec<UserProfile> = self
            .execute_with_attempts(&Operation::user_info(handles), USER_INFO_ATTEMPTS)
            .await?;
        profiles.sort_by(|a, b| b.rating.cmp(&a.rating));
        Ok(profiles)
    }

    /// Most recent `count` submissions of `handle`.
    pub async fn submissions(&self, handle: &str, count: u32) -> FetchResult<Vec<Submission>> {
        self.execute(&Operation::user_status(handle, 1, count)).await
    }
}
