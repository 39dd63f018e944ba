//! Payload shapes returned by the remote API.
//!
//! Only the fields this crate reads are modelled; everything else in the
//! upstream objects is ignored on decode.

use serde::{Deserialize, Serialize};

/// Verdict of an accepted submission.
pub const VERDICT_ACCEPTED: &str = "OK";

/// Contest phase before registration closes.
pub const PHASE_BEFORE: &str = "BEFORE";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Contest {
    pub id: i64,
    pub name: String,
    pub phase: String,
    pub duration_seconds: i64,
    #[serde(default)]
    pub start_time_seconds: Option<i64>,
    #[serde(default)]
    pub relative_time_seconds: Option<i64>,
}

impl Contest {
    pub fn is_upcoming(&self) -> bool {
        self.phase == PHASE_BEFORE
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub handle: String,
    #[serde(default)]
    pub rating: Option<i64>,
    #[serde(default)]
    pub max_rating: Option<i64>,
    #[serde(default)]
    pub rank: Option<String>,
    #[serde(default)]
    pub max_rank: Option<String>,
    #[serde(default)]
    pub avatar: Option<String>,
    #[serde(default)]
    pub title_photo: Option<String>,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Problem {
    #[serde(default)]
    pub contest_id: Option<i64>,
    pub index: String,
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Submission {
    pub id: i64,
    #[serde(default)]
    pub contest_id: Option<i64>,
    pub creation_time_seconds: i64,
    pub problem: Problem,
    /// Absent while the submission is still being judged.
    #[serde(default)]
    pub verdict: Option<String>,
}

impl Submission {
    pub fn is_accepted(&self) -> bool {
        self.verdict.as_deref() == Some(VERDICT_ACCEPTED)
    }

    /// Distinctness key: (contest id, problem index).
    pub fn problem_key(&self) -> (Option<i64>, &str) {
        (
            self.problem.contest_id.or(self.contest_id),
            self.problem.index.as_str(),
        )
    }
}
