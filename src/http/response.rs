//! Response bodies and error mapping.
//!
//! # Design Decisions
//! - Remote failures become 503 with a retry hint, never internal detail
//! - Store failures become a bare 500 "Server Error"
//! - Credential failures never say which tier was tried

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::gate::{Decision, GateError};
use crate::remote::FetchError;

pub const MSG_INVALID_CREDENTIALS: &str = "Invalid Credentials";
pub const MSG_SERVER_ERROR: &str = "Server Error";
pub const MSG_REMOTE_UNAVAILABLE: &str =
    "Connection to Codeforces is unstable right now. Please retry in a moment.";

pub const TIER_PRIVILEGED: &str = "admin";
pub const TIER_LIMITED: &str = "guest";

/// Body returned by `/api/verify`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VerifyBody {
    pub success: bool,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub tier: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remaining: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl VerifyBody {
    fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            tier: None,
            remaining: None,
            limit: None,
            message: Some(message.into()),
        }
    }
}

/// Status and body for a gate decision.
pub fn decision_response(decision: Decision) -> (StatusCode, VerifyBody) {
    match decision {
        Decision::Privileged => (
            StatusCode::OK,
            VerifyBody {
                success: true,
                tier: Some(TIER_PRIVILEGED),
                remaining: None,
                limit: None,
                message: None,
            },
        ),
        Decision::Limited { remaining } => (
            StatusCode::OK,
            VerifyBody {
                success: true,
                tier: Some(TIER_LIMITED),
                remaining: Some(remaining),
                limit: None,
                message: None,
            },
        ),
        Decision::Rejected => (
            StatusCode::UNAUTHORIZED,
            VerifyBody::failure(MSG_INVALID_CREDENTIALS),
        ),
        Decision::Exhausted { limit_per_day } => (
            StatusCode::TOO_MANY_REQUESTS,
            VerifyBody {
                limit: Some(limit_per_day),
                ..VerifyBody::failure(format!(
                    "Daily limit exceeded ({0}/{0}). Try again tomorrow.",
                    limit_per_day
                ))
            },
        ),
    }
}

/// Errors surfaced by the HTTP handlers.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error(transparent)]
    Remote(#[from] FetchError),

    #[error(transparent)]
    Gate(#[from] GateError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Remote(e) => {
                tracing::error!(error = %e, "Remote data unavailable");
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    Json(VerifyBody::failure(MSG_REMOTE_UNAVAILABLE)),
                )
                    .into_response()
            }
            ApiError::Gate(e) => {
                tracing::error!(error = %e, "Gate failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(VerifyBody::failure(MSG_SERVER_ERROR)),
                )
                    .into_response()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_exhausted_body() {
        let (status, body) = decision_response(Decision::Exhausted { limit_per_day: 10 });
        assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(
            serde_json::to_value(body).unwrap(),
            json!({
                "success": false,
                "limit": 10,
                "message": "Daily limit exceeded (10/10). Try again tomorrow."
            })
        );
    }

    #[test]
    fn test_limited_body() {
        let (status, body) = decision_response(Decision::Limited { remaining: 4 });
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            serde_json::to_value(body).unwrap(),
            json!({"success": true, "type": "guest", "remaining": 4})
        );
    }

    #[test]
    fn test_rejected_body_is_tier_neutral() {
        let (status, body) = decision_response(Decision::Rejected);
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(
            serde_json::to_value(body).unwrap(),
            json!({"success": false, "message": "Invalid Credentials"})
        );
    }
}
