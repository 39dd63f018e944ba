//! Remote access error taxonomy.

use thiserror::Error;

/// Errors produced while executing a remote operation.
///
/// Only [`FetchError::RemoteUnavailable`] leaves the client; the other
/// variants describe single attempts and are absorbed by retry and fallback.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    /// The route is not usable in this deployment. Its remaining attempts
    /// are skipped.
    #[error("route '{route}' unavailable: {reason}")]
    RouteUnavailable { route: String, reason: String },

    /// Network, timeout, HTTP or decoding failure.
    #[error("transient failure: {0}")]
    Transient(String),

    /// The envelope reported FAILED. Retried like a transient failure.
    #[error("remote rejected request: {0}")]
    RemoteRejected(String),

    /// Every route exhausted its attempts.
    #[error("{operation} failed on every route after {attempts} attempts: {last}")]
    RemoteUnavailable {
        operation: String,
        attempts: u32,
        last: Box<FetchError>,
    },
}

impl FetchError {
    pub fn is_route_unavailable(&self) -> bool {
        matches!(self, FetchError::RouteUnavailable { .. })
    }

    /// Short label used for metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            FetchError::RouteUnavailable { .. } => "route_unavailable",
            FetchError::Transient(_) => "transient",
            FetchError::RemoteRejected(_) => "rejected",
            FetchError::RemoteUnavailable { .. } => "unavailable",
        }
    }
}

pub type FetchResult<T> = Result<T, FetchError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = FetchError::RemoteUnavailable {
            operation: "user.status".into(),
            attempts: 7,
            last: Box::new(FetchError::RemoteRejected("handle not found".into())),
        };
        let text = err.to_string();
        assert!(text.contains("user.status"));
        assert!(text.contains("7 attempts"));
        assert!(text.contains("handle not found"));
        assert_eq!(err.kind(), "unavailable");
    }
}
