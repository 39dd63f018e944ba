//! Same-origin relay to the upstream API.
//!
//! `GET /api/cf/{method}?{query}` is forwarded verbatim to
//! `{upstream_url}/{method}?{query}`; status and body come back unchanged.
//! When the upstream cannot be reached the relay answers with a FAILED
//! envelope so callers treat it like any other remote failure.

use std::time::{Duration, Instant};

use axum::{
    extract::{Path, RawQuery, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use url::Url;

use crate::http::server::AppState;
use crate::observability::metrics;
use crate::remote::ClientBuildError;

/// Forwarding half of the relay: the upstream base and an HTTP client.
#[derive(Debug, Clone)]
pub struct Relay {
    http: reqwest::Client,
    upstream: Url,
}

impl Relay {
    pub fn new(upstream_url: &str, timeout: Duration) -> Result<Self, ClientBuildError> {
        let upstream = Url::parse(upstream_url)?;
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("cf-tracker-relay/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { http, upstream })
    }

    /// Upstream address for `method`, or `None` if the name is not a plain
    /// method identifier such as `user.status`.
    pub fn target(&self, method: &str, query: Option<&str>) -> Option<Url> {
        let valid = !method.is_empty()
            && method
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '.');
        if !valid {
            return None;
        }

        let mut url = self.upstream.clone();
        url.path_segments_mut().ok()?.pop_if_empty().push(method);
        url.set_query(query.filter(|q| !q.is_empty()));
        Some(url)
    }
}

fn failed_envelope(status: StatusCode, comment: &str) -> Response {
    (status, Json(json!({ "status": "FAILED", "comment": comment }))).into_response()
}

pub async fn relay_handler(
    State(state): State<AppState>,
    Path(method): Path<String>,
    RawQuery(query): RawQuery,
) -> Response {
    let start = Instant::now();
    let Some(target) = state.relay.target(&method, query.as_deref()) else {
        metrics::record_request("GET", 400, start);
        return failed_envelope(StatusCode::BAD_REQUEST, "Unknown method");
    };

    tracing::debug!(method = %method, target = %target, "Relaying request");

    let upstream = match state.relay.http.get(target).send().await {
        Ok(response) => response,
        Err(e) => {
            tracing::warn!(method = %method, error = %e, "Relay could not reach upstream");
            metrics::record_request("GET", 502, start);
            return failed_envelope(StatusCode::BAD_GATEWAY, "Upstream unreachable");
        }
    };

    let status =
        StatusCode::from_u16(upstream.status().as_u16()).unwrap_or(StatusCode::BAD_GATEWAY);
    match upstream.text().await {
        Ok(body) => {
            metrics::record_request("GET", status.as_u16(), start);
            (status, [(header::CONTENT_TYPE, "application/json")], body).into_response()
        }
        Err(e) => {
            tracing::warn!(method = %method, error = %e, "Relay failed reading upstream body");
            metrics::record_request("GET", 502, start);
            failed_envelope(StatusCode::BAD_GATEWAY, "Upstream body unreadable")
        }
    }
}
