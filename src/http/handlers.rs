//! Request handlers for the access gate and the dashboard data.

use std::net::SocketAddr;
use std::time::Instant;

use axum::{
    extract::{rejection::JsonRejection, ConnectInfo, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use serde_json::json;

use crate::http::request::{client_identity, request_id};
use crate::http::response::{decision_response, ApiError};
use crate::http::server::AppState;
use crate::observability::metrics;
use crate::stats::build_leaderboard;

#[derive(Debug, Default, Deserialize)]
pub struct VerifyRequest {
    #[serde(default, alias = "credential")]
    pub password: String,
}

/// `POST /api/verify`
///
/// An unreadable body counts as an empty credential and is rejected like any
/// other mismatch.
pub async fn verify_handler(
    State(state): State<AppState>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
    body: Result<Json<VerifyRequest>, JsonRejection>,
) -> Response {
    let start = Instant::now();
    let identity = client_identity(&headers, state.trust_forwarded_for, peer);
    let body = match body {
        Ok(Json(body)) => body,
        Err(rejection) => {
            tracing::debug!(identity = %identity, error = %rejection, "Unreadable verify body");
            VerifyRequest::default()
        }
    };

    let response = match state
        .gate
        .authorize(&body.password, &identity, chrono::Utc::now())
        .await
    {
        Ok(decision) => {
            let (status, body) = decision_response(decision);
            (status, Json(body)).into_response()
        }
        Err(e) => {
            tracing::error!(
                request_id = %request_id(&headers),
                identity = %identity,
                "Verify failed"
            );
            ApiError::from(e).into_response()
        }
    };

    metrics::record_request("POST", response.status().as_u16(), start);
    response
}

/// `GET /api/contests`
pub async fn contests_handler(State(state): State<AppState>) -> Result<Response, ApiError> {
    let start = Instant::now();
    let contests = state.client.upcoming_contests().await.inspect_err(|_| {
        metrics::record_request("GET", 503, start);
    })?;
    metrics::record_request("GET", 200, start);
    Ok(Json(contests).into_response())
}

/// `GET /api/users`
pub async fn users_handler(State(state): State<AppState>) -> Result<Response, ApiError> {
    let start = Instant::now();
    let profiles = state
        .client
        .user_profiles(state.tracked.as_slice())
        .await
        .inspect_err(|_| {
            metrics::record_request("GET", 503, start);
        })?;
    metrics::record_request("GET", 200, start);
    Ok(Json(profiles).into_response())
}

/// `GET /api/leaderboard`
///
/// Handles whose history cannot be fetched are listed under `missing`; the
/// board is still served.
pub async fn leaderboard_handler(State(state): State<AppState>) -> Response {
    let start = Instant::now();
    let board = build_leaderboard(&state.counter, state.tracked.as_slice(), state.batch).await;
    metrics::record_request("GET", 200, start);
    Json(board).into_response()
}

/// `GET /health`
pub async fn health_handler(State(state): State<AppState>) -> Response {
    (
        StatusCode::OK,
        Json(json!({
            "status": "ok",
            "version": env!("CARGO_PKG_VERSION"),
            "routes": state.client.routes().names(),
        })),
    )
        .into_response()
}
