//! Request identification.
//!
//! # Responsibilities
//! - Generate a UUID v4 request ID when the client sent none
//! - Work out which client identity a request is charged to
//!
//! # Design Decisions
//! - Request ID added as early as possible for tracing
//! - The first `X-Forwarded-For` hop wins over the socket peer only when the
//!   listener is configured to trust it; clients can forge the header

use std::net::SocketAddr;

use axum::http::{HeaderMap, HeaderValue, Request};
use tower_http::request_id::{MakeRequestId, RequestId};
use uuid::Uuid;

pub const X_REQUEST_ID: &str = "x-request-id";
pub const X_FORWARDED_FOR: &str = "x-forwarded-for";

/// Mints `x-request-id` values.
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidRequestId;

impl MakeRequestId for UuidRequestId {
    fn make_request_id<B>(&mut self, _request: &Request<B>) -> Option<RequestId> {
        HeaderValue::from_str(&Uuid::new_v4().to_string())
            .ok()
            .map(RequestId::new)
    }
}

/// Request ID header value, or `"unknown"`.
pub fn request_id(headers: &HeaderMap) -> String {
    headers
        .get(X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown")
        .to_string()
}

/// Identity charged for quota: the first forwarded hop when `trust_forwarded`
/// is set and the header is present, else the peer IP.
pub fn client_identity(headers: &HeaderMap, trust_forwarded: bool, peer: SocketAddr) -> String {
    if !trust_forwarded {
        return peer.ip().to_string();
    }
    headers
        .get(X_FORWARDED_FOR)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|hop| !hop.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| peer.ip().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn peer() -> SocketAddr {
        "10.0.0.9:51234".parse().unwrap()
    }

    #[test]
    fn test_identity_from_forwarded_for() {
        let mut headers = HeaderMap::new();
        headers.insert(X_FORWARDED_FOR, HeaderValue::from_static("1.2.3.4, 10.0.0.1"));
        assert_eq!(client_identity(&headers, true, peer()), "1.2.3.4");
    }

    #[test]
    fn test_identity_falls_back_to_peer() {
        let mut headers = HeaderMap::new();
        assert_eq!(client_identity(&headers, true, peer()), "10.0.0.9");

        headers.insert(X_FORWARDED_FOR, HeaderValue::from_static("  "));
        assert_eq!(client_identity(&headers, true, peer()), "10.0.0.9");
    }

    #[test]
    fn test_untrusted_forwarded_for_is_ignored() {
        let mut headers = HeaderMap::new();
        headers.insert(X_FORWARDED_FOR, HeaderValue::from_static("6.6.6.6"));
        assert_eq!(client_identity(&headers, false, peer()), "10.0.0.9");
    }

    #[test]
    fn test_request_ids_are_unique() {
        let request = Request::new(());
        let mut maker = UuidRequestId;
        let a = maker.make_request_id(&request).unwrap();
        let b = maker.make_request_id(&request).unwrap();
        assert_ne!(a.header_value(), b.header_value());
    }
}
