//! Access routes and the ordered strategy list.
//!
//! # Route kinds
//! - Relay: first-party relay, `{base}/{operation}?{params}`. A configured
//!   status (404 by default) means the relay is not deployed here.
//! - Direct: the upstream API, same address shape as the relay.
//! - Proxy: public CORS proxy wrapping the percent-encoded upstream address,
//!   either as the whole query or under a named key.

use std::fmt;
use std::sync::Arc;

use serde_json::Value;
use url::{form_urlencoded, Url};

use crate::config::{RemoteConfig, RouteConfig, RouteKind, TransformKind};
use crate::remote::error::FetchError;
use crate::remote::operation::Operation;

/// One way of reaching the remote API.
pub trait Route: Send + Sync + fmt::Debug {
    fn name(&self) -> &str;

    /// Address for `operation` on this route.
    fn build_address(&self, operation: &Operation) -> Result<Url, FetchError>;

    /// Reshape the decoded payload into a candidate envelope.
    fn transform_response(&self, raw: Value) -> Result<Value, FetchError> {
        Ok(raw)
    }

    /// Whether `status` means the route itself is absent rather than failing.
    fn signals_unavailable(&self, _status: u16) -> bool {
        false
    }
}

/// `{base}/{operation}?{params}`.
pub fn operation_url(base: &Url, operation: &Operation) -> Option<Url> {
    let mut url = base.clone();
    url.path_segments_mut()
        .ok()?
        .pop_if_empty()
        .push(operation.name());
    if !operation.params().is_empty() {
        url.query_pairs_mut().extend_pairs(operation.params());
    }
    Some(url)
}

fn apply_transform(kind: TransformKind, route: &str, raw: Value) -> Result<Value, FetchError> {
    match kind {
        TransformKind::Identity => Ok(raw),
        TransformKind::Contents => {
            let text = raw.get("contents").and_then(Value::as_str).ok_or_else(|| {
                FetchError::Transient(format!("route '{}' payload has no contents", route))
            })?;
            serde_json::from_str(text).map_err(|e| {
                FetchError::Transient(format!("route '{}' contents not json: {}", route, e))
            })
        }
    }
}

/// Relay or direct route: the operation is appended to an API base.
#[derive(Debug, Clone)]
pub struct ApiRoute {
    name: String,
    base: Url,
    unavailable_status: Option<u16>,
    transform: TransformKind,
}

impl ApiRoute {
    pub fn new(name: impl Into<String>, base: Url) -> Self {
        Self {
            name: name.into(),
            base,
            unavailable_status: None,
            transform: TransformKind::Identity,
        }
    }

    pub fn unavailable_on(mut self, status: u16) -> Self {
        self.unavailable_status = Some(status);
        self
    }

    pub fn with_transform(mut self, transform: TransformKind) -> Self {
        self.transform = transform;
        self
    }
}

impl Route for ApiRoute {
    fn name(&self) -> &str {
        &self.name
    }

    fn build_address(&self, operation: &Operation) -> Result<Url, FetchError> {
        operation_url(&self.base, operation).ok_or_else(|| FetchError::RouteUnavailable {
            route: self.name.clone(),
            reason: format!("'{}' cannot take a path", self.base),
        })
    }

    fn transform_response(&self, raw: Value) -> Result<Value, FetchError> {
        apply_transform(self.transform, &self.name, raw)
    }

    fn signals_unavailable(&self, status: u16) -> bool {
        self.unavailable_status == Some(status)
    }
}

/// Public relay proxy that fetches an encoded upstream address for us.
#[derive(Debug, Clone)]
pub struct ProxyRoute {
    name: String,
    proxy: Url,
    upstream: Url,
    query_key: Option<String>,
    transform: TransformKind,
}

impl ProxyRoute {
    pub fn new(name: impl Into<String>, proxy: Url, upstream: Url) -> Self {
        Self {
            name: name.into(),
            proxy,
            upstream,
            query_key: None,
            transform: TransformKind::Identity,
        }
    }

    pub fn query_key(mut self, key: impl Into<String>) -> Self {
        self.query_key = Some(key.into());
        self
    }

    pub fn with_transform(mut self, transform: TransformKind) -> Self {
        self.transform = transform;
        self
    }
}

impl Route for ProxyRoute {
    fn name(&self) -> &str {
        &self.name
    }

    fn build_address(&self, operation: &Operation) -> Result<Url, FetchError> {
        let target = operation_url(&self.upstream, operation).ok_or_else(|| {
            FetchError::RouteUnavailable {
                route: self.name.clone(),
                reason: format!("upstream '{}' cannot take a path", self.upstream),
            }
        })?;

        let mut url = self.proxy.clone();
        match &self.query_key {
            Some(key) => {
                url.query_pairs_mut().append_pair(key, target.as_str());
            }
            None => {
                let encoded: String =
                    form_urlencoded::byte_serialize(target.as_str().as_bytes()).collect();
                url.set_query(Some(&encoded));
            }
        }
        Ok(url)
    }

    fn transform_response(&self, raw: Value) -> Result<Value, FetchError> {
        apply_transform(self.transform, &self.name, raw)
    }
}

/// Ordered routes, cheapest and most trusted first. Built once at startup.
#[derive(Debug, Clone, Default)]
pub struct StrategyList {
    routes: Vec<Arc<dyn Route>>,
}

impl StrategyList {
    pub fn new(routes: Vec<Arc<dyn Route>>) -> Self {
        Self { routes }
    }

    pub fn from_config(config: &RemoteConfig) -> Result<Self, url::ParseError> {
        let upstream = Url::parse(&config.upstream_url)?;
        let routes = config
            .routes
            .iter()
            .map(|route| build_route(route, &upstream))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { routes })
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<dyn Route>> {
        self.routes.iter()
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    pub fn names(&self) -> Vec<&str> {
        self.routes.iter().map(|r| r.name()).collect()
    }
}

fn build_route(config: &RouteConfig, upstream: &Url) -> Result<Arc<dyn Route>, url::ParseError> {
    let base = Url::parse(&config.base_url)?;
    let route: Arc<dyn Route> = match config.kind {
        RouteKind::Relay | RouteKind::Direct => {
            let mut route = ApiRoute::new(&config.name, base).with_transform(config.transform);
            if let Some(status) = config.unavailable_status {
                route = route.unavailable_on(status);
            }
            Arc::new(route)
        }
        RouteKind::Proxy => {
            let mut route = ProxyRoute::new(&config.name, base, upstream.clone())
                .with_transform(config.transform);
            if let Some(key) = &config.query_key {
                route = route.query_key(key);
            }
            Arc::new(route)
        }
    };
    Ok(route)
}
