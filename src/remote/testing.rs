//! Scripted transport shared by unit tests.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use url::Url;

use crate::remote::client::ResilientClient;
use crate::remote::route::{ApiRoute, Route, StrategyList};
use crate::remote::transport::{RawResponse, Transport, TransportError};
use crate::resilience::RetryPolicy;

pub type Reply = Result<RawResponse, String>;

/// Replies per host from a queue. Once a queue is down to its last reply,
/// that reply repeats. Hosts without a script refuse the connection.
#[derive(Default)]
pub struct ScriptedTransport {
    replies: Mutex<HashMap<String, VecDeque<Reply>>>,
    calls: Mutex<Vec<(Url, tokio::time::Instant)>>,
}

impl ScriptedTransport {
    pub fn script(self, host: &str, replies: Vec<Reply>) -> Self {
        self.replies
            .lock()
            .unwrap()
            .insert(host.to_string(), replies.into());
        self
    }

    pub fn calls(&self) -> Vec<(Url, tokio::time::Instant)> {
        self.calls.lock().unwrap().clone()
    }

    pub fn calls_to(&self, host: &str) -> usize {
        self.calls()
            .iter()
            .filter(|(url, _)| url.host_str() == Some(host))
            .count()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn get(&self, url: &Url) -> Result<RawResponse, TransportError> {
        self.calls
            .lock()
            .unwrap()
            .push((url.clone(), tokio::time::Instant::now()));

        let host = url.host_str().unwrap_or_default().to_string();
        let reply = {
            let mut replies = self.replies.lock().unwrap();
            match replies.get_mut(&host) {
                Some(queue) if queue.len() > 1 => queue.pop_front(),
                Some(queue) => queue.front().cloned(),
                None => None,
            }
        };

        match reply {
            Some(Ok(response)) => Ok(response),
            Some(Err(message)) => Err(TransportError::Request {
                url: url.to_string(),
                message,
            }),
            None => Err(TransportError::Request {
                url: url.to_string(),
                message: "connection refused".to_string(),
            }),
        }
    }
}

pub fn ok(body: &str) -> Reply {
    Ok(RawResponse {
        status: 200,
        body: body.to_string(),
    })
}

pub fn status(code: u16) -> Reply {
    Ok(RawResponse {
        status: code,
        body: "<html>nope</html>".to_string(),
    })
}

pub fn route(host: &str) -> ApiRoute {
    ApiRoute::new(host, Url::parse(&format!("http://{}/api", host)).unwrap())
}

pub fn client(routes: Vec<Arc<dyn Route>>, transport: Arc<ScriptedTransport>) -> ResilientClient {
    ResilientClient::new(
        StrategyList::new(routes),
        transport,
        RetryPolicy::default(),
        Duration::from_secs(5),
    )
}
