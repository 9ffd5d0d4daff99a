//! In-memory transport for testing without network access.
//!
//! Serves canned JSON bodies or error statuses keyed on the request path,
//! optionally narrowed by query parameters, and records every request so
//! tests can check what was sent.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use serde_json::Value;

use crate::transport::{Transport, TransportError};

/// A canned reply.
#[derive(Debug, Clone)]
enum MockReply {
    Json(Value),
    Status(u16),
}

#[derive(Debug, Clone)]
struct MockRoute {
    path_suffix: String,
    params: Vec<(String, String)>,
    reply: MockReply,
}

impl MockRoute {
    fn matches(&self, url: &str, params: &[(&str, String)]) -> bool {
        let path = url.split('?').next().unwrap_or(url);
        path.ends_with(&self.path_suffix)
            && self
                .params
                .iter()
                .all(|(k, v)| params.iter().any(|(pk, pv)| pk == k && pv == v))
    }
}

/// A request seen by the mock.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedRequest {
    pub url: String,
    pub params: Vec<(String, String)>,
}

impl RecordedRequest {
    /// Value of a query parameter, if it was sent.
    pub fn param(&self, key: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

/// Mock transport that serves pre-registered responses.
///
/// Routes are tried in registration order; the first whose path suffix and
/// parameters match wins, so register specific routes before catch-alls.
/// Unmatched requests get a 404.
#[derive(Debug, Default)]
pub struct MockTransport {
    routes: Vec<MockRoute>,
    latency: Option<Duration>,
    requests: Mutex<Vec<RecordedRequest>>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `body` for any request whose path ends with `path_suffix`.
    pub fn with_json(self, path_suffix: &str, body: Value) -> Self {
        self.with_json_matching(path_suffix, &[], body)
    }

    /// Serve `body` for requests on `path_suffix` carrying all of `params`.
    pub fn with_json_matching(self, path_suffix: &str, params: &[(&str, &str)], body: Value) -> Self {
        self.route(path_suffix, params, MockReply::Json(body))
    }

    /// Answer requests on `path_suffix` with an error status.
    pub fn with_status(self, path_suffix: &str, status: u16) -> Self {
        self.route(path_suffix, &[], MockReply::Status(status))
    }

    /// Answer matching requests with an error status.
    pub fn with_status_matching(self, path_suffix: &str, params: &[(&str, &str)], status: u16) -> Self {
        self.route(path_suffix, params, MockReply::Status(status))
    }

    /// Delay every reply, so overlapping requests can be observed.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    fn route(mut self, path_suffix: &str, params: &[(&str, &str)], reply: MockReply) -> Self {
        self.routes.push(MockRoute {
            path_suffix: path_suffix.to_string(),
            params: params
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            reply,
        });
        self
    }

    /// All requests received so far, in arrival order.
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Number of requests received so far.
    pub fn request_count(&self) -> usize {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Highest number of requests that were outstanding at the same time.
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    /// Number of requests currently outstanding.
    pub fn in_flight(&self) -> usize {
        self.in_flight.load(Ordering::SeqCst)
    }
}

/// Decrements the in-flight counter even if the request future is dropped.
struct InFlight<'a>(&'a AtomicUsize);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

impl Transport for MockTransport {
    async fn fetch_json(
        &self,
        url: &str,
        params: &[(&str, String)],
    ) -> Result<Value, TransportError> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(RecordedRequest {
                url: url.to_string(),
                params: params
                    .iter()
                    .map(|(k, v)| (k.to_string(), v.clone()))
                    .collect(),
            });

        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        let _guard = InFlight(&self.in_flight);

        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }

        let route = self.routes.iter().find(|r| r.matches(url, params));
        match route.map(|r| &r.reply) {
            Some(MockReply::Json(body)) => Ok(body.clone()),
            Some(MockReply::Status(status)) => Err(TransportError::Status {
                status: *status,
                url: url.to_string(),
                body: String::new(),
            }),
            None => Err(TransportError::Status {
                status: 404,
                url: url.to_string(),
                body: "no mock route".to_string(),
            }),
        }
    }
}
