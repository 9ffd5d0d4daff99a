//! HTTP transport used by the API clients.
//!
//! The rest of the crate only needs one thing from the network: fetch a URL
//! with some query parameters and hand back the decoded JSON body. The
//! [`Transport`] trait captures that, so the mapping and aggregation logic can
//! be exercised against [`crate::mock::MockTransport`] without a server.

use std::sync::Arc;
use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use serde_json::Value;
use tracing::{debug, trace};

/// How much of an error body to keep for diagnostics.
const ERROR_BODY_LIMIT: usize = 500;

/// Errors from the transport layer.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// HTTP request failed (network error, timeout, etc.)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Server answered with a non-2xx status
    #[error("API error {status} from {url}: {body}")]
    Status {
        status: u16,
        url: String,
        body: String,
    },

    /// Body was not valid JSON
    #[error("invalid JSON from {url}: {message}")]
    Json { url: String, message: String },

    /// A configured header value cannot be sent
    #[error("invalid {name} header: {value:?}")]
    InvalidHeader { name: &'static str, value: String },
}

impl TransportError {
    /// HTTP status of the failed exchange, when the server answered.
    pub fn status(&self) -> Option<u16> {
        match self {
            TransportError::Http(e) => e.status().map(|s| s.as_u16()),
            TransportError::Status { status, .. } => Some(*status),
            TransportError::Json { .. } | TransportError::InvalidHeader { .. } => None,
        }
    }

    /// Whether the server reported the resource as missing.
    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }
}

/// Fetches JSON documents.
///
/// Implementations own whatever connection state they need; callers never
/// open or close sessions through this trait.
pub trait Transport {
    /// GET `url` with `params` as the query string and decode the body.
    ///
    /// Any non-2xx response must be reported as [`TransportError::Status`].
    async fn fetch_json(
        &self,
        url: &str,
        params: &[(&str, String)],
    ) -> Result<Value, TransportError>;
}

impl<T: Transport> Transport for Arc<T> {
    async fn fetch_json(
        &self,
        url: &str,
        params: &[(&str, String)],
    ) -> Result<Value, TransportError> {
        (**self).fetch_json(url, params).await
    }
}

impl<T: Transport> Transport for &T {
    async fn fetch_json(
        &self,
        url: &str,
        params: &[(&str, String)],
    ) -> Result<Value, TransportError> {
        (**self).fetch_json(url, params).await
    }
}

/// [`Transport`] backed by a `reqwest::Client`.
///
/// `reqwest::Client` is a cheap handle onto a shared connection pool, so
/// clones of this transport all use the same pool.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    http: reqwest::Client,
}

impl HttpTransport {
    /// Build a transport with its own connection pool.
    pub fn new(timeout: Duration, user_agent: &str) -> Result<Self, TransportError> {
        let mut headers = HeaderMap::new();
        let agent =
            HeaderValue::from_str(user_agent).map_err(|_| TransportError::InvalidHeader {
                name: "User-Agent",
                value: user_agent.to_string(),
            })?;
        headers.insert(USER_AGENT, agent);

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()?;

        Ok(Self { http })
    }

    /// Wrap a client created (and owned) by the caller.
    ///
    /// Timeouts and other policy are whatever the caller configured.
    pub fn with_client(http: reqwest::Client) -> Self {
        Self { http }
    }
}

impl Transport for HttpTransport {
    async fn fetch_json(
        &self,
        url: &str,
        params: &[(&str, String)],
    ) -> Result<Value, TransportError> {
        debug!(url, params = params.len(), "GET");

        let response = self.http.get(url).query(params).send().await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(TransportError::Status {
                status: status.as_u16(),
                url: url.to_string(),
                body: body.chars().take(ERROR_BODY_LIMIT).collect(),
            });
        }

        let body = response.text().await?;
        trace!(url, bytes = body.len(), "response body");

        serde_json::from_str(&body).map_err(|e| TransportError::Json {
            url: url.to_string(),
            message: e.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = TransportError::Status {
            status: 500,
            url: "http://example.test/x".into(),
            body: "Internal Server Error".into(),
        };
        assert_eq!(
            err.to_string(),
            "API error 500 from http://example.test/x: Internal Server Error"
        );
        assert_eq!(err.status(), Some(500));
        assert!(!err.is_not_found());

        let err = TransportError::Json {
            url: "http://example.test/x".into(),
            message: "expected value".into(),
        };
        assert!(err.to_string().contains("invalid JSON"));
        assert_eq!(err.status(), None);
    }

    #[test]
    fn not_found_detection() {
        let err = TransportError::Status {
            status: 404,
            url: String::new(),
            body: String::new(),
        };
        assert!(err.is_not_found());
    }

    #[test]
    fn transport_creation() {
        let transport = HttpTransport::new(Duration::from_secs(5), "vigicrues-test");
        assert!(transport.is_ok());
    }

    #[test]
    fn invalid_user_agent_rejected() {
        let err = HttpTransport::new(Duration::from_secs(5), "bad\nagent").unwrap_err();
        assert!(matches!(
            err,
            TransportError::InvalidHeader { name: "User-Agent", .. }
        ));
        assert_eq!(err.status(), None);
    }
}
