//! HTTP transport seam for the introspection call.
//!
//! The client only needs "POST this body with these headers". Connection
//! pooling, TLS and timeouts belong to the transport. [`ReqwestTransport`]
//! is the default; hosts with their own HTTP stack implement [`HttpPost`].

use crate::config::HttpClientConfig;
use crate::errors::{ConfigError, TransportError};
use tracing::{debug, error};

/// Content type of RFC 7662 introspection requests.
pub const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// Status and body of an HTTP response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    #[must_use]
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    #[must_use]
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Capability to issue one HTTP POST.
///
/// Implementations must not retry on their own behalf beyond what their
/// configuration asks for; the introspection client issues exactly one call.
#[async_trait::async_trait]
pub trait HttpPost: Send + Sync {
    /// POST `body` to `url` with the given headers.
    async fn post(
        &self,
        url: &str,
        body: String,
        headers: &[(String, String)],
    ) -> Result<HttpResponse, TransportError>;
}

/// [`HttpPost`] backed by a pooled `reqwest::Client`.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    /// Build a transport honoring the configured timeouts.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::HttpClient` if the HTTP client cannot be built.
    pub fn new(config: &HttpClientConfig) -> Result<Self, ConfigError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .build()
            .map_err(|e| {
                error!(target: "introspection.transport", error = %e, "Failed to build HTTP client");
                ConfigError::HttpClient(e.to_string())
            })?;

        Ok(Self { client })
    }
}

#[async_trait::async_trait]
impl HttpPost for ReqwestTransport {
    async fn post(
        &self,
        url: &str,
        body: String,
        headers: &[(String, String)],
    ) -> Result<HttpResponse, TransportError> {
        let mut request = self.client.post(url).body(body);
        for (name, value) in headers {
            request = request.header(name.as_str(), value.as_str());
        }

        let response = request.send().await.map_err(|e| {
            debug!(target: "introspection.transport", error = %e, "HTTP request failed");
            TransportError::Request(e.to_string())
        })?;

        let status = response.status().as_u16();
        let body = response.text().await.map_err(|e| {
            debug!(target: "introspection.transport", error = %e, "Failed to read response body");
            TransportError::Body(e.to_string())
        })?;

        Ok(HttpResponse { status, body })
    }
}

/// Mock transport module for testing.
pub mod mock {
    use super::{HttpPost, HttpResponse, TransportError};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Mutex, PoisonError};
    use std::time::Duration;

    /// One request seen by [`MockTransport`].
    #[derive(Debug, Clone)]
    pub struct RecordedRequest {
        pub url: String,
        pub body: String,
        pub headers: Vec<(String, String)>,
    }

    impl RecordedRequest {
        /// Value of the first header named `name` (case-insensitive).
        #[must_use]
        pub fn header(&self, name: &str) -> Option<&str> {
            self.headers
                .iter()
                .find(|(n, _)| n.eq_ignore_ascii_case(name))
                .map(|(_, v)| v.as_str())
        }
    }

    /// Transport returning canned responses in sequence (cycling).
    pub struct MockTransport {
        responses: Vec<Result<HttpResponse, TransportError>>,
        call_count: AtomicUsize,
        requests: Mutex<Vec<RecordedRequest>>,
        delay: Option<Duration>,
    }

    impl MockTransport {
        /// Always answer 200 with `body`.
        #[must_use]
        pub fn ok(body: impl Into<String>) -> Self {
            Self::with_responses(vec![Ok(HttpResponse::new(200, body))])
        }

        /// Always answer with `status` and `body`.
        #[must_use]
        pub fn with_status(status: u16, body: impl Into<String>) -> Self {
            Self::with_responses(vec![Ok(HttpResponse::new(status, body))])
        }

        /// Always fail with `error`.
        #[must_use]
        pub fn failing(error: TransportError) -> Self {
            Self::with_responses(vec![Err(error)])
        }

        /// Return `responses` in order, cycling when exhausted.
        #[must_use]
        pub fn with_responses(responses: Vec<Result<HttpResponse, TransportError>>) -> Self {
            Self {
                responses,
                call_count: AtomicUsize::new(0),
                requests: Mutex::new(Vec::new()),
                delay: None,
            }
        }

        /// Sleep for `delay` before answering each call.
        #[must_use]
        pub fn with_delay(mut self, delay: Duration) -> Self {
            self.delay = Some(delay);
            self
        }

        /// Number of calls made.
        pub fn call_count(&self) -> usize {
            self.call_count.load(Ordering::SeqCst)
        }

        /// Requests seen so far, oldest first.
        pub fn requests(&self) -> Vec<RecordedRequest> {
            self.requests
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .clone()
        }

        pub fn last_request(&self) -> Option<RecordedRequest> {
            self.requests().pop()
        }
    }

    #[async_trait::async_trait]
    impl HttpPost for MockTransport {
        async fn post(
            &self,
            url: &str,
            body: String,
            headers: &[(String, String)],
        ) -> Result<HttpResponse, TransportError> {
            let count = self.call_count.fetch_add(1, Ordering::SeqCst);

            self.requests
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .push(RecordedRequest {
                    url: url.to_string(),
                    body,
                    headers: headers.to_vec(),
                });

            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }

            if self.responses.is_empty() {
                return Err(TransportError::Request(
                    "Mock transport has no responses".to_string(),
                ));
            }

            let idx = count % self.responses.len();
            self.responses.get(idx).cloned().unwrap_or_else(|| {
                Err(TransportError::Request(
                    "Mock transport has no responses".to_string(),
                ))
            })
        }
    }
}
