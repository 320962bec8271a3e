//! Mock introspection endpoint for integration tests.

use serde_json::Value;
use std::time::Duration;
use token_introspection::IntrospectionServerConfig;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, Request, ResponseTemplate};

/// Path the mock endpoint is served on.
pub const INTROSPECT_PATH: &str = "/oauth2/introspect";

/// Wiremock server standing in for an authorization server's
/// introspection endpoint.
///
/// Expectations registered with a call count are verified when the server
/// is dropped.
pub struct TestIntrospectionServer {
    server: MockServer,
}

impl TestIntrospectionServer {
    /// Start a server with no mounted responses.
    pub async fn start() -> Self {
        Self {
            server: MockServer::start().await,
        }
    }

    /// Full introspection endpoint URL.
    pub fn url(&self) -> String {
        format!("{}{}", self.server.uri(), INTROSPECT_PATH)
    }

    /// Server config pointing at this endpoint, without a cache.
    pub fn config(&self) -> IntrospectionServerConfig {
        IntrospectionServerConfig::new(self.url())
    }

    /// Underlying wiremock server, for custom matchers.
    pub fn server(&self) -> &MockServer {
        &self.server
    }

    /// Answer every POST with `body` and expect exactly `expected_calls`.
    pub async fn respond_with_json(&self, body: Value, expected_calls: u64) {
        Mock::given(method("POST"))
            .and(path(INTROSPECT_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .expect(expected_calls)
            .mount(&self.server)
            .await;
    }

    /// Answer every POST with a raw `status` and `body`.
    pub async fn respond_with_status(&self, status: u16, body: &str, expected_calls: u64) {
        Mock::given(method("POST"))
            .and(path(INTROSPECT_PATH))
            .respond_with(ResponseTemplate::new(status).set_body_string(body))
            .expect(expected_calls)
            .mount(&self.server)
            .await;
    }

    /// Answer with `body` only after `delay`.
    pub async fn respond_after(&self, delay: Duration, body: Value) {
        Mock::given(method("POST"))
            .and(path(INTROSPECT_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(body).set_delay(delay))
            .mount(&self.server)
            .await;
    }

    /// Requests received so far.
    pub async fn received_requests(&self) -> Vec<Request> {
        self.server.received_requests().await.unwrap_or_default()
    }

    /// Number of requests received so far.
    pub async fn request_count(&self) -> usize {
        self.received_requests().await.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_url_ends_with_introspect_path() {
        let server = TestIntrospectionServer::start().await;

        assert!(server.url().starts_with("http://"));
        assert!(server.url().ends_with(INTROSPECT_PATH));
        assert_eq!(server.config().url, server.url());
    }

    #[tokio::test]
    async fn test_request_count_starts_at_zero() {
        let server = TestIntrospectionServer::start().await;
        server.respond_with_json(json!({"active": false}), 0).await;

        assert_eq!(server.request_count().await, 0);
    }
}
