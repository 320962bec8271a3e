//! Token validation orchestration.
//!
//! Composes the validation cache and the introspection client:
//!
//! ```text
//! validate(token)
//!   ├─ empty token        -> MissingCredential (no network call)
//!   ├─ cache hit          -> cached result     (no network call)
//!   └─ introspect         -> result, cached if active
//! ```
//!
//! Concurrent misses for the same token each introspect and each store;
//! the last write wins.

use crate::cache::CacheLookup;
use crate::client::IntrospectionClient;
use crate::config::IntrospectionServerConfig;
use crate::errors::{ConfigError, IntrospectionError};
use crate::models::IntrospectionResult;
use tracing::{debug, instrument};

/// Outcome of validating a credential.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationOutcome {
    /// Empty credential; nothing was validated.
    MissingCredential,

    /// Introspection result, fresh or cached. May be inactive.
    Introspected(IntrospectionResult),
}

impl ValidationOutcome {
    /// Whether the credential is a currently active token.
    #[must_use]
    pub fn is_active(&self) -> bool {
        matches!(self, ValidationOutcome::Introspected(result) if result.is_active())
    }

    #[must_use]
    pub fn result(&self) -> Option<&IntrospectionResult> {
        match self {
            ValidationOutcome::MissingCredential => None,
            ValidationOutcome::Introspected(result) => Some(result),
        }
    }
}

/// Validates bearer tokens against one introspection server.
pub struct TokenValidator {
    config: IntrospectionServerConfig,
    client: IntrospectionClient,
}

impl TokenValidator {
    #[must_use]
    pub fn new(config: IntrospectionServerConfig, client: IntrospectionClient) -> Self {
        Self { config, client }
    }

    /// Validate `config` and build a validator over a reqwest transport.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the configuration is invalid or the HTTP
    /// client cannot be built.
    pub fn from_config(config: IntrospectionServerConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let client = IntrospectionClient::from_config(&config)?;
        Ok(Self::new(config, client))
    }

    #[must_use]
    pub fn config(&self) -> &IntrospectionServerConfig {
        &self.config
    }

    /// Validate `token`, consulting the cache before the network.
    ///
    /// # Errors
    ///
    /// Propagates `IntrospectionError` from the introspection call unchanged.
    /// An inactive token is not an error.
    #[instrument(skip_all)]
    pub async fn validate(&self, token: &str) -> Result<ValidationOutcome, IntrospectionError> {
        if token.is_empty() {
            debug!(target: "introspection.validator", "Empty credential, skipping validation");
            return Ok(ValidationOutcome::MissingCredential);
        }

        if let Some(cache) = &self.config.cache {
            if let CacheLookup::Hit(result) = cache.lookup(token).await {
                return Ok(ValidationOutcome::Introspected(result));
            }
        }

        let result = self.client.introspect(token, &self.config).await?;

        if result.is_active() {
            if let Some(cache) = &self.config.cache {
                cache.store(token, &result).await;
            }
        }

        debug!(
            target: "introspection.validator",
            active = result.is_active(),
            "Token validated"
        );
        Ok(ValidationOutcome::Introspected(result))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::cache::mock::FailingKvCache;
    use crate::cache::{InMemoryKvCache, KvCache, ValidationCache};
    use crate::clock::mock::ManualClock;
    use crate::errors::TransportError;
    use crate::transport::mock::MockTransport;
    use std::sync::Arc;

    const NOW: i64 = 1_700_000_000;
    const URL: &str = "http://auth.test/oauth2/introspect";

    struct Harness {
        validator: TokenValidator,
        transport: Arc<MockTransport>,
        store: Arc<InMemoryKvCache>,
        clock: Arc<ManualClock>,
    }

    fn harness(transport: MockTransport) -> Harness {
        let transport = Arc::new(transport);
        let store = Arc::new(InMemoryKvCache::new());
        let clock = Arc::new(ManualClock::new(NOW));
        let config = IntrospectionServerConfig::new(URL.to_string())
            .with_cache(ValidationCache::with_clock(store.clone(), clock.clone()));
        let client = IntrospectionClient::with_clock(transport.clone(), clock.clone());

        Harness {
            validator: TokenValidator::new(config, client),
            transport,
            store,
            clock,
        }
    }

    #[tokio::test]
    async fn test_empty_token_makes_no_call() {
        let h = harness(MockTransport::ok(r#"{"active": true}"#));

        let outcome = h.validator.validate("").await.unwrap();

        assert_eq!(outcome, ValidationOutcome::MissingCredential);
        assert!(!outcome.is_active());
        assert!(outcome.result().is_none());
        assert_eq!(h.transport.call_count(), 0);
    }

    #[tokio::test]
    async fn test_miss_introspects_once_and_caches() {
        let h = harness(MockTransport::ok(
            r#"{"active": true, "username": "alice", "scope": "read write", "exp": 9999999999}"#,
        ));

        let outcome = h.validator.validate("token-1").await.unwrap();

        let expected = IntrospectionResult::active(
            Some("alice".to_string()),
            Some("read write".to_string()),
            9_999_999_999,
        );
        assert_eq!(outcome, ValidationOutcome::Introspected(expected.clone()));
        assert_eq!(h.transport.call_count(), 1);
        assert_eq!(
            h.store.get(&ValidationCache::cache_key("token-1")).await,
            Some(expected)
        );
    }

    #[tokio::test]
    async fn test_fresh_cache_entry_skips_network() {
        let h = harness(MockTransport::ok(r#"{"active": true, "exp": 1700000100}"#));

        h.validator.validate("token-1").await.unwrap();
        let outcome = h.validator.validate("token-1").await.unwrap();

        assert!(outcome.is_active());
        assert_eq!(h.transport.call_count(), 1);
    }

    #[tokio::test]
    async fn test_expired_cache_entry_reintrospects() {
        let h = harness(MockTransport::ok(r#"{"active": true, "exp": 1700000100}"#));

        h.validator.validate("token-1").await.unwrap();
        h.clock.advance(101);
        let outcome = h.validator.validate("token-1").await.unwrap();

        // The server still answers with the old exp; the result is returned
        // as-is and re-cached.
        assert!(outcome.is_active());
        assert_eq!(h.transport.call_count(), 2);
    }

    #[tokio::test]
    async fn test_concurrent_misses_each_introspect_and_last_write_wins() {
        let h = harness(
            MockTransport::ok(r#"{"active": true, "exp": 1700000100}"#)
                .with_delay(std::time::Duration::from_millis(10)),
        );

        let (first, second) = tokio::join!(
            h.validator.validate("token-1"),
            h.validator.validate("token-1")
        );

        assert!(first.unwrap().is_active());
        assert!(second.unwrap().is_active());
        assert_eq!(h.transport.call_count(), 2);
        assert_eq!(h.store.len().await, 1);
    }

    #[tokio::test]
    async fn test_inactive_result_returned_and_not_cached() {
        let h = harness(MockTransport::ok(r#"{"active": false}"#));

        let outcome = h.validator.validate("token-1").await.unwrap();

        assert_eq!(
            outcome,
            ValidationOutcome::Introspected(IntrospectionResult::inactive())
        );
        assert!(h.store.is_empty().await);

        h.validator.validate("token-1").await.unwrap();
        assert_eq!(h.transport.call_count(), 2);
    }

    #[tokio::test]
    async fn test_default_expiry_stored_when_exp_missing() {
        let h = harness(MockTransport::ok(r#"{"active": true}"#));

        h.validator.validate("token-1").await.unwrap();

        let stored = h
            .store
            .get(&ValidationCache::cache_key("token-1"))
            .await
            .unwrap();
        assert_eq!(stored.expires_at(), Some(NOW + 3600));
    }

    #[tokio::test]
    async fn test_errors_propagate_unchanged() {
        let h = harness(MockTransport::failing(TransportError::Request(
            "timed out".to_string(),
        )));

        let err = h.validator.validate("token-1").await.unwrap_err();

        assert!(matches!(
            err,
            IntrospectionError::Call(TransportError::Request(_))
        ));
        assert!(h.store.is_empty().await);
    }

    #[tokio::test]
    async fn test_malformed_response_is_parse_error() {
        let h = harness(MockTransport::ok("{not json"));

        let err = h.validator.validate("token-1").await.unwrap_err();

        assert!(matches!(err, IntrospectionError::ResponseParse(_)));
    }

    #[tokio::test]
    async fn test_without_cache_always_introspects() {
        let transport = Arc::new(MockTransport::ok(r#"{"active": true}"#));
        let validator = TokenValidator::new(
            IntrospectionServerConfig::new(URL.to_string()),
            IntrospectionClient::new(transport.clone()),
        );

        validator.validate("token-1").await.unwrap();
        validator.validate("token-1").await.unwrap();

        assert_eq!(transport.call_count(), 2);
    }

    #[tokio::test]
    async fn test_cache_write_failure_still_returns_result() {
        let transport = Arc::new(MockTransport::ok(r#"{"active": true}"#));
        let store = Arc::new(FailingKvCache::new());
        let validator = TokenValidator::new(
            IntrospectionServerConfig::new(URL.to_string())
                .with_cache(ValidationCache::new(store.clone())),
            IntrospectionClient::new(transport.clone()),
        );

        let outcome = validator.validate("token-1").await.unwrap();

        assert!(outcome.is_active());
        assert_eq!(store.put_attempts(), 1);
    }

    #[test]
    fn test_from_config_rejects_invalid_config() {
        let result = TokenValidator::from_config(IntrospectionServerConfig::new(
            "not a url".to_string(),
        ));
        assert!(matches!(result, Err(ConfigError::InvalidUrl(_))));
    }

    #[test]
    fn test_from_config_builds_validator() {
        let validator =
            TokenValidator::from_config(IntrospectionServerConfig::new(URL.to_string())).unwrap();
        assert_eq!(validator.config().url, URL);
    }
}
