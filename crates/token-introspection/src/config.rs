//! Introspection configuration.
//!
//! Built in code with `new` plus `with_*` builders. Client secrets are held
//! as `SecretString` and redacted in Debug output.

use crate::cache::ValidationCache;
use crate::errors::ConfigError;
use secrecy::SecretString;
use std::fmt;
use std::time::Duration;

/// Expiry applied when the server omits `exp` (1 hour).
pub const DEFAULT_TOKEN_EXPIRY_SECONDS: i64 = 3600;

/// Default HTTP request timeout.
pub const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(10);

/// Default connection timeout for the HTTP client.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Credentials the protected resource uses to authenticate to the
/// introspection endpoint (RFC 7662 Section 2.1).
#[derive(Clone)]
pub struct ClientCredentials {
    pub client_id: String,
    pub client_secret: SecretString,
}

impl ClientCredentials {
    #[must_use]
    pub fn new(client_id: String, client_secret: SecretString) -> Self {
        Self {
            client_id,
            client_secret,
        }
    }
}

impl fmt::Debug for ClientCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientCredentials")
            .field("client_id", &self.client_id)
            .field("client_secret", &"[REDACTED]")
            .finish()
    }
}

/// Transport configuration for the introspection call.
#[derive(Debug, Clone)]
pub struct HttpClientConfig {
    /// Whole-request timeout.
    pub timeout: Duration,

    pub connect_timeout: Duration,

    /// Sent as HTTP Basic authorization when set.
    pub client_credentials: Option<ClientCredentials>,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_HTTP_TIMEOUT,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            client_credentials: None,
        }
    }
}

impl HttpClientConfig {
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    #[must_use]
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    #[must_use]
    pub fn with_client_credentials(mut self, credentials: ClientCredentials) -> Self {
        self.client_credentials = Some(credentials);
        self
    }
}

/// Configuration for one introspection server.
///
/// Immutable once handed to a [`crate::validator::TokenValidator`].
#[derive(Debug, Clone)]
pub struct IntrospectionServerConfig {
    /// Introspection endpoint URL.
    pub url: String,

    /// Sent as `token_type_hint` when set.
    pub token_type_hint: Option<String>,

    /// Validation cache. `None` disables caching entirely.
    pub cache: Option<ValidationCache>,

    /// Expiry applied to active tokens when the server omits `exp`.
    pub default_token_expiry_seconds: i64,

    pub client_config: HttpClientConfig,
}

impl IntrospectionServerConfig {
    /// Create a configuration with defaults and no cache.
    ///
    /// # Security Warning
    ///
    /// Plain HTTP sends bearer tokens in clear text. Use
    /// [`IntrospectionServerConfig::new_secure`] to enforce HTTPS.
    #[must_use]
    pub fn new(url: String) -> Self {
        Self {
            url,
            token_type_hint: None,
            cache: None,
            default_token_expiry_seconds: DEFAULT_TOKEN_EXPIRY_SECONDS,
            client_config: HttpClientConfig::default(),
        }
    }

    /// Create a configuration requiring an HTTPS endpoint.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InsecureUrl` if the URL doesn't use HTTPS.
    pub fn new_secure(url: String) -> Result<Self, ConfigError> {
        if !url.starts_with("https://") {
            return Err(ConfigError::InsecureUrl);
        }
        Ok(Self::new(url))
    }

    #[must_use]
    pub fn with_token_type_hint(mut self, hint: impl Into<String>) -> Self {
        self.token_type_hint = Some(hint.into());
        self
    }

    #[must_use]
    pub fn with_cache(mut self, cache: ValidationCache) -> Self {
        self.cache = Some(cache);
        self
    }

    #[must_use]
    pub fn with_default_token_expiry_seconds(mut self, seconds: i64) -> Self {
        self.default_token_expiry_seconds = seconds;
        self
    }

    #[must_use]
    pub fn with_client_config(mut self, client_config: HttpClientConfig) -> Self {
        self.client_config = client_config;
        self
    }

    /// Check the configuration before use.
    ///
    /// # Errors
    ///
    /// - `ConfigError::InvalidUrl` if the URL does not parse or is not http(s)
    /// - `ConfigError::InvalidDefaultExpiry` if the default expiry is not positive
    pub fn validate(&self) -> Result<(), ConfigError> {
        let parsed =
            url::Url::parse(&self.url).map_err(|e| ConfigError::InvalidUrl(e.to_string()))?;

        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ConfigError::InvalidUrl(format!(
                "unsupported scheme '{}'",
                parsed.scheme()
            )));
        }

        if self.default_token_expiry_seconds <= 0 {
            return Err(ConfigError::InvalidDefaultExpiry(
                self.default_token_expiry_seconds,
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = IntrospectionServerConfig::new("http://localhost:8080/introspect".to_string());

        assert!(config.token_type_hint.is_none());
        assert!(config.cache.is_none());
        assert_eq!(config.default_token_expiry_seconds, 3600);
        assert_eq!(config.client_config.timeout, DEFAULT_HTTP_TIMEOUT);
        assert_eq!(config.client_config.connect_timeout, DEFAULT_CONNECT_TIMEOUT);
        assert!(config.client_config.client_credentials.is_none());
    }

    #[test]
    fn test_config_builder() {
        let config = IntrospectionServerConfig::new("http://localhost:8080/introspect".to_string())
            .with_token_type_hint("access_token")
            .with_cache(ValidationCache::in_memory())
            .with_default_token_expiry_seconds(60)
            .with_client_config(
                HttpClientConfig::default()
                    .with_timeout(Duration::from_secs(2))
                    .with_connect_timeout(Duration::from_secs(1)),
            );

        assert_eq!(config.token_type_hint.as_deref(), Some("access_token"));
        assert!(config.cache.is_some());
        assert_eq!(config.default_token_expiry_seconds, 60);
        assert_eq!(config.client_config.timeout, Duration::from_secs(2));
        assert_eq!(config.client_config.connect_timeout, Duration::from_secs(1));
    }

    #[test]
    fn test_new_secure_requires_https() {
        assert!(
            IntrospectionServerConfig::new_secure("https://auth.example.com/introspect".into())
                .is_ok()
        );

        let result =
            IntrospectionServerConfig::new_secure("http://auth.example.com/introspect".into());
        assert!(matches!(result.unwrap_err(), ConfigError::InsecureUrl));
    }

    #[test]
    fn test_validate_accepts_http_and_https() {
        assert!(IntrospectionServerConfig::new("http://localhost/introspect".into())
            .validate()
            .is_ok());
        assert!(IntrospectionServerConfig::new("https://auth.example.com/introspect".into())
            .validate()
            .is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_urls() {
        let result = IntrospectionServerConfig::new("not a url".into()).validate();
        assert!(matches!(result.unwrap_err(), ConfigError::InvalidUrl(_)));

        let result = IntrospectionServerConfig::new("ftp://auth.example.com/x".into()).validate();
        assert!(matches!(result.unwrap_err(), ConfigError::InvalidUrl(_)));
    }

    #[test]
    fn test_validate_rejects_non_positive_expiry() {
        let result = IntrospectionServerConfig::new("http://localhost/introspect".into())
            .with_default_token_expiry_seconds(0)
            .validate();

        assert!(matches!(
            result.unwrap_err(),
            ConfigError::InvalidDefaultExpiry(0)
        ));
    }

    #[test]
    fn test_client_credentials_debug_redacts_secret() {
        let config = HttpClientConfig::default().with_client_credentials(ClientCredentials::new(
            "resource-server".to_string(),
            SecretString::from("super-secret-value"),
        ));

        let debug_str = format!("{config:?}");
        assert!(debug_str.contains("resource-server"));
        assert!(debug_str.contains("[REDACTED]"));
        assert!(!debug_str.contains("super-secret-value"));
    }
}
