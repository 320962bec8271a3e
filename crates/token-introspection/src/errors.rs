//! Error types for token introspection.
//!
//! The taxonomy separates "could not determine" from "determined invalid":
//! an inactive token is an `Ok` value everywhere, while transport failures and
//! malformed responses surface as errors. Messages never include token values.

use thiserror::Error;

/// Failure reaching the introspection endpoint.
///
/// Produced by [`crate::transport::HttpPost`] implementations, and by the
/// client when the endpoint answers with a non-2xx status.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TransportError {
    /// Request could not be sent or timed out.
    #[error("Request failed: {0}")]
    Request(String),

    /// Endpoint answered with a non-success status.
    #[error("Unexpected status: {0}")]
    Status(u16),

    /// Response body could not be read.
    #[error("Failed to read response body: {0}")]
    Body(String),
}

/// Errors produced while introspecting a token.
#[derive(Debug, Error)]
pub enum IntrospectionError {
    /// Transport-level failure calling the endpoint. Not retried internally.
    #[error("Introspection call failed: {0}")]
    Call(#[from] TransportError),

    /// Body is not JSON, or the required `active` field is missing or mistyped.
    #[error("Invalid introspection response: {0}")]
    ResponseParse(String),
}

impl IntrospectionError {
    /// Bounded label for metrics.
    #[must_use]
    pub fn error_type(&self) -> &'static str {
        match self {
            IntrospectionError::Call(TransportError::Status(_)) => "status",
            IntrospectionError::Call(_) => "transport",
            IntrospectionError::ResponseParse(_) => "parse",
        }
    }
}

/// Errors from a [`crate::cache::KvCache`] store.
///
/// The validation cache recovers from these locally; they never fail a
/// validation.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CacheError {
    #[error("Cache write failed: {0}")]
    Write(String),

    #[error("Cache unavailable: {0}")]
    Unavailable(String),
}

/// Authentication could not be determined.
///
/// Distinct from a `false` verdict: the credential was neither accepted nor
/// rejected because the validation machinery failed.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Token validation failed: {0}")]
    Validation(#[from] IntrospectionError),
}

/// Invalid introspection configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid introspection URL: {0}")]
    InvalidUrl(String),

    #[error("Introspection URL must use HTTPS")]
    InsecureUrl,

    #[error("Default token expiry must be positive, got {0}")]
    InvalidDefaultExpiry(i64),

    #[error("Failed to build HTTP client: {0}")]
    HttpClient(String),
}
