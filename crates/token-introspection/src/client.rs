//! RFC 7662 introspection client.
//!
//! Sends one form-encoded POST per call and turns the JSON answer into an
//! [`IntrospectionResult`]. Only `active` is required; optional fields that
//! are missing or mistyped are dropped rather than failing the call.
//!
//! # Security
//!
//! - Token values are never logged or included in error messages
//! - Client secrets are only exposed when building the Basic header
//! - No retries: transport-level retry is the transport's concern

use crate::clock::{Clock, SystemClock};
use crate::config::{ClientCredentials, HttpClientConfig, IntrospectionServerConfig};
use crate::errors::{ConfigError, IntrospectionError, TransportError};
use crate::models::IntrospectionResult;
use crate::observability::metrics;
use crate::transport::{HttpPost, ReqwestTransport, FORM_CONTENT_TYPE};
use base64::{engine::general_purpose::STANDARD, Engine};
use secrecy::ExposeSecret;
use serde_json::{Map, Value};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, instrument, warn};
use url::form_urlencoded;

/// Client for an RFC 7662 token introspection endpoint.
#[derive(Clone)]
pub struct IntrospectionClient {
    transport: Arc<dyn HttpPost>,
    clock: Arc<dyn Clock>,
}

impl IntrospectionClient {
    /// Create a client over `transport` using the system clock.
    #[must_use]
    pub fn new(transport: Arc<dyn HttpPost>) -> Self {
        Self::with_clock(transport, Arc::new(SystemClock))
    }

    /// Create a client with an explicit clock for expiry defaults.
    #[must_use]
    pub fn with_clock(transport: Arc<dyn HttpPost>, clock: Arc<dyn Clock>) -> Self {
        Self { transport, clock }
    }

    /// Create a client over a [`ReqwestTransport`] using the timeouts of
    /// `config.client_config`.
    ///
    /// Client credentials are read per call from the config passed to
    /// [`IntrospectionClient::introspect`]; pass the same config there.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::HttpClient` if the HTTP client cannot be built.
    pub fn from_config(config: &IntrospectionServerConfig) -> Result<Self, ConfigError> {
        Ok(Self::new(Arc::new(ReqwestTransport::new(
            &config.client_config,
        )?)))
    }

    /// Introspect `token` against the configured endpoint.
    ///
    /// An inactive token is `Ok` with `active == false`.
    ///
    /// # Errors
    ///
    /// - `IntrospectionError::Call` on transport failure or a non-2xx status
    /// - `IntrospectionError::ResponseParse` if the body is not a JSON object
    ///   with a boolean `active` field
    #[instrument(skip_all, fields(url = %config.url))]
    pub async fn introspect(
        &self,
        token: &str,
        config: &IntrospectionServerConfig,
    ) -> Result<IntrospectionResult, IntrospectionError> {
        let start = Instant::now();
        let result = self.call_endpoint(token, config).await;

        let status = match &result {
            Ok(r) if r.is_active() => "active",
            Ok(_) => "inactive",
            Err(_) => "error",
        };
        metrics::record_introspection_call(status, start.elapsed());
        if let Err(e) = &result {
            metrics::record_introspection_failure(e.error_type());
        }

        result
    }

    async fn call_endpoint(
        &self,
        token: &str,
        config: &IntrospectionServerConfig,
    ) -> Result<IntrospectionResult, IntrospectionError> {
        let body = build_request_body(token, config.token_type_hint.as_deref());
        let headers = request_headers(&config.client_config);

        debug!(
            target: "introspection.client",
            has_hint = config.token_type_hint.is_some(),
            "Sending introspection request"
        );

        let response = self
            .transport
            .post(&config.url, body, &headers)
            .await
            .map_err(|e| {
                warn!(target: "introspection.client", error = %e, "Introspection request failed");
                IntrospectionError::Call(e)
            })?;

        if !response.is_success() {
            warn!(
                target: "introspection.client",
                status = response.status,
                "Introspection endpoint returned error"
            );
            return Err(IntrospectionError::Call(TransportError::Status(
                response.status,
            )));
        }

        let result = parse_response(
            &response.body,
            self.clock.now_epoch_seconds(),
            config.default_token_expiry_seconds,
        )
        .inspect_err(|e| {
            warn!(target: "introspection.client", error = %e, "Failed to parse introspection response");
        })?;

        debug!(
            target: "introspection.client",
            active = result.is_active(),
            expires_at = ?result.expires_at(),
            "Introspection completed"
        );

        Ok(result)
    }
}

/// Form-encoded request body: `token=..[&token_type_hint=..]`.
#[must_use]
pub fn build_request_body(token: &str, token_type_hint: Option<&str>) -> String {
    let mut serializer = form_urlencoded::Serializer::new(String::new());
    serializer.append_pair("token", token);
    if let Some(hint) = token_type_hint {
        serializer.append_pair("token_type_hint", hint);
    }
    serializer.finish()
}

fn request_headers(config: &HttpClientConfig) -> Vec<(String, String)> {
    let mut headers = vec![
        ("Content-Type".to_string(), FORM_CONTENT_TYPE.to_string()),
        ("Accept".to_string(), "application/json".to_string()),
    ];
    if let Some(credentials) = &config.client_credentials {
        headers.push((
            "Authorization".to_string(),
            basic_authorization(credentials),
        ));
    }
    headers
}

/// HTTP Basic header value per RFC 6749 Section 2.3.1.
///
/// Client id and secret are form-urlencoded before being joined and
/// base64-encoded.
#[must_use]
pub fn basic_authorization(credentials: &ClientCredentials) -> String {
    let id: String = form_urlencoded::byte_serialize(credentials.client_id.as_bytes()).collect();
    let secret: String =
        form_urlencoded::byte_serialize(credentials.client_secret.expose_secret().as_bytes())
            .collect();
    format!("Basic {}", STANDARD.encode(format!("{id}:{secret}")))
}

/// Parse an introspection response body.
///
/// `now` and `default_expiry_seconds` supply the expiry when the server
/// omits an integer `exp`.
///
/// # Errors
///
/// Returns `IntrospectionError::ResponseParse` if the body is not a JSON
/// object or `active` is missing or not a boolean.
pub fn parse_response(
    body: &str,
    now: i64,
    default_expiry_seconds: i64,
) -> Result<IntrospectionResult, IntrospectionError> {
    let value: Value = serde_json::from_str(body).map_err(|e| {
        IntrospectionError::ResponseParse(format!("body is not valid JSON: {e}"))
    })?;

    let Value::Object(fields) = value else {
        return Err(IntrospectionError::ResponseParse(
            "body is not a JSON object".to_string(),
        ));
    };

    let active = match fields.get("active") {
        Some(Value::Bool(active)) => *active,
        Some(_) => {
            return Err(IntrospectionError::ResponseParse(
                "field 'active' is not a boolean".to_string(),
            ))
        }
        None => {
            return Err(IntrospectionError::ResponseParse(
                "missing required field 'active'".to_string(),
            ))
        }
    };

    if !active {
        return Ok(IntrospectionResult::inactive());
    }

    let expires_at = fields
        .get("exp")
        .and_then(Value::as_i64)
        .unwrap_or_else(|| now.saturating_add(default_expiry_seconds));

    Ok(IntrospectionResult::active(
        optional_string(&fields, "username"),
        optional_string(&fields, "scope"),
        expires_at,
    ))
}

fn optional_string(fields: &Map<String, Value>, name: &str) -> Option<String> {
    fields.get(name).and_then(Value::as_str).map(String::from)
}
