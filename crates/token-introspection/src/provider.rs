//! Authentication boundary adapter.
//!
//! Wraps a [`TokenValidator`] behind the narrow [`AuthProvider`] contract a
//! host framework calls, and hands the authenticated [`Principal`] to the
//! host through an injected [`PrincipalSink`].
//!
//! # Outcomes
//!
//! - `Ok(true)` - token active, principal set
//! - `Ok(false)` - no credential, or token not active
//! - `Err(AuthError)` - validity could not be determined

use crate::errors::AuthError;
use crate::models::Principal;
use crate::observability::metrics;
use crate::validator::{TokenValidator, ValidationOutcome};
use std::sync::Arc;
use tracing::{debug, instrument, warn};

/// Host capability receiving the authenticated identity.
///
/// Invoked only after a successful validation.
pub trait PrincipalSink: Send + Sync {
    fn set_principal(&self, principal: Principal);
}

/// Inbound bearer-credential authentication contract.
#[async_trait::async_trait]
pub trait AuthProvider: Send + Sync {
    /// Authenticate `credential`.
    ///
    /// # Errors
    ///
    /// Returns `AuthError` when validity could not be determined. A rejected
    /// credential is `Ok(false)`.
    async fn authenticate(&self, credential: &str) -> Result<bool, AuthError>;
}

/// [`AuthProvider`] backed by token introspection.
pub struct IntrospectionAuthProvider {
    validator: Arc<TokenValidator>,
    principal_sink: Arc<dyn PrincipalSink>,
}

impl IntrospectionAuthProvider {
    #[must_use]
    pub fn new(validator: Arc<TokenValidator>, principal_sink: Arc<dyn PrincipalSink>) -> Self {
        Self {
            validator,
            principal_sink,
        }
    }

    /// Authenticate from a raw `Authorization` header value.
    ///
    /// A missing header or a non-Bearer scheme is `Ok(false)`.
    ///
    /// # Errors
    ///
    /// Same as [`AuthProvider::authenticate`].
    pub async fn authenticate_header(&self, authorization: Option<&str>) -> Result<bool, AuthError> {
        let Some(header) = authorization else {
            debug!(target: "introspection.provider", "Missing Authorization header");
            return Ok(false);
        };

        let Some(token) = extract_bearer_token(header) else {
            debug!(target: "introspection.provider", "Invalid Authorization header format");
            return Ok(false);
        };

        self.authenticate(token).await
    }
}

#[async_trait::async_trait]
impl AuthProvider for IntrospectionAuthProvider {
    #[instrument(skip_all, name = "introspection.provider.authenticate")]
    async fn authenticate(&self, credential: &str) -> Result<bool, AuthError> {
        if credential.is_empty() {
            metrics::record_authentication("missing_credential");
            return Ok(false);
        }

        let outcome = match self.validator.validate(credential).await {
            Ok(outcome) => outcome,
            Err(e) => {
                warn!(target: "introspection.provider", error = %e, "Token validation failed");
                metrics::record_authentication("error");
                return Err(AuthError::Validation(e));
            }
        };

        match outcome {
            ValidationOutcome::Introspected(result) if result.is_active() => {
                let principal = Principal::from_result(&result);
                debug!(
                    target: "introspection.provider",
                    scope_count = principal.scopes.len(),
                    "Credential authenticated"
                );
                self.principal_sink.set_principal(principal);
                metrics::record_authentication("authenticated");
                Ok(true)
            }
            ValidationOutcome::Introspected(_) => {
                debug!(target: "introspection.provider", "Credential not active");
                metrics::record_authentication("rejected");
                Ok(false)
            }
            ValidationOutcome::MissingCredential => {
                metrics::record_authentication("missing_credential");
                Ok(false)
            }
        }
    }
}

/// Extract the token from a `Bearer <token>` header value.
///
/// The scheme is matched case-insensitively and surrounding whitespace is
/// ignored. Returns `None` for other schemes or an empty token.
#[must_use]
pub fn extract_bearer_token(header: &str) -> Option<&str> {
    let (scheme, token) = header.trim().split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = token.trim();
    (!token.is_empty()).then_some(token)
}

/// Mock principal sink for testing.
pub mod mock {
    use super::PrincipalSink;
    use crate::models::Principal;
    use std::sync::{Mutex, PoisonError};

    /// Sink that records every principal it receives.
    #[derive(Debug, Default)]
    pub struct RecordingPrincipalSink {
        principals: Mutex<Vec<Principal>>,
    }

    impl RecordingPrincipalSink {
        #[must_use]
        pub fn new() -> Self {
            Self::default()
        }

        pub fn principals(&self) -> Vec<Principal> {
            self.principals
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .clone()
        }

        pub fn last(&self) -> Option<Principal> {
            self.principals().pop()
        }
    }

    impl PrincipalSink for RecordingPrincipalSink {
        fn set_principal(&self, principal: Principal) {
            self.principals
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .push(principal);
        }
    }
}
