//! Introspection value types.
//!
//! Identity fields (`username`, `subject`) are redacted in Debug output to
//! keep them out of logs.

use crate::scope::parse_scopes;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Outcome of introspecting one token.
///
/// Identity and expiry fields only exist on active results: the only
/// constructors are [`IntrospectionResult::inactive`] and
/// [`IntrospectionResult::active`]. Deserialization (for external
/// [`KvCache`](crate::cache::KvCache) stores) drops them from inactive
/// results.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "StoredIntrospectionResult")]
pub struct IntrospectionResult {
    active: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    username: Option<String>,

    /// Raw space-separated scope string.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    scope: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    expires_at: Option<i64>,
}

/// Wire shape of a stored result, before the inactive invariant is applied.
#[derive(Deserialize)]
struct StoredIntrospectionResult {
    active: bool,
    #[serde(default)]
    username: Option<String>,
    #[serde(default)]
    scope: Option<String>,
    #[serde(default)]
    expires_at: Option<i64>,
}

impl From<StoredIntrospectionResult> for IntrospectionResult {
    fn from(stored: StoredIntrospectionResult) -> Self {
        if !stored.active {
            return Self::inactive();
        }
        Self {
            active: true,
            username: stored.username,
            scope: stored.scope,
            expires_at: stored.expires_at,
        }
    }
}

impl IntrospectionResult {
    /// Result for a token the server reported as not active.
    #[must_use]
    pub fn inactive() -> Self {
        Self {
            active: false,
            username: None,
            scope: None,
            expires_at: None,
        }
    }

    /// Result for an active token expiring at `expires_at` (epoch seconds).
    #[must_use]
    pub fn active(username: Option<String>, scope: Option<String>, expires_at: i64) -> Self {
        Self {
            active: true,
            username,
            scope,
            expires_at: Some(expires_at),
        }
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        self.active
    }

    #[must_use]
    pub fn username(&self) -> Option<&str> {
        self.username.as_deref()
    }

    #[must_use]
    pub fn scope(&self) -> Option<&str> {
        self.scope.as_deref()
    }

    /// Expiry in Unix epoch seconds. `None` on inactive results.
    #[must_use]
    pub fn expires_at(&self) -> Option<i64> {
        self.expires_at
    }

    /// Whether the result has expired at `now` (epoch seconds).
    ///
    /// The expiry second itself is still valid. A result without an expiry
    /// never expires.
    #[must_use]
    pub fn is_expired_at(&self, now: i64) -> bool {
        self.expires_at.is_some_and(|exp| now > exp)
    }

    /// Scopes granted to the token, in server order.
    #[must_use]
    pub fn scopes(&self) -> Vec<String> {
        parse_scopes(self.scope.as_deref())
    }
}

impl fmt::Debug for IntrospectionResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IntrospectionResult")
            .field("active", &self.active)
            .field("username", &self.username.as_ref().map(|_| "[REDACTED]"))
            .field("scope", &self.scope)
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

/// Authenticated identity handed to the host after successful validation.
#[derive(Clone, PartialEq, Eq)]
pub struct Principal {
    /// Username reported by the introspection endpoint, if any.
    pub subject: Option<String>,

    pub scopes: Vec<String>,
}

impl Principal {
    /// Build the principal for an introspection result.
    #[must_use]
    pub fn from_result(result: &IntrospectionResult) -> Self {
        Self {
            subject: result.username.clone(),
            scopes: result.scopes(),
        }
    }

    #[must_use]
    pub fn has_scope(&self, scope: &str) -> bool {
        self.scopes.iter().any(|s| s == scope)
    }
}

impl fmt::Debug for Principal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Principal")
            .field("subject", &self.subject.as_ref().map(|_| "[REDACTED]"))
            .field("scopes", &self.scopes)
            .finish()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_inactive_has_no_fields() {
        let result = IntrospectionResult::inactive();

        assert!(!result.is_active());
        assert!(result.username().is_none());
        assert!(result.scope().is_none());
        assert!(result.expires_at().is_none());
        assert!(result.scopes().is_empty());
    }

    #[test]
    fn test_active_accessors() {
        let result = IntrospectionResult::active(
            Some("alice".to_string()),
            Some("read write".to_string()),
            9_999_999_999,
        );

        assert!(result.is_active());
        assert_eq!(result.username(), Some("alice"));
        assert_eq!(result.scope(), Some("read write"));
        assert_eq!(result.expires_at(), Some(9_999_999_999));
        assert_eq!(result.scopes(), vec!["read", "write"]);
    }

    #[test]
    fn test_expiry_boundary_is_inclusive() {
        let result = IntrospectionResult::active(None, None, 100);

        assert!(!result.is_expired_at(99));
        assert!(!result.is_expired_at(100));
        assert!(result.is_expired_at(101));
    }

    #[test]
    fn test_result_without_expiry_never_expires() {
        let result: IntrospectionResult = serde_json::from_str(r#"{"active": true}"#).unwrap();
        assert!(!result.is_expired_at(i64::MAX));
    }

    #[test]
    fn test_deserialized_inactive_result_drops_identity() {
        let result: IntrospectionResult = serde_json::from_str(
            r#"{"active": false, "username": "mallory", "scope": "admin", "expires_at": 9999999999}"#,
        )
        .unwrap();

        assert_eq!(result, IntrospectionResult::inactive());
        assert!(result.username().is_none());
        assert!(result.scopes().is_empty());
        assert!(result.expires_at().is_none());
    }

    #[test]
    fn test_deserialized_active_result_keeps_fields() {
        let expected = IntrospectionResult::active(
            Some("alice".to_string()),
            Some("read".to_string()),
            1_700_000_000,
        );
        let json = serde_json::to_string(&expected).unwrap();

        let result: IntrospectionResult = serde_json::from_str(&json).unwrap();

        assert_eq!(result, expected);
    }

    #[test]
    fn test_result_debug_redacts_username() {
        let result =
            IntrospectionResult::active(Some("secret-user".to_string()), None, 1_700_000_000);
        let debug_str = format!("{result:?}");

        assert!(!debug_str.contains("secret-user"));
        assert!(debug_str.contains("[REDACTED]"));
        assert!(debug_str.contains("1700000000"));
    }

    #[test]
    fn test_inactive_serializes_without_optional_fields() {
        let json = serde_json::to_value(IntrospectionResult::inactive()).unwrap();
        assert_eq!(json, serde_json::json!({"active": false}));
    }

    #[test]
    fn test_principal_from_result() {
        let result = IntrospectionResult::active(
            Some("alice".to_string()),
            Some("read write".to_string()),
            1,
        );
        let principal = Principal::from_result(&result);

        assert_eq!(principal.subject.as_deref(), Some("alice"));
        assert_eq!(principal.scopes, vec!["read", "write"]);
        assert!(principal.has_scope("write"));
        assert!(!principal.has_scope("admin"));
    }

    #[test]
    fn test_principal_debug_redacts_subject() {
        let principal = Principal {
            subject: Some("secret-user".to_string()),
            scopes: vec!["read".to_string()],
        };
        let debug_str = format!("{principal:?}");

        assert!(!debug_str.contains("secret-user"));
        assert!(debug_str.contains("read"));
    }
}
