//! Builders for RFC 7662 introspection response bodies.

use chrono::{Duration, Utc};
use serde_json::{json, Map, Value};

/// Builder for introspection response JSON.
///
/// # Example
/// ```rust,ignore
/// let body = IntrospectionResponseBuilder::active()
///     .for_user("alice")
///     .with_scope("read write")
///     .expires_in(3600)
///     .build();
/// ```
#[derive(Debug, Clone)]
pub struct IntrospectionResponseBuilder {
    active: bool,
    username: Option<String>,
    scope: Option<String>,
    exp: Option<i64>,
}

impl IntrospectionResponseBuilder {
    /// Active token with no optional members.
    pub fn active() -> Self {
        Self {
            active: true,
            username: None,
            scope: None,
            exp: None,
        }
    }

    /// `{"active": false}`.
    pub fn inactive() -> Self {
        Self {
            active: false,
            ..Self::active()
        }
    }

    pub fn for_user(mut self, username: &str) -> Self {
        self.username = Some(username.to_string());
        self
    }

    /// Set the scope (space-separated)
    pub fn with_scope(mut self, scope: &str) -> Self {
        self.scope = Some(scope.to_string());
        self
    }

    /// Set expiration in seconds from now
    pub fn expires_in(mut self, seconds: i64) -> Self {
        self.exp = Some((Utc::now() + Duration::seconds(seconds)).timestamp());
        self
    }

    /// Set an absolute expiration timestamp
    pub fn expires_at(mut self, timestamp: i64) -> Self {
        self.exp = Some(timestamp);
        self
    }

    /// Build the response body as a JSON value
    pub fn build(self) -> Value {
        let mut body = Map::new();
        body.insert("active".to_string(), json!(self.active));
        if let Some(username) = self.username {
            body.insert("username".to_string(), json!(username));
        }
        if let Some(scope) = self.scope {
            body.insert("scope".to_string(), json!(scope));
        }
        if let Some(exp) = self.exp {
            body.insert("exp".to_string(), json!(exp));
        }
        Value::Object(body)
    }
}
