//! Bearer token validation via OAuth 2.0 Token Introspection (RFC 7662).
//!
//! Validates opaque access tokens by asking a remote introspection endpoint
//! whether they are active, and caches active verdicts until they expire so
//! repeated validation of the same token skips the network.
//!
//! # Architecture
//!
//! ```text
//! provider.rs -> validator.rs -> cache.rs (lookup) -> client.rs -> transport.rs
//!                             -> cache.rs (store)
//! ```
//!
//! # Modules
//!
//! - `scope` - Space-separated scope string parsing
//! - `clock` - Injectable epoch-seconds clock
//! - `models` - `IntrospectionResult` and `Principal` value types
//! - `errors` - Error taxonomy (call failures vs. malformed responses)
//! - `config` - Introspection server and HTTP client configuration
//! - `transport` - `HttpPost` seam and the reqwest-backed default
//! - `client` - RFC 7662 request building and response parsing
//! - `cache` - Expiry-aware validation cache over a `KvCache` store
//! - `validator` - Cache-then-introspect orchestration
//! - `provider` - Authentication boundary adapter
//! - `observability` - Metrics

#![warn(clippy::pedantic)]

pub mod cache;
pub mod client;
pub mod clock;
pub mod config;
pub mod errors;
pub mod models;
pub mod observability;
pub mod provider;
pub mod scope;
pub mod transport;
pub mod validator;

pub use cache::{CacheLookup, InMemoryKvCache, KvCache, ValidationCache};
pub use client::IntrospectionClient;
pub use clock::{Clock, SystemClock};
pub use config::{ClientCredentials, HttpClientConfig, IntrospectionServerConfig};
pub use errors::{AuthError, CacheError, ConfigError, IntrospectionError, TransportError};
pub use models::{IntrospectionResult, Principal};
pub use provider::{AuthProvider, IntrospectionAuthProvider, PrincipalSink};
pub use scope::parse_scopes;
pub use transport::{HttpPost, HttpResponse, ReqwestTransport};
pub use validator::{TokenValidator, ValidationOutcome};
