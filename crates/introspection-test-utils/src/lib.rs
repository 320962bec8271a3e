//! # Introspection Test Utilities
//!
//! Shared test utilities for the `token-introspection` crate.
//!
//! This crate provides:
//! - A wiremock-backed introspection endpoint (`TestIntrospectionServer`)
//! - Builders for RFC 7662 response bodies (`IntrospectionResponseBuilder`)
//! - Test tracing setup (`init_test_tracing`)
//!
//! ## Usage
//!
//! ```rust,ignore
//! use introspection_test_utils::*;
//! use token_introspection::TokenValidator;
//!
//! #[tokio::test]
//! async fn test_example() -> anyhow::Result<()> {
//!     let server = TestIntrospectionServer::start().await;
//!     server
//!         .respond_with_json(IntrospectionResponseBuilder::active().for_user("alice").build(), 1)
//!         .await;
//!
//!     let validator = TokenValidator::from_config(server.config())?;
//!     assert!(validator.validate("token").await?.is_active());
//!     Ok(())
//! }
//! ```

pub mod mock_server;
pub mod responses;
pub mod test_tracing;

// Re-export commonly used items
pub use mock_server::*;
pub use responses::*;
pub use test_tracing::*;
