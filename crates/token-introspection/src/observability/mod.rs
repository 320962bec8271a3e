//! Observability for token introspection.
//!
//! - `metrics` - Counters and histograms for cache, introspection and
//!   authentication outcomes

pub mod metrics;
