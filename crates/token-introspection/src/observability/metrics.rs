//! Metrics definitions for token introspection.
//!
//! All metrics follow Prometheus naming conventions:
//! - `introspection_` prefix
//! - `_total` suffix for counters
//! - `_seconds` suffix for duration histograms
//!
//! # Cardinality
//!
//! Labels are bounded to prevent cardinality explosion:
//! - `outcome` (cache): 3 values (hit, miss, expired)
//! - `status` (introspection): 3 values (active, inactive, error)
//! - `error_type`: bounded by `IntrospectionError::error_type`
//! - `outcome` (authentication): 4 values
//!
//! Token values and usernames are never used as labels.

use metrics::{counter, histogram};
use std::time::Duration;

// ============================================================================
// Cache Metrics
// ============================================================================

/// Record a validation cache lookup
///
/// Metric: `introspection_cache_lookups_total`
/// Labels: `outcome` (hit, miss, expired)
pub fn record_cache_lookup(outcome: &'static str) {
    counter!("introspection_cache_lookups_total", "outcome" => outcome).increment(1);
}

/// Record a swallowed cache write failure
///
/// Metric: `introspection_cache_write_failures_total`
pub fn record_cache_write_failure() {
    counter!("introspection_cache_write_failures_total").increment(1);
}

// ============================================================================
// Introspection Metrics
// ============================================================================

/// Record an introspection call
///
/// Metric: `introspection_calls_total`, `introspection_call_duration_seconds`
/// Labels: `status` (active, inactive, error)
pub fn record_introspection_call(status: &'static str, duration: Duration) {
    histogram!("introspection_call_duration_seconds", "status" => status)
        .record(duration.as_secs_f64());

    counter!("introspection_calls_total", "status" => status).increment(1);
}

/// Record an introspection failure by error type
///
/// Metric: `introspection_call_failures_total`
/// Labels: `error_type` (transport, status, parse)
pub fn record_introspection_failure(error_type: &'static str) {
    counter!("introspection_call_failures_total", "error_type" => error_type).increment(1);
}

// ============================================================================
// Authentication Metrics
// ============================================================================

/// Record an authentication decision
///
/// Metric: `introspection_authentications_total`
/// Labels: `outcome` (authenticated, rejected, missing_credential, error)
pub fn record_authentication(outcome: &'static str) {
    counter!("introspection_authentications_total", "outcome" => outcome).increment(1);
}

// ============================================================================
// Tests
// ============================================================================
