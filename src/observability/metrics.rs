//! Bootstrap metrics.
//!
//! # Metrics
//! - `modlr_validation_failures_total` (counter): rejected configurations by error kind
//! - `modlr_registry_entries_total` (counter): registry insertions by entry kind
//! - `modlr_assembly_duration_seconds` (histogram): wall time of a full pipeline run
//! - `modlr_registry_services` (gauge): services in the last assembled registry
//!
//! # Design Decisions
//! - No recorder is installed here; without one every call is a no-op
//! - Label values come from closed enums, keeping cardinality fixed

use std::time::Duration;

use ::metrics::{counter, gauge, histogram};

use crate::config::validation::ValidationErrorKind;

/// Count a configuration rejected by the validator.
pub fn record_validation_failure(kind: ValidationErrorKind) {
    counter!("modlr_validation_failures_total", "kind" => kind.as_str()).increment(1);
}

/// Count a registry insertion (`definition` or `alias`).
pub fn record_registry_entry(kind: &'static str) {
    counter!("modlr_registry_entries_total", "kind" => kind).increment(1);
}

/// Record a completed assembly.
pub fn record_assembly(duration: Duration, services: usize) {
    histogram!("modlr_assembly_duration_seconds").record(duration.as_secs_f64());
    gauge!("modlr_registry_services").set(services as f64);
}
