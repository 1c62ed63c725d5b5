//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! validation, registry, pipeline
//!     → tracing events and per-stage spans
//!     → metrics.rs (counters, gauge, histogram)
//!
//! Consumers:
//!     → logging.rs subscriber (binary only, stderr)
//!     → whatever metrics recorder the host installs
//! ```
//!
//! # Design Decisions
//! - Every registered service is logged at debug level
//! - Each loader stage runs inside its own span

pub mod logging;
pub mod metrics;
