//! Structured logging.
//!
//! # Responsibilities
//! - Install the global `tracing` subscriber for the binary
//! - Honour `RUST_LOG`, falling back to a crate-level default
//!
//! # Design Decisions
//! - The library only emits events; installing a subscriber is the binary's call
//! - Verbosity flags raise the fallback level, `RUST_LOG` still wins

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Filter used when `RUST_LOG` is unset.
pub fn default_filter(verbose: u8) -> String {
    let level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    format!("modlr_bootstrap={level}")
}

/// Initialize the global subscriber. Logs go to stderr so command output
/// on stdout stays machine-readable.
pub fn init(verbose: u8) {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter(verbose).into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
