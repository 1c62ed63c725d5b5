//! Lifecycle subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     Load config → Validate → Seed registry → Assemble → Create directories
//!
//! Assembly (pipeline.rs):
//!     cache → drivers → factory → persisters → rest → search clients → integrity
//!
//! Directories (directories.rs):
//!     Recorded paths → create missing ones (idempotent)
//! ```
//!
//! # Design Decisions
//! - Single pass, single thread, once per process
//! - No partial results: any failure is fatal to the bootstrap

pub mod directories;
pub mod pipeline;
pub mod startup;

pub use directories::{create_directories, DirectoryError};
pub use pipeline::assemble;
pub use startup::{bootstrap, BootstrapError};
