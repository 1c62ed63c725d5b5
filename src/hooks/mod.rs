//! Narrow interfaces to the collaborators the registry wires up.
//!
//! The warmer and the REST controller are the only runtime code this crate
//! ships; everything else is described by descriptors and built by the host.

pub mod cache_warmer;
pub mod rest;

pub use cache_warmer::{CacheWarmer, MetadataWarmer};
pub use rest::{RestController, RestKernel};
