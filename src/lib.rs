//! modlr service bootstrap.
//!
//! Validates the modlr configuration and assembles it into a declarative
//! service registry a host container can build from.
//!
//! # Architecture Overview
//!
//! ```text
//!   config file ──▶ config ──▶ ConfigurationTree
//!                     │  ▲
//!                     │  └── capability (installed backends)
//!                     ▼
//!   HostEnvironment ──▶ registry (seeded) ──▶ loaders (6 ordered stages)
//!                                                │
//!                                                ▼
//!                    lifecycle ◀── ServiceRegistry (descriptors, aliases,
//!                  (directories)                  parameters, directories)
//!
//!   hooks: MetadataWarmer, RestController (runtime adapters)
//!   observability: tracing events, metrics counters
//! ```

pub mod capability;
pub mod config;
pub mod hooks;
pub mod lifecycle;
pub mod loaders;
pub mod observability;
pub mod registry;

pub use capability::{Backend, Capabilities};
pub use config::{load_config, validate_config, ConfigError, ConfigurationTree, ValidationError};
pub use lifecycle::{assemble, bootstrap, create_directories, BootstrapError};
pub use loaders::{AssemblyError, AssemblyFailure, LoadContext, Stage};
pub use registry::{HostEnvironment, ServiceId, ServiceRegistry};
