//! Service registry subsystem.
//!
//! # Data Flow
//! ```text
//! HostEnvironment::seed_registry (storage manager, store, utilities)
//!     → loaders extend it stage by stage
//!     → integrity check (no dangling internal references)
//!     → ServiceRegistry (read-only, serialized for the host container)
//! ```
//!
//! # Design Decisions
//! - Keys are a closed enum; host names are an explicit `External` variant
//! - Entries are either a descriptor or an alias, never both
//! - Directories are recorded, not created; a later pass creates them

pub mod descriptor;
pub mod host;
pub mod id;
pub mod services;

pub use descriptor::{Argument, Implementation, MethodCall, ServiceDescriptor};
pub use host::{HostEnvironment, UnknownBundle};
pub use id::{ServiceId, ServiceName, PREFIX};
pub use services::{Entry, RegistryError, ServiceRegistry};
