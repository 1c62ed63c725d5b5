//! Component loaders.
//!
//! # Data Flow
//! ```text
//! ConfigurationTree + seeded ServiceRegistry
//!     → metadata_cache.rs    (cache, warmers, clear command) → CacheHandle
//!     → metadata_drivers.rs  (first driver + file locator)   → DefaultDriver
//!     → metadata_factory.rs  (DefaultDriver, CacheHandle)
//!     → persisters.rs        (StorageManagerHandle)
//!     → rest.rs              (configuration, adapter, kernel)
//!     → search_clients.rs    (StorageManagerHandle)
//! ```
//!
//! # Design Decisions
//! - A loader takes the registry by value and hands it back extended
//! - Values later loaders depend on are returned as typed handles, so the
//!   order is enforced by signatures rather than by convention
//! - Loaders fail with [`AssemblyFailure`]; the pipeline adds the [`Stage`]
//! - A `service` selection always becomes an alias; built-ins are checked
//!   against the registered capabilities again before any descriptor is built

pub mod metadata_cache;
pub mod metadata_drivers;
pub mod metadata_factory;
pub mod persisters;
pub mod rest;
pub mod search_clients;

use std::fmt;

use thiserror::Error;

use crate::capability::{Backend, Capabilities};
use crate::config::tree::BuiltIn;
use crate::registry::{
    Argument, HostEnvironment, MethodCall, RegistryError, ServiceId, ServiceName, ServiceRegistry,
    UnknownBundle,
};

pub use metadata_cache::CacheHandle;
pub use metadata_drivers::DefaultDriver;

/// Pipeline stages in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    MetadataCache,
    MetadataDrivers,
    MetadataFactory,
    Persisters,
    Rest,
    SearchClients,
    /// Post-assembly reference check.
    Integrity,
}

impl Stage {
    pub const ORDER: [Stage; 7] = [
        Stage::MetadataCache,
        Stage::MetadataDrivers,
        Stage::MetadataFactory,
        Stage::Persisters,
        Stage::Rest,
        Stage::SearchClients,
        Stage::Integrity,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Stage::MetadataCache => "metadata_cache",
            Stage::MetadataDrivers => "metadata_drivers",
            Stage::MetadataFactory => "metadata_factory",
            Stage::Persisters => "persisters",
            Stage::Rest => "rest",
            Stage::SearchClients => "search_clients",
            Stage::Integrity => "integrity",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What went wrong inside a loader.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AssemblyFailure {
    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error("Required service \"{0}\" has not been registered")]
    MissingDependency(ServiceId),

    #[error("The library backend \"{}\" was not found for \"{path}\"", .backend.symbol())]
    BackendUnavailable { backend: Backend, path: String },

    #[error(transparent)]
    UnknownBundle(#[from] UnknownBundle),

    #[error("No metadata driver is configured")]
    NoMetadataDriver,

    #[error("Service \"{from}\" references unregistered service \"{to}\"")]
    DanglingReference { from: ServiceId, to: ServiceId },
}

/// A loader failure tagged with the stage that raised it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{stage} loader failed: {failure}")]
pub struct AssemblyError {
    pub stage: Stage,
    #[source]
    pub failure: AssemblyFailure,
}

/// Attach a [`Stage`] to a loader result.
pub trait AtStage<T> {
    fn at(self, stage: Stage) -> Result<T, AssemblyError>;
}

impl<T, E: Into<AssemblyFailure>> AtStage<T> for Result<T, E> {
    fn at(self, stage: Stage) -> Result<T, AssemblyError> {
        self.map_err(|e| AssemblyError {
            stage,
            failure: e.into(),
        })
    }
}

/// Host inputs shared by every loader.
#[derive(Debug, Clone, Copy)]
pub struct LoadContext<'a> {
    pub host: &'a HostEnvironment,
    pub capabilities: &'a Capabilities,
}

impl<'a> LoadContext<'a> {
    pub fn new(host: &'a HostEnvironment, capabilities: &'a Capabilities) -> Self {
        Self { host, capabilities }
    }

    /// Re-check a built-in's optional backend against the registered set.
    pub fn ensure_available<B: BuiltIn>(&self, built_in: &B, section: &str) -> Result<(), AssemblyFailure> {
        match built_in.capability() {
            Some(backend) if !self.capabilities.is_available(backend) => {
                Err(AssemblyFailure::BackendUnavailable {
                    backend,
                    path: format!("{section}.type"),
                })
            }
            _ => Ok(()),
        }
    }
}

/// Fail unless `id` is already registered.
pub fn require(registry: &ServiceRegistry, id: ServiceId) -> Result<(), AssemblyFailure> {
    if registry.contains(&id) {
        Ok(())
    } else {
        Err(AssemblyFailure::MissingDependency(id))
    }
}

/// Redirect a logical name to a caller-supplied service.
pub fn alias_external(
    registry: &mut ServiceRegistry,
    id: ServiceId,
    service: &ServiceName,
) -> Result<(), RegistryError> {
    registry.alias(id, ServiceId::External(service.clone()))
}

/// Proof that the host-owned storage manager is registered as a definition,
/// which persisters and search clients are appended to.
#[derive(Debug)]
pub struct StorageManagerHandle {
    _private: (),
}

impl StorageManagerHandle {
    pub fn locate(registry: &ServiceRegistry) -> Result<Self, AssemblyFailure> {
        match registry.definition(&ServiceId::StorageManager) {
            Some(_) => Ok(Self { _private: () }),
            None => Err(AssemblyFailure::MissingDependency(ServiceId::StorageManager)),
        }
    }

    /// Append `method(target)` to the storage manager.
    pub fn append(
        &self,
        registry: &mut ServiceRegistry,
        method: &'static str,
        target: ServiceId,
    ) -> Result<(), RegistryError> {
        registry.append_call(
            &ServiceId::StorageManager,
            MethodCall::new(method, vec![Argument::Reference(target)]),
        )
    }
}
