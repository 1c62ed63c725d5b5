//! Startup orchestration.
//!
//! # Responsibilities
//! - Load and validate configuration
//! - Seed the registry with the host collaborators
//! - Run the assembly pipeline
//! - Create the directories the loaders recorded
//!
//! # Design Decisions
//! - Fail fast: the first error aborts the bootstrap
//! - Directories are created only after a complete, consistent assembly

use std::path::Path;

use thiserror::Error;

use crate::capability::Capabilities;
use crate::config::loader::{load_config, ConfigError};
use crate::lifecycle::directories::{create_directories, DirectoryError};
use crate::lifecycle::pipeline::assemble;
use crate::loaders::{AssemblyError, LoadContext};
use crate::registry::{HostEnvironment, RegistryError, ServiceRegistry};

#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("failed to seed host services: {0}")]
    Seed(#[from] RegistryError),

    #[error(transparent)]
    Assembly(#[from] AssemblyError),

    #[error(transparent)]
    Directory(#[from] DirectoryError),
}

/// Load `path`, assemble the registry and create its directories.
pub fn bootstrap(
    path: &Path,
    host: &HostEnvironment,
    capabilities: &Capabilities,
) -> Result<ServiceRegistry, BootstrapError> {
    tracing::info!(config = %path.display(), "Bootstrapping modlr services");

    let tree = load_config(path, capabilities)?;
    let registry = host.seed_registry()?;
    let registry = assemble(&tree, LoadContext::new(host, capabilities), registry)?;
    let created = create_directories(&registry)?;

    tracing::info!(services = registry.len(), directories_created = created, "Bootstrap complete");
    Ok(registry)
}
