//! Assembly pipeline.
//!
//! # Responsibilities
//! - Run the loaders in their fixed order against one tree and one registry
//! - Thread the typed handles from earlier stages into later ones
//! - Reject a registry holding references to names nobody registered
//!
//! # Design Decisions
//! - The first failing stage aborts the run; nothing is rolled back
//! - Each stage runs inside a `loader` span named after the stage

use std::time::Instant;

use crate::config::tree::ConfigurationTree;
use crate::loaders::{
    metadata_cache, metadata_drivers, metadata_factory, persisters, rest, search_clients,
    AssemblyError, AssemblyFailure, AtStage, LoadContext, Stage, StorageManagerHandle,
};
use crate::observability::metrics;
use crate::registry::ServiceRegistry;

/// Assemble `tree` into `registry`, which must already hold the host-owned
/// collaborators (see `HostEnvironment::seed_registry`).
pub fn assemble(
    tree: &ConfigurationTree,
    ctx: LoadContext<'_>,
    registry: ServiceRegistry,
) -> Result<ServiceRegistry, AssemblyError> {
    let started = Instant::now();

    let (registry, cache) = run(Stage::MetadataCache, || metadata_cache::load(tree, &ctx, registry))?;
    let (registry, driver) = run(Stage::MetadataDrivers, || metadata_drivers::load(tree, &ctx, registry))?;
    let registry = run(Stage::MetadataFactory, || metadata_factory::load(registry, &driver, cache))?;
    let registry = run(Stage::Persisters, || {
        let manager = StorageManagerHandle::locate(&registry)?;
        persisters::load(tree, &ctx, registry, &manager)
    })?;
    let registry = run(Stage::Rest, || rest::load(tree, &ctx, registry))?;
    let registry = run(Stage::SearchClients, || {
        let manager = StorageManagerHandle::locate(&registry)?;
        search_clients::load(tree, &ctx, registry, &manager)
    })?;
    let registry = run(Stage::Integrity, || check_references(registry))?;

    metrics::record_assembly(started.elapsed(), registry.len());
    tracing::info!(
        services = registry.len(),
        default_driver = %driver.active(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "Service registry assembled"
    );
    Ok(registry)
}

fn run<T>(stage: Stage, load: impl FnOnce() -> Result<T, AssemblyFailure>) -> Result<T, AssemblyError> {
    let _span = tracing::info_span!("loader", stage = %stage).entered();
    let result = load().at(stage);
    match &result {
        Ok(_) => tracing::debug!("Stage complete"),
        Err(e) => tracing::error!(error = %e.failure, "Stage failed"),
    }
    result
}

/// Every internal reference must name a registered service.
fn check_references(registry: ServiceRegistry) -> Result<ServiceRegistry, AssemblyFailure> {
    if let Some((from, to)) = registry.dangling_references().into_iter().next() {
        return Err(AssemblyFailure::DanglingReference {
            from: from.clone(),
            to: to.clone(),
        });
    }
    Ok(registry)
}
