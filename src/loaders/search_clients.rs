//! Search client loader. Mirrors the persister loader, appending each
//! client to the storage manager with `addSearchClient`.

use crate::config::tree::{ConfigurationTree, SearchBackend, Selection};
use crate::loaders::{alias_external, AssemblyFailure, LoadContext, StorageManagerHandle};
use crate::registry::id::namespaced;
use crate::registry::{Implementation, RegistryError, ServiceDescriptor, ServiceId, ServiceRegistry};

pub fn load(
    tree: &ConfigurationTree,
    ctx: &LoadContext<'_>,
    mut registry: ServiceRegistry,
    manager: &StorageManagerHandle,
) -> Result<ServiceRegistry, AssemblyFailure> {
    for (name, selection) in &tree.search_clients {
        let id = ServiceId::SearchClient(name.clone());
        match selection {
            Selection::Service(service) => alias_external(&mut registry, id.clone(), service)?,
            Selection::BuiltIn(backend) => {
                ctx.ensure_available(backend, &namespaced(&format!("search_clients.{name}")))?;
                let descriptor = match backend {
                    SearchBackend::Elastic => elastic(name, &mut registry)?,
                };
                registry.define(id.clone(), descriptor)?;
            }
        }
        manager.append(&mut registry, "addSearchClient", id)?;
    }
    Ok(registry)
}

fn elastic(name: &str, registry: &mut ServiceRegistry) -> Result<ServiceDescriptor, RegistryError> {
    let metadata = ServiceId::SearchClientMetadata(name.to_string());
    registry.define(
        metadata.clone(),
        ServiceDescriptor::new(Implementation::ElasticStorageMetadataFactory).private(),
    )?;
    Ok(ServiceDescriptor::new(Implementation::ElasticClient).reference(metadata))
}
