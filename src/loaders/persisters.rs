//! Persister loader.
//!
//! Every configured persister, built-in or custom, is appended to the
//! storage manager with `addPersister`.

use serde_json::{Map, Value};

use crate::config::tree::{ConfigurationTree, PersisterBackend, Selection};
use crate::loaders::{alias_external, AssemblyFailure, LoadContext, StorageManagerHandle};
use crate::registry::id::namespaced;
use crate::registry::{Implementation, ServiceDescriptor, ServiceId, ServiceRegistry};

pub fn load(
    tree: &ConfigurationTree,
    ctx: &LoadContext<'_>,
    mut registry: ServiceRegistry,
    manager: &StorageManagerHandle,
) -> Result<ServiceRegistry, AssemblyFailure> {
    for (name, selection) in &tree.persisters {
        let id = ServiceId::Persister(name.clone());
        match selection {
            Selection::Service(service) => alias_external(&mut registry, id.clone(), service)?,
            Selection::BuiltIn(backend) => {
                ctx.ensure_available(backend, &namespaced(&format!("persisters.{name}")))?;
                let descriptor = match backend {
                    PersisterBackend::MongoDb { host, options } => {
                        mongodb(name, host, options, &mut registry)?
                    }
                };
                registry.define(id.clone(), descriptor)?;
            }
        }
        manager.append(&mut registry, "addPersister", id)?;
    }
    Ok(registry)
}

/// Storage metadata helper and connection first, then the persister over both.
fn mongodb(
    name: &str,
    host: &str,
    options: &Map<String, Value>,
    registry: &mut ServiceRegistry,
) -> Result<ServiceDescriptor, AssemblyFailure> {
    let metadata = ServiceId::PersisterMetadata(name.to_string());
    registry.define(
        metadata.clone(),
        ServiceDescriptor::new(Implementation::MongoDbStorageMetadataFactory)
            .reference(ServiceId::EntityUtility)
            .private(),
    )?;

    let connection = ServiceId::PersisterConnection(name.to_string());
    registry.define(
        connection.clone(),
        ServiceDescriptor::new(Implementation::MongoDbConnection)
            .literal(host)
            .literal(Value::Object(options.clone()))
            .private(),
    )?;

    Ok(ServiceDescriptor::new(Implementation::MongoDbPersister)
        .reference(connection)
        .reference(metadata))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capability::{Backend, Capabilities};
    use crate::config::{validate_config, RawConfig};
    use crate::registry::{Argument, Entry, HostEnvironment, ServiceName};
    use serde_json::json;

    fn tree(persisters: Value) -> ConfigurationTree {
        let raw = RawConfig::from_value(json!({
            "adapter": { "type": "jsonapiorg" },
            "persisters": persisters,
            "search_clients": {},
        }))
        .unwrap();
        validate_config(raw, &Capabilities::all()).unwrap()
    }

    fn run(tree: &ConfigurationTree, caps: &Capabilities) -> Result<ServiceRegistry, AssemblyFailure> {
        let host = HostEnvironment::default();
        let registry = host.seed_registry().unwrap();
        let manager = StorageManagerHandle::locate(&registry)?;
        load(tree, &LoadContext::new(&host, caps), registry, &manager)
    }

    #[test]
    fn test_mongodb_persister() {
        let tree = tree(json!({
            "default": {
                "type": "mongodb",
                "parameters": { "host": "mongodb://localhost:27017", "options": { "connect": true } }
            }
        }));
        let registry = run(&tree, &Capabilities::all()).unwrap();

        let connection = registry
            .definition(&ServiceId::PersisterConnection("default".into()))
            .unwrap();
        assert!(!connection.public);
        assert_eq!(
            connection.arguments,
            vec![
                Argument::literal("mongodb://localhost:27017"),
                Argument::literal(json!({ "connect": true })),
            ]
        );

        let persister = registry.definition(&ServiceId::Persister("default".into())).unwrap();
        assert_eq!(persister.implementation, Implementation::MongoDbPersister);
        assert_eq!(
            persister.arguments,
            vec![
                Argument::Reference(ServiceId::PersisterConnection("default".into())),
                Argument::Reference(ServiceId::PersisterMetadata("default".into())),
            ]
        );
    }

    #[test]
    fn test_options_default_to_empty_mapping() {
        let tree = tree(json!({ "main": { "type": "mongodb", "parameters": { "host": "mongodb://db" } } }));
        let registry = run(&tree, &Capabilities::all()).unwrap();
        let connection = registry
            .definition(&ServiceId::PersisterConnection("main".into()))
            .unwrap();
        assert_eq!(connection.arguments[1], Argument::literal(json!({})));
    }

    #[test]
    fn test_custom_persister_is_aliased_and_appended() {
        let tree = tree(json!({ "main": { "service": "@my_custom_persister" } }));
        let registry = run(&tree, &Capabilities::none()).unwrap();

        let id = ServiceId::Persister("main".into());
        assert_eq!(
            registry.get(&id),
            Some(&Entry::Alias {
                target: ServiceId::External(ServiceName::clean("my_custom_persister"))
            })
        );
        let manager = registry.definition(&ServiceId::StorageManager).unwrap();
        assert_eq!(manager.calls.len(), 1);
        assert_eq!(manager.calls[0].method, "addPersister");
        assert_eq!(manager.calls[0].arguments, vec![Argument::Reference(id)]);
    }

    #[test]
    fn test_persisters_append_in_configured_order() {
        let tree = tree(json!({
            "zeta": { "service": "z" },
            "alpha": { "type": "mongodb", "parameters": { "host": "mongodb://db" } },
        }));
        let registry = run(&tree, &Capabilities::all()).unwrap();
        let manager = registry.definition(&ServiceId::StorageManager).unwrap();
        let targets: Vec<_> = manager.calls.iter().map(|c| c.arguments[0].clone()).collect();
        assert_eq!(
            targets,
            vec![
                Argument::Reference(ServiceId::Persister("zeta".into())),
                Argument::Reference(ServiceId::Persister("alpha".into())),
            ]
        );
    }

    #[test]
    fn test_mongodb_unavailable_at_assembly() {
        let tree = tree(json!({ "main": { "type": "mongodb", "parameters": { "host": "mongodb://db" } } }));
        let mut caps = Capabilities::all();
        caps.unregister(Backend::MongoDbPersister);
        let err = run(&tree, &caps).unwrap_err();
        assert_eq!(
            err,
            AssemblyFailure::BackendUnavailable {
                backend: Backend::MongoDbPersister,
                path: "modlr.persisters.main.type".into()
            }
        );
    }
}
