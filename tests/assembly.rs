//! End-to-end assembly of validated configurations.

use modlr_bootstrap::registry::{Argument, Entry, RegistryError, ServiceName};
use modlr_bootstrap::{AssemblyFailure, Backend, Capabilities, HostEnvironment, ServiceId, Stage};
use serde_json::json;

mod common;

#[test]
fn test_full_config_exposes_entry_points() {
    let host = HostEnvironment::new("/srv/cache", "/srv/app");
    let registry = common::assemble_value(common::full_config(), &host, &Capabilities::all()).unwrap();

    for id in [
        ServiceId::RestKernel,
        ServiceId::MetadataFactory,
        ServiceId::StorageManager,
        ServiceId::CacheClearCommand,
    ] {
        let descriptor = registry.definition(&id).unwrap_or_else(|| panic!("{id} missing"));
        assert!(descriptor.public, "{id} must be public");
    }
    assert_eq!(registry.parameter("rest.root_endpoint"), Some(&json!("modlr/api")));
    assert!(registry.dangling_references().is_empty());
}

#[test]
fn test_persisters_observe_seeded_storage_manager() {
    let host = HostEnvironment::default();
    let registry = common::assemble_value(common::full_config(), &host, &Capabilities::all()).unwrap();

    let manager = registry.definition(&ServiceId::StorageManager).unwrap();
    let methods: Vec<_> = manager.calls.iter().map(|c| c.method).collect();
    assert_eq!(methods, ["addPersister", "addSearchClient"]);
}

#[test]
fn test_custom_persister_creates_no_builtin_descriptor() {
    let mut config = common::minimal_config();
    config["persisters"] = json!({ "main": { "service": "@my_custom_persister" } });
    let mut caps = Capabilities::none();
    caps.register(Backend::JsonApiAdapter);

    let registry = common::assemble_value(config, &HostEnvironment::default(), &caps).unwrap();
    let id = ServiceId::Persister("main".into());
    assert_eq!(
        registry.get(&id),
        Some(&Entry::Alias {
            target: ServiceId::External(ServiceName::clean("my_custom_persister"))
        })
    );
    assert!(!registry.contains(&ServiceId::PersisterConnection("main".into())));
    assert!(!registry.contains(&ServiceId::PersisterMetadata("main".into())));

    let manager = registry.definition(&ServiceId::StorageManager).unwrap();
    assert_eq!(manager.calls[0].arguments, vec![Argument::Reference(id)]);
}

#[test]
fn test_two_drivers_single_default() {
    let mut config = common::minimal_config();
    config["metadata"] = json!({
        "drivers": {
            "first": { "type": "yml" },
            "second": { "type": "yml", "parameters": { "model_dir": "/elsewhere" } },
        }
    });
    let registry = common::assemble_value(config, &HostEnvironment::default(), &Capabilities::all()).unwrap();

    let defaults: Vec<_> = registry
        .iter()
        .filter(|(id, _)| **id == ServiceId::DefaultDriver)
        .map(|(_, entry)| entry.clone())
        .collect();
    assert_eq!(
        defaults,
        vec![Entry::Alias {
            target: ServiceId::MetadataDriver("first".into())
        }]
    );
    assert!(!registry.contains(&ServiceId::MetadataDriver("second".into())));
    assert!(registry.directories().all(|(key, _)| !key.contains("second")));
}

#[test]
fn test_disabled_cache_still_has_tooling() {
    let mut config = common::minimal_config();
    config["metadata"] = json!({ "cache": { "enabled": false } });
    let registry = common::assemble_value(config, &HostEnvironment::default(), &Capabilities::all()).unwrap();

    assert!(!registry.contains(&ServiceId::MetadataCache));
    assert!(registry.contains(&ServiceId::MetadataCacheWarmer));
    assert!(registry.contains(&ServiceId::BundleCacheWarmer));
    assert!(registry.contains(&ServiceId::CacheClearCommand));
    assert!(registry.definition(&ServiceId::MetadataFactory).unwrap().calls.is_empty());
}

#[test]
fn test_assembly_is_deterministic() {
    let host = HostEnvironment::default();
    let first = common::assemble_value(common::full_config(), &host, &Capabilities::all()).unwrap();
    let second = common::assemble_value(common::full_config(), &host, &Capabilities::all()).unwrap();
    assert_eq!(
        serde_json::to_string(&first).unwrap(),
        serde_json::to_string(&second).unwrap()
    );
}

#[test]
fn test_registry_serializes_with_namespaced_names() {
    let registry =
        common::assemble_value(common::full_config(), &HostEnvironment::default(), &Capabilities::all()).unwrap();
    let json = serde_json::to_value(&registry).unwrap();

    assert_eq!(json["services"]["modlr.metadata.default_driver"]["entry"], "alias");
    assert_eq!(
        json["services"]["modlr.metadata.default_driver"]["target"],
        "modlr.metadata.driver.default"
    );
    assert_eq!(json["services"]["modlr.rest.kernel"]["entry"], "definition");
    assert_eq!(json["parameters"]["modlr.rest.root_endpoint"], "modlr/api");
}

#[test]
fn test_unknown_bundle_fails_drivers_stage() {
    let mut config = common::minimal_config();
    config["metadata"] = json!({
        "drivers": { "default": { "parameters": { "model_dir": "@NoSuchBundle/models" } } }
    });
    let err = common::assemble_value(config, &HostEnvironment::default(), &Capabilities::all()).unwrap_err();
    assert_eq!(err.stage, Stage::MetadataDrivers);
    assert!(matches!(err.failure, AssemblyFailure::UnknownBundle(_)));
}

#[test]
fn test_persister_name_shadowing_builtin_connection_is_rejected() {
    let mut config = common::minimal_config();
    config["persisters"] = json!({
        "a": { "type": "mongodb", "parameters": { "host": "mongodb://localhost:27017" } },
        "a.connection": { "service": "@custom" },
    });
    let err = common::assemble_value(config, &HostEnvironment::default(), &Capabilities::all()).unwrap_err();
    assert_eq!(err.stage, Stage::Persisters);
    assert_eq!(
        err.failure,
        AssemblyFailure::Registry(RegistryError::Duplicate(ServiceId::Persister("a.connection".into())))
    );
}
