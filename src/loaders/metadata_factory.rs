//! Metadata factory loader.

use crate::loaders::{require, AssemblyFailure, CacheHandle, DefaultDriver};
use crate::registry::{Argument, Implementation, MethodCall, ServiceDescriptor, ServiceId, ServiceRegistry};

/// Register the factory over the default driver; it receives the cache
/// through `setCache` only when one was registered.
pub fn load(
    mut registry: ServiceRegistry,
    driver: &DefaultDriver,
    cache: CacheHandle,
) -> Result<ServiceRegistry, AssemblyFailure> {
    require(&registry, ServiceId::EntityUtility)?;

    let mut descriptor = ServiceDescriptor::new(Implementation::MetadataFactory)
        .reference(driver.service())
        .reference(ServiceId::EntityUtility);
    if let Some(cache) = cache.service() {
        descriptor = descriptor.call(MethodCall::new("setCache", vec![Argument::Reference(cache)]));
    }

    registry.define(ServiceId::MetadataFactory, descriptor)?;
    Ok(registry)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capability::Capabilities;
    use crate::config::{validate_config, ConfigurationTree, RawConfig};
    use crate::loaders::{metadata_cache, metadata_drivers, LoadContext};
    use crate::registry::HostEnvironment;
    use serde_json::json;

    fn factory(cache_enabled: bool) -> ServiceDescriptor {
        let raw = RawConfig::from_value(json!({
            "adapter": { "type": "jsonapiorg" },
            "metadata": { "cache": { "enabled": cache_enabled } },
            "persisters": {},
            "search_clients": {},
        }))
        .unwrap();
        let tree: ConfigurationTree = validate_config(raw, &Capabilities::all()).unwrap();
        let host = HostEnvironment::default();
        let caps = Capabilities::all();
        let ctx = LoadContext::new(&host, &caps);

        let registry = host.seed_registry().unwrap();
        let (registry, cache) = metadata_cache::load(&tree, &ctx, registry).unwrap();
        let (registry, driver) = metadata_drivers::load(&tree, &ctx, registry).unwrap();
        let registry = load(registry, &driver, cache).unwrap();
        registry.definition(&ServiceId::MetadataFactory).unwrap().clone()
    }

    #[test]
    fn test_factory_references_default_driver() {
        let descriptor = factory(true);
        assert_eq!(
            descriptor.arguments,
            vec![
                Argument::Reference(ServiceId::DefaultDriver),
                Argument::Reference(ServiceId::EntityUtility),
            ]
        );
    }

    #[test]
    fn test_set_cache_only_when_enabled() {
        let enabled = factory(true);
        assert_eq!(enabled.calls.len(), 1);
        assert_eq!(enabled.calls[0].method, "setCache");
        assert_eq!(enabled.calls[0].arguments, vec![Argument::Reference(ServiceId::MetadataCache)]);

        assert!(factory(false).calls.is_empty());
    }
}
