//! REST loader.
//!
//! Builds, in order, the root-endpoint-aware configuration, the API
//! adapter over it and the kernel the HTTP boundary calls into.

use crate::config::tree::{AdapterBackend, ConfigurationTree, RestSection, Selection};
use crate::loaders::{alias_external, require, AssemblyFailure, LoadContext};
use crate::registry::id::namespaced;
use crate::registry::{
    Argument, Implementation, MethodCall, RegistryError, ServiceDescriptor, ServiceId, ServiceRegistry,
};

/// Registry parameter holding the normalized root endpoint.
pub const ROOT_ENDPOINT_PARAMETER: &str = "rest.root_endpoint";

pub fn load(
    tree: &ConfigurationTree,
    ctx: &LoadContext<'_>,
    mut registry: ServiceRegistry,
) -> Result<ServiceRegistry, AssemblyFailure> {
    require(&registry, ServiceId::ValidatorUtility)?;
    require(&registry, ServiceId::Store)?;

    configuration(&tree.rest, &mut registry)?;

    match &tree.adapter {
        Selection::Service(service) => alias_external(&mut registry, ServiceId::ApiAdapter, service)?,
        Selection::BuiltIn(backend) => {
            ctx.ensure_available(backend, &namespaced("adapter"))?;
            let descriptor = match backend {
                AdapterBackend::JsonApiOrg => json_api_adapter(&mut registry)?,
            };
            registry.define(ServiceId::ApiAdapter, descriptor.private())?;
        }
    }

    registry.define(
        ServiceId::RestKernel,
        ServiceDescriptor::new(Implementation::RestKernel)
            .reference(ServiceId::ApiAdapter)
            .reference(ServiceId::RestConfiguration),
    )?;
    Ok(registry)
}

fn configuration(rest: &RestSection, registry: &mut ServiceRegistry) -> Result<(), RegistryError> {
    let endpoint = rest.root_endpoint.as_str();
    registry.define(
        ServiceId::RestConfiguration,
        ServiceDescriptor::new(Implementation::RestConfiguration)
            .reference(ServiceId::ValidatorUtility)
            .call(MethodCall::new("setRootEndpoint", vec![Argument::literal(endpoint)]))
            .private(),
    )?;
    registry.set_parameter(ROOT_ENDPOINT_PARAMETER, endpoint);
    Ok(())
}

fn json_api_adapter(registry: &mut ServiceRegistry) -> Result<ServiceDescriptor, RegistryError> {
    registry.define(
        ServiceId::ApiSerializer,
        ServiceDescriptor::new(Implementation::JsonApiSerializer).private(),
    )?;
    registry.define(
        ServiceId::ApiNormalizer,
        ServiceDescriptor::new(Implementation::JsonApiNormalizer).private(),
    )?;

    Ok(ServiceDescriptor::new(Implementation::JsonApiAdapter)
        .reference(ServiceId::ApiSerializer)
        .reference(ServiceId::ApiNormalizer)
        .reference(ServiceId::Store)
        .reference(ServiceId::RestConfiguration))
}
