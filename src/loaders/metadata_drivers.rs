//! Metadata driver loader.
//!
//! Only one driver can be active. The first configured entry becomes the
//! default driver; later entries are validated but never registered.

use std::path::PathBuf;

use crate::config::tree::{ConfigurationTree, DriverBackend, Selection};
use crate::loaders::{alias_external, AssemblyFailure, LoadContext};
use crate::registry::id::{namespaced, PREFIX};
use crate::registry::{
    HostEnvironment, Implementation, ServiceDescriptor, ServiceId, ServiceRegistry, UnknownBundle,
};

/// The driver chosen as `modlr.metadata.default_driver`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DefaultDriver {
    active: ServiceId,
}

impl DefaultDriver {
    /// Name the metadata factory references.
    pub fn service(&self) -> ServiceId {
        ServiceId::DefaultDriver
    }

    /// The driver the default alias points at.
    pub fn active(&self) -> &ServiceId {
        &self.active
    }
}

pub fn load(
    tree: &ConfigurationTree,
    ctx: &LoadContext<'_>,
    mut registry: ServiceRegistry,
) -> Result<(ServiceRegistry, DefaultDriver), AssemblyFailure> {
    let mut drivers = tree.metadata.drivers.iter();
    let (name, selection) = drivers.next().ok_or(AssemblyFailure::NoMetadataDriver)?;
    for (ignored, _) in drivers {
        tracing::warn!(driver = %ignored, active = %name, "Only one metadata driver is supported, ignoring");
    }

    let id = ServiceId::MetadataDriver(name.clone());
    match selection {
        Selection::Service(service) => alias_external(&mut registry, id.clone(), service)?,
        Selection::BuiltIn(backend) => {
            ctx.ensure_available(backend, &format!("{}.{name}", namespaced("metadata.drivers")))?;
            let descriptor = match backend {
                DriverBackend::Yml { model_dir, mixin_dir } => yml_driver(
                    &id,
                    name,
                    model_dir.as_deref(),
                    mixin_dir.as_deref(),
                    ctx.host,
                    &mut registry,
                )?,
            };
            registry.define(id.clone(), descriptor.private())?;
        }
    }

    registry.alias(ServiceId::DefaultDriver, id.clone())?;
    Ok((registry, DefaultDriver { active: id }))
}

fn yml_driver(
    id: &ServiceId,
    name: &str,
    model_dir: Option<&str>,
    mixin_dir: Option<&str>,
    host: &HostEnvironment,
    registry: &mut ServiceRegistry,
) -> Result<ServiceDescriptor, AssemblyFailure> {
    let model_dir = definition_dir("model", model_dir, host)?;
    let mixin_dir = definition_dir("mixin", mixin_dir, host)?;

    registry.add_directory(format!("{id}.model_dir"), model_dir.clone());
    registry.add_directory(format!("{id}.mixin_dir"), mixin_dir.clone());

    let locator = ServiceId::DriverFileLocator(name.to_string());
    registry.define(
        locator.clone(),
        ServiceDescriptor::new(Implementation::FileLocator)
            .literal(model_dir.display().to_string())
            .literal(mixin_dir.display().to_string())
            .private(),
    )?;

    Ok(ServiceDescriptor::new(Implementation::YamlFileDriver)
        .reference(locator)
        .reference(ServiceId::StorageManager))
}

/// `<root_dir>/Resources/modlr/<kind>s` unless configured.
fn definition_dir(kind: &str, configured: Option<&str>, host: &HostEnvironment) -> Result<PathBuf, UnknownBundle> {
    match configured {
        Some(path) => host.locate_resource(path),
        None => Ok(host.root_dir.join("Resources").join(PREFIX).join(format!("{kind}s"))),
    }
}
