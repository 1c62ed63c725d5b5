//! Metadata cache loader.
//!
//! Registers the cache warmer, the bundle warmer hook and the cache-clear
//! command before anything else, whether or not the cache is enabled. With
//! the cache disabled the factory simply never receives a cache, so both
//! tools run as no-ops.

use std::path::{Path, PathBuf};

use crate::config::tree::{CacheBackend, CacheSection, ConfigurationTree, Selection};
use crate::loaders::{alias_external, AssemblyFailure, LoadContext};
use crate::registry::id::{namespaced, PREFIX};
use crate::registry::{Implementation, RegistryError, ServiceDescriptor, ServiceId, ServiceRegistry};

/// Tag picked up by the host's cache-warming driver.
pub const CACHE_WARMER_TAG: &str = "kernel.cache_warmer";

/// Tag picked up by the host's CLI dispatcher.
pub const CONSOLE_COMMAND_TAG: &str = "console.command";

/// Directory key for a file-based cache.
pub const CACHE_DIR_KEY: &str = "metadata_cache_dir";

/// Whether a metadata cache service was registered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheHandle {
    Disabled,
    Enabled,
}

impl CacheHandle {
    /// The cache service the factory should receive, if any.
    pub fn service(self) -> Option<ServiceId> {
        match self {
            CacheHandle::Enabled => Some(ServiceId::MetadataCache),
            CacheHandle::Disabled => None,
        }
    }
}

pub fn load(
    tree: &ConfigurationTree,
    ctx: &LoadContext<'_>,
    mut registry: ServiceRegistry,
) -> Result<(ServiceRegistry, CacheHandle), AssemblyFailure> {
    register_tooling(&mut registry)?;

    let selection = match &tree.metadata.cache {
        CacheSection::Disabled => {
            tracing::debug!("Metadata cache disabled");
            return Ok((registry, CacheHandle::Disabled));
        }
        CacheSection::Enabled(selection) => selection,
    };

    match selection {
        Selection::Service(service) => {
            alias_external(&mut registry, ServiceId::MetadataCache, service)?;
        }
        Selection::BuiltIn(backend) => {
            ctx.ensure_available(backend, &namespaced("metadata.cache"))?;
            let descriptor = match backend {
                CacheBackend::File { dir } => {
                    file_cache(Implementation::FileCache, dir.as_deref(), ctx, &mut registry)
                }
                CacheBackend::BinaryFile { dir } => {
                    file_cache(Implementation::BinaryFileCache, dir.as_deref(), ctx, &mut registry)
                }
                CacheBackend::Redis { handler } => ServiceDescriptor::new(Implementation::RedisCache)
                    .reference(ServiceId::External(handler.clone())),
            };
            registry.define(ServiceId::MetadataCache, descriptor)?;
        }
    }

    Ok((registry, CacheHandle::Enabled))
}

fn register_tooling(registry: &mut ServiceRegistry) -> Result<(), RegistryError> {
    registry.define(
        ServiceId::MetadataCacheWarmer,
        ServiceDescriptor::new(Implementation::CacheWarmer)
            .reference(ServiceId::MetadataFactory)
            .private(),
    )?;
    registry.define(
        ServiceId::BundleCacheWarmer,
        ServiceDescriptor::new(Implementation::BundleMetadataWarmer)
            .reference(ServiceId::MetadataCacheWarmer)
            .tag(CACHE_WARMER_TAG)
            .private(),
    )?;
    registry.define(
        ServiceId::CacheClearCommand,
        ServiceDescriptor::new(Implementation::ClearCacheCommand)
            .reference(ServiceId::MetadataFactory)
            .tag(CONSOLE_COMMAND_TAG),
    )
}

/// Build a file cache over `dir`, defaulting beneath the host cache directory.
fn file_cache(
    implementation: Implementation,
    dir: Option<&Path>,
    ctx: &LoadContext<'_>,
    registry: &mut ServiceRegistry,
) -> ServiceDescriptor {
    let dir: PathBuf = dir
        .map(Path::to_path_buf)
        .unwrap_or_else(|| ctx.host.cache_dir.join(PREFIX));
    registry.add_directory(CACHE_DIR_KEY, dir.clone());
    ServiceDescriptor::new(implementation).literal(dir.display().to_string())
}
