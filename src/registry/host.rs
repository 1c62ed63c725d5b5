//! Host environment the assembler runs inside.
//!
//! # Responsibilities
//! - Carry the host paths loaders derive directories from
//! - Resolve `@Bundle/path` resource references
//! - Seed the collaborators the host owns (storage manager, store, utilities)

use std::path::PathBuf;

use indexmap::IndexMap;
use thiserror::Error;

use crate::registry::descriptor::{Implementation, ServiceDescriptor};
use crate::registry::id::ServiceId;
use crate::registry::services::{RegistryError, ServiceRegistry};

/// A `@Bundle/...` reference named a bundle the host does not know.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unable to find a bundle named \"{bundle}\" for resource path \"{path}\"")]
pub struct UnknownBundle {
    pub bundle: String,
    pub path: String,
}

/// Paths and bundles supplied by the host.
#[derive(Debug, Clone)]
pub struct HostEnvironment {
    /// Host cache directory; file metadata caches default beneath it.
    pub cache_dir: PathBuf,

    /// Project root; YAML definitions default beneath it.
    pub root_dir: PathBuf,

    /// Bundle name → bundle directory, for `@Bundle/path` references.
    pub bundles: IndexMap<String, PathBuf>,
}

impl Default for HostEnvironment {
    fn default() -> Self {
        Self::new("var/cache", "app")
    }
}

impl HostEnvironment {
    pub fn new(cache_dir: impl Into<PathBuf>, root_dir: impl Into<PathBuf>) -> Self {
        Self {
            cache_dir: cache_dir.into(),
            root_dir: root_dir.into(),
            bundles: IndexMap::new(),
        }
    }

    pub fn with_bundle(mut self, name: impl Into<String>, dir: impl Into<PathBuf>) -> Self {
        self.bundles.insert(name.into(), dir.into());
        self
    }

    /// Resolve a configured resource path.
    ///
    /// `@AppBundle/Resources/models` resolves against the `AppBundle`
    /// directory; any other path is returned unchanged. Backslashes in bundle
    /// references are normalized to forward slashes.
    pub fn locate_resource(&self, path: &str) -> Result<PathBuf, UnknownBundle> {
        let Some(reference) = path.strip_prefix('@') else {
            return Ok(PathBuf::from(path));
        };
        let reference = reference.replace('\\', "/");
        let (bundle, rest) = reference.split_once('/').unwrap_or((reference.as_str(), ""));

        let dir = self.bundles.get(bundle).ok_or_else(|| UnknownBundle {
            bundle: bundle.to_string(),
            path: path.to_string(),
        })?;
        if rest.is_empty() {
            return Ok(dir.clone());
        }
        Ok(dir.join(rest))
    }

    /// A registry holding the collaborators the host provides before any
    /// loader runs.
    pub fn seed_registry(&self) -> Result<ServiceRegistry, RegistryError> {
        let mut registry = ServiceRegistry::new();
        registry.define(
            ServiceId::StorageManager,
            ServiceDescriptor::new(Implementation::StorageManager),
        )?;
        registry.define(ServiceId::EntityUtility, ServiceDescriptor::new(Implementation::EntityUtility))?;
        registry.define(ServiceId::ValidatorUtility, ServiceDescriptor::new(Implementation::Validator))?;
        registry.define(
            ServiceId::Store,
            ServiceDescriptor::new(Implementation::Store)
                .reference(ServiceId::MetadataFactory)
                .reference(ServiceId::StorageManager),
        )?;
        Ok(registry)
    }
}
