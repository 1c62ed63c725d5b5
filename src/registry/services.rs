//! The service registry assembled by the loaders.
//!
//! # Responsibilities
//! - Hold descriptors and aliases by logical name
//! - Hold parameters and the directories the host must create
//! - Refuse to overwrite an existing name, including a distinct id that
//!   renders to the same name
//!
//! # Design Decisions
//! - Insertion order is preserved so the serialized graph is deterministic
//! - The only in-place change is appending a method call to a definition

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

use crate::observability::metrics;
use crate::registry::descriptor::{MethodCall, ServiceDescriptor};
use crate::registry::id::{namespaced, ServiceId};

/// Errors raised when mutating the registry.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("Service \"{0}\" is already registered")]
    Duplicate(ServiceId),

    #[error("Service \"{0}\" is not registered")]
    Unknown(ServiceId),

    #[error("Service \"{0}\" is an alias and cannot receive method calls")]
    NotADefinition(ServiceId),
}

/// A registry value: a concrete recipe or a redirect to another name.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "entry", rename_all = "snake_case")]
pub enum Entry {
    Definition(ServiceDescriptor),
    Alias { target: ServiceId },
}

/// Logical name → descriptor or alias, plus build parameters.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ServiceRegistry {
    services: IndexMap<ServiceId, Entry>,
    #[serde(skip)]
    names: HashSet<String>,
    parameters: IndexMap<String, Value>,
    directories: IndexMap<String, PathBuf>,
}

impl ServiceRegistry {
    /// Create an empty registry with no host services.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a descriptor under `id`.
    pub fn define(&mut self, id: ServiceId, descriptor: ServiceDescriptor) -> Result<(), RegistryError> {
        self.insert(id, Entry::Definition(descriptor))?;
        metrics::record_registry_entry("definition");
        Ok(())
    }

    /// Redirect `id` to `target`.
    pub fn alias(&mut self, id: ServiceId, target: ServiceId) -> Result<(), RegistryError> {
        self.insert(id, Entry::Alias { target })?;
        metrics::record_registry_entry("alias");
        Ok(())
    }

    fn insert(&mut self, id: ServiceId, entry: Entry) -> Result<(), RegistryError> {
        // Hosts key by rendered name, so `Persister("a.connection")` and
        // `PersisterConnection("a")` collide.
        if !self.names.insert(id.to_string()) {
            return Err(RegistryError::Duplicate(id));
        }
        tracing::debug!(service = %id, kind = entry_kind(&entry), "Service registered");
        self.services.insert(id, entry);
        Ok(())
    }

    /// Append a method call to an existing definition.
    pub fn append_call(&mut self, id: &ServiceId, call: MethodCall) -> Result<(), RegistryError> {
        match self.services.get_mut(id) {
            Some(Entry::Definition(descriptor)) => {
                tracing::debug!(service = %id, method = call.method, "Method call appended");
                descriptor.calls.push(call);
                Ok(())
            }
            Some(Entry::Alias { .. }) => Err(RegistryError::NotADefinition(id.clone())),
            None => Err(RegistryError::Unknown(id.clone())),
        }
    }

    pub fn get(&self, id: &ServiceId) -> Option<&Entry> {
        self.services.get(id)
    }

    pub fn contains(&self, id: &ServiceId) -> bool {
        self.services.contains_key(id)
    }

    /// The descriptor registered under `id`, if `id` is a definition.
    pub fn definition(&self, id: &ServiceId) -> Option<&ServiceDescriptor> {
        match self.services.get(id) {
            Some(Entry::Definition(descriptor)) => Some(descriptor),
            _ => None,
        }
    }

    /// The direct alias target of `id`, if `id` is an alias.
    pub fn alias_target(&self, id: &ServiceId) -> Option<&ServiceId> {
        match self.services.get(id) {
            Some(Entry::Alias { target }) => Some(target),
            _ => None,
        }
    }

    /// Follow aliases from `id` to the name that finally holds a definition
    /// (or to an external name). Returns `None` for unknown or cyclic names.
    pub fn resolve<'a>(&'a self, id: &'a ServiceId) -> Option<&'a ServiceId> {
        let mut current = id;
        for _ in 0..=self.services.len() {
            match self.services.get(current) {
                Some(Entry::Definition(_)) => return Some(current),
                Some(Entry::Alias { target }) => current = target,
                None if current.is_external() => return Some(current),
                None => return None,
            }
        }
        None
    }

    pub fn iter(&self) -> impl Iterator<Item = (&ServiceId, &Entry)> {
        self.services.iter()
    }

    pub fn len(&self) -> usize {
        self.services.len()
    }

    pub fn is_empty(&self) -> bool {
        self.services.is_empty()
    }

    /// Set a namespaced build parameter (`name` is given without prefix).
    pub fn set_parameter(&mut self, name: &str, value: impl Into<Value>) {
        self.parameters.insert(namespaced(name), value.into());
    }

    /// Look up a build parameter by its un-prefixed name.
    pub fn parameter(&self, name: &str) -> Option<&Value> {
        self.parameters.get(&namespaced(name))
    }

    /// Record a directory the host must create once assembly is done.
    pub fn add_directory(&mut self, key: impl Into<String>, path: impl Into<PathBuf>) {
        self.directories.insert(key.into(), path.into());
    }

    pub fn directories(&self) -> impl Iterator<Item = (&str, &Path)> {
        self.directories.iter().map(|(k, v)| (k.as_str(), v.as_path()))
    }

    /// Internal names referenced by a definition or alias without being
    /// registered. External names are trusted and never reported.
    pub fn dangling_references(&self) -> Vec<(&ServiceId, &ServiceId)> {
        let mut dangling = Vec::new();
        for (id, entry) in &self.services {
            let targets = match entry {
                Entry::Definition(descriptor) => descriptor.references(),
                Entry::Alias { target } => vec![target],
            };
            for target in targets {
                if !target.is_external() && !self.services.contains_key(target) {
                    dangling.push((id, target));
                }
            }
        }
        dangling
    }
}

fn entry_kind(entry: &Entry) -> &'static str {
    match entry {
        Entry::Definition(_) => "definition",
        Entry::Alias { .. } => "alias",
    }
}
