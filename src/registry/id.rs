//! Logical service names.
//!
//! Every name the assembler registers is a [`ServiceId`] variant, so a typo in
//! a dependency is a compile error rather than a dangling string key. Names the
//! host provides (custom overrides, Redis handlers) travel as
//! [`ServiceId::External`] and are trusted as-is.

use std::fmt;

use serde::{Serialize, Serializer};

/// Fixed namespace for every name registered by the assembler.
pub const PREFIX: &str = "modlr";

/// Prefix a bare name with the assembler namespace.
pub fn namespaced(name: &str) -> String {
    format!("{PREFIX}.{name}")
}

/// A caller-supplied service name with every `@` removed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ServiceName(String);

impl ServiceName {
    /// Sanitize a raw name (`"@my_service"` becomes `my_service`).
    pub fn clean(raw: &str) -> Self {
        Self(raw.replace('@', ""))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ServiceName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Serialize for ServiceName {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

/// Key of a registry entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ServiceId {
    MetadataCache,
    MetadataCacheWarmer,
    BundleCacheWarmer,
    CacheClearCommand,
    /// A configured metadata driver, by its configured name.
    MetadataDriver(String),
    /// Private file locator backing a YAML driver.
    DriverFileLocator(String),
    DefaultDriver,
    MetadataFactory,
    StorageManager,
    Store,
    EntityUtility,
    ValidatorUtility,
    Persister(String),
    PersisterMetadata(String),
    PersisterConnection(String),
    RestConfiguration,
    ApiSerializer,
    ApiNormalizer,
    ApiAdapter,
    RestKernel,
    SearchClient(String),
    SearchClientMetadata(String),
    /// A service owned by the host container.
    External(ServiceName),
}

impl ServiceId {
    pub fn is_external(&self) -> bool {
        matches!(self, ServiceId::External(_))
    }
}

impl fmt::Display for ServiceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ServiceId::MetadataCache => write!(f, "{PREFIX}.metadata.cache"),
            ServiceId::MetadataCacheWarmer => write!(f, "{PREFIX}.metadata.cache.warmer"),
            ServiceId::BundleCacheWarmer => write!(f, "{PREFIX}.bundle.cache.warmer"),
            ServiceId::CacheClearCommand => write!(f, "{PREFIX}.metadata.cache.clear_command"),
            ServiceId::MetadataDriver(name) => write!(f, "{PREFIX}.metadata.driver.{name}"),
            ServiceId::DriverFileLocator(name) => {
                write!(f, "{PREFIX}.metadata.driver.{name}.file_locator")
            }
            ServiceId::DefaultDriver => write!(f, "{PREFIX}.metadata.default_driver"),
            ServiceId::MetadataFactory => write!(f, "{PREFIX}.metadata.factory"),
            ServiceId::StorageManager => write!(f, "{PREFIX}.storage_manager"),
            ServiceId::Store => write!(f, "{PREFIX}.store"),
            ServiceId::EntityUtility => write!(f, "{PREFIX}.util.entity"),
            ServiceId::ValidatorUtility => write!(f, "{PREFIX}.util.validator"),
            ServiceId::Persister(name) => write!(f, "{PREFIX}.persister.{name}"),
            ServiceId::PersisterMetadata(name) => write!(f, "{PREFIX}.persister.{name}.metadata"),
            ServiceId::PersisterConnection(name) => {
                write!(f, "{PREFIX}.persister.{name}.connection")
            }
            ServiceId::RestConfiguration => write!(f, "{PREFIX}.rest.configuration"),
            ServiceId::ApiSerializer => write!(f, "{PREFIX}.api.serializer"),
            ServiceId::ApiNormalizer => write!(f, "{PREFIX}.api.normalizer"),
            ServiceId::ApiAdapter => write!(f, "{PREFIX}.api.adapter"),
            ServiceId::RestKernel => write!(f, "{PREFIX}.rest.kernel"),
            ServiceId::SearchClient(name) => write!(f, "{PREFIX}.search_client.{name}"),
            ServiceId::SearchClientMetadata(name) => {
                write!(f, "{PREFIX}.search_client.{name}.metadata")
            }
            ServiceId::External(name) => write!(f, "{name}"),
        }
    }
}

impl Serialize for ServiceId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}
