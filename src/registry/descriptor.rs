//! Declarative service recipes.
//!
//! A [`ServiceDescriptor`] says which component to build and with which
//! arguments; it never constructs anything itself. The host container turns
//! descriptors into instances.

use serde::{Serialize, Serializer};
use serde_json::Value;

use crate::registry::id::ServiceId;

/// Built-in component a descriptor instantiates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Implementation {
    // Metadata
    FileCache,
    BinaryFileCache,
    RedisCache,
    CacheWarmer,
    BundleMetadataWarmer,
    ClearCacheCommand,
    FileLocator,
    YamlFileDriver,
    MetadataFactory,

    // Host-owned collaborators
    StorageManager,
    Store,
    EntityUtility,
    Validator,

    // Persistence
    MongoDbStorageMetadataFactory,
    MongoDbConnection,
    MongoDbPersister,

    // REST
    RestConfiguration,
    JsonApiSerializer,
    JsonApiNormalizer,
    JsonApiAdapter,
    RestKernel,

    // Search
    ElasticStorageMetadataFactory,
    ElasticClient,
}

impl Implementation {
    /// Fully qualified component path.
    pub fn path(self) -> &'static str {
        match self {
            Implementation::FileCache => "modlr::metadata::cache::FileCache",
            Implementation::BinaryFileCache => "modlr::metadata::cache::BinaryFileCache",
            Implementation::RedisCache => "modlr::metadata::cache::RedisCache",
            Implementation::CacheWarmer => "modlr::metadata::cache::CacheWarmer",
            Implementation::BundleMetadataWarmer => "modlr_bootstrap::hooks::MetadataWarmer",
            Implementation::ClearCacheCommand => "modlr::metadata::cache::ClearCacheCommand",
            Implementation::FileLocator => "modlr::metadata::driver::FileLocator",
            Implementation::YamlFileDriver => "modlr::metadata::driver::YamlFileDriver",
            Implementation::MetadataFactory => "modlr::metadata::MetadataFactory",
            Implementation::StorageManager => "modlr::storage::StorageManager",
            Implementation::Store => "modlr::store::Store",
            Implementation::EntityUtility => "modlr::util::EntityUtility",
            Implementation::Validator => "modlr::util::Validator",
            Implementation::MongoDbStorageMetadataFactory => {
                "modlr::persister::mongodb::StorageMetadataFactory"
            }
            Implementation::MongoDbConnection => "modlr::persister::mongodb::Connection",
            Implementation::MongoDbPersister => "modlr::persister::mongodb::Persister",
            Implementation::RestConfiguration => "modlr::rest::RestConfiguration",
            Implementation::JsonApiSerializer => "modlr::api::jsonapiorg::Serializer",
            Implementation::JsonApiNormalizer => "modlr::api::jsonapiorg::Normalizer",
            Implementation::JsonApiAdapter => "modlr::api::jsonapiorg::Adapter",
            Implementation::RestKernel => "modlr::rest::RestKernel",
            Implementation::ElasticStorageMetadataFactory => {
                "modlr::search::elastic::StorageMetadataFactory"
            }
            Implementation::ElasticClient => "modlr::search::elastic::Client",
        }
    }
}

impl Serialize for Implementation {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.path())
    }
}

/// One constructor or method-call argument.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Argument {
    Literal(Value),
    Reference(ServiceId),
    Inline(Box<ServiceDescriptor>),
}

impl Argument {
    pub fn literal(value: impl Into<Value>) -> Self {
        Argument::Literal(value.into())
    }
}

/// A setter-style call applied after construction.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MethodCall {
    pub method: &'static str,
    pub arguments: Vec<Argument>,
}

impl MethodCall {
    pub fn new(method: &'static str, arguments: Vec<Argument>) -> Self {
        Self { method, arguments }
    }
}

/// Recipe for a single service instance.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ServiceDescriptor {
    pub implementation: Implementation,
    pub arguments: Vec<Argument>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub calls: Vec<MethodCall>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<&'static str>,
    /// Whether the host may fetch the service directly by name.
    pub public: bool,
}

impl ServiceDescriptor {
    pub fn new(implementation: Implementation) -> Self {
        Self {
            implementation,
            arguments: Vec::new(),
            calls: Vec::new(),
            tags: Vec::new(),
            public: true,
        }
    }

    pub fn argument(mut self, argument: Argument) -> Self {
        self.arguments.push(argument);
        self
    }

    pub fn reference(self, id: ServiceId) -> Self {
        self.argument(Argument::Reference(id))
    }

    pub fn literal(self, value: impl Into<Value>) -> Self {
        self.argument(Argument::literal(value))
    }

    pub fn call(mut self, call: MethodCall) -> Self {
        self.calls.push(call);
        self
    }

    pub fn tag(mut self, tag: &'static str) -> Self {
        self.tags.push(tag);
        self
    }

    pub fn private(mut self) -> Self {
        self.public = false;
        self
    }

    /// Every service referenced by this descriptor, including references made
    /// by method calls and inline descriptors.
    pub fn references(&self) -> Vec<&ServiceId> {
        let mut found = Vec::new();
        let arguments = self
            .arguments
            .iter()
            .chain(self.calls.iter().flat_map(|call| call.arguments.iter()));
        for argument in arguments {
            match argument {
                Argument::Literal(_) => {}
                Argument::Reference(id) => found.push(id),
                Argument::Inline(inner) => found.extend(inner.references()),
            }
        }
        found
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::id::ServiceName;

    #[test]
    fn test_builder_defaults_to_public() {
        let descriptor = ServiceDescriptor::new(Implementation::RestKernel);
        assert!(descriptor.public);
        assert!(!descriptor.private().public);
    }

    #[test]
    fn test_references_walk_calls_and_inline_descriptors() {
        let inner = ServiceDescriptor::new(Implementation::Validator)
            .reference(ServiceId::External(ServiceName::clean("translator")));
        let descriptor = ServiceDescriptor::new(Implementation::MetadataFactory)
            .reference(ServiceId::DefaultDriver)
            .literal("unused")
            .argument(Argument::Inline(Box::new(inner)))
            .call(MethodCall::new(
                "setCache",
                vec![Argument::Reference(ServiceId::MetadataCache)],
            ));

        let refs: Vec<String> = descriptor.references().iter().map(|id| id.to_string()).collect();
        assert_eq!(
            refs,
            vec![
                "modlr.metadata.default_driver",
                "translator",
                "modlr.metadata.cache",
            ]
        );
    }

    #[test]
    fn test_serializes_paths_and_tagged_arguments() {
        let descriptor = ServiceDescriptor::new(Implementation::FileCache)
            .literal("/tmp/modlr")
            .tag("kernel.cache_warmer")
            .private();
        let json = serde_json::to_value(&descriptor).unwrap();
        assert_eq!(json["implementation"], "modlr::metadata::cache::FileCache");
        assert_eq!(json["arguments"][0]["kind"], "literal");
        assert_eq!(json["arguments"][0]["value"], "/tmp/modlr");
        assert_eq!(json["tags"][0], "kernel.cache_warmer");
        assert_eq!(json["public"], false);
        assert!(json.get("calls").is_none());
    }
}
