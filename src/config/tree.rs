//! Validated configuration tree.
//!
//! Every selectable section is a [`Selection`]: either a built-in backend with
//! its typed parameters, or the name of a caller-supplied service. Once a
//! [`ConfigurationTree`] exists, all schema rules have been checked.

use std::path::PathBuf;

use indexmap::IndexMap;
use serde_json::{Map, Value};

use crate::capability::Backend;
use crate::registry::ServiceName;

/// Exactly one of "use a built-in" or "use the caller's service".
#[derive(Debug, Clone, PartialEq)]
pub enum Selection<B> {
    BuiltIn(B),
    Service(ServiceName),
}

/// Common surface of every per-subsystem backend enum.
pub trait BuiltIn {
    /// The configured `type` value.
    fn type_name(&self) -> &'static str;

    /// The optional backend this built-in depends on, if any.
    fn capability(&self) -> Option<Backend>;
}

/// API adapter backends.
#[derive(Debug, Clone, PartialEq)]
pub enum AdapterBackend {
    JsonApiOrg,
}

impl BuiltIn for AdapterBackend {
    fn type_name(&self) -> &'static str {
        match self {
            AdapterBackend::JsonApiOrg => "jsonapiorg",
        }
    }

    fn capability(&self) -> Option<Backend> {
        match self {
            AdapterBackend::JsonApiOrg => Some(Backend::JsonApiAdapter),
        }
    }
}

/// Metadata driver backends.
#[derive(Debug, Clone, PartialEq)]
pub enum DriverBackend {
    /// YAML definition files; directories are raw configured values and may
    /// be `@Bundle/...` references.
    Yml {
        model_dir: Option<String>,
        mixin_dir: Option<String>,
    },
}

impl BuiltIn for DriverBackend {
    fn type_name(&self) -> &'static str {
        match self {
            DriverBackend::Yml { .. } => "yml",
        }
    }

    fn capability(&self) -> Option<Backend> {
        None
    }
}

/// Metadata cache backends.
#[derive(Debug, Clone, PartialEq)]
pub enum CacheBackend {
    File { dir: Option<PathBuf> },
    BinaryFile { dir: Option<PathBuf> },
    Redis { handler: ServiceName },
}

impl BuiltIn for CacheBackend {
    fn type_name(&self) -> &'static str {
        match self {
            CacheBackend::File { .. } => "file",
            CacheBackend::BinaryFile { .. } => "binary_file",
            CacheBackend::Redis { .. } => "redis",
        }
    }

    fn capability(&self) -> Option<Backend> {
        match self {
            CacheBackend::Redis { .. } => Some(Backend::RedisCache),
            CacheBackend::File { .. } | CacheBackend::BinaryFile { .. } => None,
        }
    }
}

/// Persister backends.
#[derive(Debug, Clone, PartialEq)]
pub enum PersisterBackend {
    MongoDb {
        host: String,
        options: Map<String, Value>,
    },
}

impl BuiltIn for PersisterBackend {
    fn type_name(&self) -> &'static str {
        match self {
            PersisterBackend::MongoDb { .. } => "mongodb",
        }
    }

    fn capability(&self) -> Option<Backend> {
        match self {
            PersisterBackend::MongoDb { .. } => Some(Backend::MongoDbPersister),
        }
    }
}

/// Search client backends.
#[derive(Debug, Clone, PartialEq)]
pub enum SearchBackend {
    Elastic,
}

impl BuiltIn for SearchBackend {
    fn type_name(&self) -> &'static str {
        match self {
            SearchBackend::Elastic => "elastic",
        }
    }

    fn capability(&self) -> Option<Backend> {
        match self {
            SearchBackend::Elastic => Some(Backend::ElasticSearchClient),
        }
    }
}

/// `metadata.cache`: disabled sections carry no selection at all.
#[derive(Debug, Clone, PartialEq)]
pub enum CacheSection {
    Disabled,
    Enabled(Selection<CacheBackend>),
}

impl CacheSection {
    pub fn is_enabled(&self) -> bool {
        matches!(self, CacheSection::Enabled(_))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MetadataSection {
    /// Configured drivers, in configuration order.
    pub drivers: IndexMap<String, Selection<DriverBackend>>,
    pub cache: CacheSection,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RestSection {
    /// Root endpoint with leading/trailing `/` removed.
    pub root_endpoint: String,
}

/// Normalized, validated configuration. Immutable once built.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigurationTree {
    pub adapter: Selection<AdapterBackend>,
    pub metadata: MetadataSection,
    pub persisters: IndexMap<String, Selection<PersisterBackend>>,
    pub rest: RestSection,
    pub search_clients: IndexMap<String, Selection<SearchBackend>>,
}
