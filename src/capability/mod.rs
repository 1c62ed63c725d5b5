//! Backend availability checks.
//!
//! # Responsibilities
//! - Name the optional backends a configuration may select
//! - Record which of them are installed in this build
//! - Answer "is this backend available?" without side effects
//!
//! # Design Decisions
//! - Availability is registered once at startup, then only read
//! - Built-ins with no optional dependency (file caches, YAML driver) are
//!   never probed
//! - Compiled-in features seed the set; hosts may adjust it explicitly

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

/// An optional backend whose library support may be absent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Backend {
    JsonApiAdapter,
    RedisCache,
    MongoDbPersister,
    ElasticSearchClient,
}

impl Backend {
    pub const ALL: [Backend; 4] = [
        Backend::JsonApiAdapter,
        Backend::RedisCache,
        Backend::MongoDbPersister,
        Backend::ElasticSearchClient,
    ];

    /// Library symbol that must be resolvable for the backend to work.
    pub fn symbol(self) -> &'static str {
        match self {
            Backend::JsonApiAdapter => "modlr::api::jsonapiorg::Adapter",
            Backend::RedisCache => "modlr::metadata::cache::RedisCache",
            Backend::MongoDbPersister => "modlr::persister::mongodb::Persister",
            Backend::ElasticSearchClient => "modlr::search::elastic::Client",
        }
    }

    /// Short identifier, as accepted on the command line.
    pub fn as_str(self) -> &'static str {
        match self {
            Backend::JsonApiAdapter => "jsonapi",
            Backend::RedisCache => "redis-cache",
            Backend::MongoDbPersister => "mongodb",
            Backend::ElasticSearchClient => "elastic",
        }
    }

    fn compiled_in(self) -> bool {
        match self {
            Backend::JsonApiAdapter => cfg!(feature = "jsonapi"),
            Backend::RedisCache => cfg!(feature = "redis-cache"),
            Backend::MongoDbPersister => cfg!(feature = "mongodb"),
            Backend::ElasticSearchClient => cfg!(feature = "elastic"),
        }
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Backend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Backend::ALL
            .into_iter()
            .find(|backend| backend.as_str() == s)
            .ok_or_else(|| {
                let known: Vec<_> = Backend::ALL.iter().map(|b| b.as_str()).collect();
                format!("unknown backend \"{s}\" (expected one of: {})", known.join(", "))
            })
    }
}

/// The set of optional backends available to this process.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Capabilities {
    available: HashSet<Backend>,
}

impl Capabilities {
    /// Register every backend compiled into this build.
    pub fn detect() -> Self {
        let mut capabilities = Self::none();
        for backend in Backend::ALL.into_iter().filter(|b| b.compiled_in()) {
            capabilities.register(backend);
        }
        tracing::debug!(available = ?capabilities.sorted(), "Backend capabilities detected");
        capabilities
    }

    /// No optional backend available.
    pub fn none() -> Self {
        Self::default()
    }

    /// Every optional backend available.
    pub fn all() -> Self {
        Self {
            available: Backend::ALL.into_iter().collect(),
        }
    }

    pub fn register(&mut self, backend: Backend) -> &mut Self {
        self.available.insert(backend);
        self
    }

    pub fn unregister(&mut self, backend: Backend) -> &mut Self {
        self.available.remove(&backend);
        self
    }

    pub fn is_available(&self, backend: Backend) -> bool {
        self.available.contains(&backend)
    }

    fn sorted(&self) -> Vec<Backend> {
        let mut backends: Vec<_> = self.available.iter().copied().collect();
        backends.sort();
        backends
    }
}
