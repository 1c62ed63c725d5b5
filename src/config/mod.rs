//! Configuration subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML/JSON) or serde_json::Value
//!     → loader.rs (parse)
//!     → schema.rs (RawConfig, unknown keys rejected)
//!     → validation.rs (selector, type, parameter and backend rules)
//!     → tree.rs (ConfigurationTree, validated, immutable)
//!     → lifecycle pipeline
//!
//! On change (CLI `watch`):
//!     watcher.rs detects change
//!     → loader.rs loads and validates again
//!     → valid trees are sent over a channel
//! ```
//!
//! # Design Decisions
//! - A tree is immutable once validated; changes require a full reload
//! - Sections with defaults may be omitted from the input entirely
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod tree;
pub mod validation;
pub mod watcher;

pub use loader::{load_config, ConfigError};
pub use schema::RawConfig;
pub use tree::{
    AdapterBackend, BuiltIn, CacheBackend, CacheSection, ConfigurationTree, DriverBackend,
    MetadataSection, PersisterBackend, RestSection, SearchBackend, Selection,
};
pub use validation::{validate_config, ValidationError, ValidationErrorKind};
