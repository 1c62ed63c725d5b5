//! Raw configuration schema.
//!
//! This module defines the shape of the user-supplied configuration exactly
//! as written. Nothing here is validated beyond what serde enforces (known
//! keys, value shapes); see `validation.rs` for the semantic rules.

use std::fmt;

use indexmap::IndexMap;
use serde::de::{self, MapAccess, Visitor};
use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Free-form `parameters` mapping of a selectable section.
pub type Parameters = IndexMap<String, Value>;

/// Root of the user-supplied configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawConfig {
    /// API adapter selection (required).
    #[serde(default)]
    pub adapter: Option<RawSelector>,

    /// Metadata drivers and cache.
    #[serde(default)]
    pub metadata: RawMetadata,

    /// Persisters keyed by caller-chosen name (required, may be empty).
    #[serde(default)]
    pub persisters: Option<IndexMap<String, RawSelector>>,

    /// REST settings.
    #[serde(default)]
    pub rest: RawRest,

    /// Search clients keyed by caller-chosen name (required, may be empty).
    #[serde(default)]
    pub search_clients: Option<IndexMap<String, RawSelector>>,
}

impl RawConfig {
    /// Deserialize from an already-parsed JSON value.
    pub fn from_value(value: Value) -> Result<Self, serde_json::Error> {
        serde_json::from_value(value)
    }
}

/// A section choosing between a built-in `type` and a custom `service`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawSelector {
    /// `None` when the key is absent, `Some(None)` for an explicit `null`.
    #[serde(rename = "type", default, deserialize_with = "explicit")]
    pub kind: Option<Option<String>>,

    #[serde(default)]
    pub service: Option<String>,

    #[serde(default)]
    pub parameters: Parameters,
}

/// The `metadata` section.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawMetadata {
    /// Drivers keyed by name; absent means a single `default` YAML driver.
    #[serde(default)]
    pub drivers: Option<IndexMap<String, RawSelector>>,

    #[serde(default)]
    pub cache: RawCacheSetting,
}

/// `metadata.cache` as a toggle (`cache = false`) or a full mapping.
#[derive(Debug, Clone)]
pub enum RawCacheSetting {
    Toggle(bool),
    Section(RawCache),
}

impl<'de> Deserialize<'de> for RawCacheSetting {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct SettingVisitor;

        impl<'de> Visitor<'de> for SettingVisitor {
            type Value = RawCacheSetting;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a boolean or a cache mapping")
            }

            fn visit_bool<E: de::Error>(self, enabled: bool) -> Result<Self::Value, E> {
                Ok(RawCacheSetting::Toggle(enabled))
            }

            // Errors inside the mapping (unknown key, wrong value type) surface as-is.
            fn visit_map<A: MapAccess<'de>>(self, map: A) -> Result<Self::Value, A::Error> {
                RawCache::deserialize(de::value::MapAccessDeserializer::new(map))
                    .map(RawCacheSetting::Section)
            }
        }

        deserializer.deserialize_any(SettingVisitor)
    }
}

impl Default for RawCacheSetting {
    fn default() -> Self {
        RawCacheSetting::Section(RawCache::default())
    }
}

/// Full `metadata.cache` mapping.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawCache {
    /// Defaults to enabled.
    #[serde(default)]
    pub enabled: Option<bool>,

    #[serde(rename = "type", default, deserialize_with = "explicit")]
    pub kind: Option<Option<String>>,

    #[serde(default)]
    pub service: Option<String>,

    #[serde(default)]
    pub parameters: Parameters,
}

/// The `rest` section.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawRest {
    #[serde(default)]
    pub root_endpoint: Option<String>,
}

/// Keep an explicit `null` distinguishable from an absent key.
fn explicit<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}
