//! Configuration validation.
//!
//! # Responsibilities
//! - Enforce `type`/`service` exclusivity on every selectable section
//! - Restrict `type` to the values each section supports
//! - Require the parameters a built-in backend cannot work without
//! - Confirm optional backends are installed before they are selected
//! - Fill defaults and normalize values
//!
//! # Design Decisions
//! - Stops at the first violated rule; the error carries the offending path
//! - Sections are independent: no rule looks across sections
//! - Validation is a pure function: RawConfig → Result<ConfigurationTree, ValidationError>

use std::fmt;
use std::path::PathBuf;

use indexmap::IndexMap;
use serde_json::{Map, Value};
use thiserror::Error;

use crate::capability::{Backend, Capabilities};
use crate::config::schema::{Parameters, RawCacheSetting, RawConfig, RawRest, RawSelector};
use crate::config::tree::{
    AdapterBackend, CacheBackend, CacheSection, ConfigurationTree, DriverBackend,
    MetadataSection, PersisterBackend, RestSection, SearchBackend, Selection,
};
use crate::observability::metrics;
use crate::registry::id::namespaced;
use crate::registry::ServiceName;

/// Root endpoint used when `rest.root_endpoint` is not configured.
pub const DEFAULT_ROOT_ENDPOINT: &str = "modlr/api";

/// Which rule a configuration violated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValidationErrorKind {
    /// Neither `type` nor `service` set.
    MissingSelector,
    /// Both `type` and `service` set.
    ConflictingSelector,
    /// `type` outside the section's allowed values.
    UnsupportedType,
    /// A built-in backend lacks a parameter it needs.
    MissingRequiredParameter,
    /// A built-in backend's library support is not installed.
    BackendUnavailable,
    /// A required section is absent (or has no entries where one is needed).
    MissingSection,
    /// A value has the wrong shape or is empty.
    InvalidValue,
}

impl ValidationErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ValidationErrorKind::MissingSelector => "missing_selector",
            ValidationErrorKind::ConflictingSelector => "conflicting_selector",
            ValidationErrorKind::UnsupportedType => "unsupported_type",
            ValidationErrorKind::MissingRequiredParameter => "missing_required_parameter",
            ValidationErrorKind::BackendUnavailable => "backend_unavailable",
            ValidationErrorKind::MissingSection => "missing_section",
            ValidationErrorKind::InvalidValue => "invalid_value",
        }
    }
}

impl fmt::Display for ValidationErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The first configuration rule found violated.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ValidationError {
    pub kind: ValidationErrorKind,
    /// Dotted path of the offending option, e.g. `modlr.persisters.main.type`.
    pub path: String,
    pub message: String,
}

impl ValidationError {
    fn new(kind: ValidationErrorKind, path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind,
            path: path.into(),
            message: message.into(),
        }
    }
}

/// Validate and normalize a raw configuration.
pub fn validate_config(
    raw: RawConfig,
    capabilities: &Capabilities,
) -> Result<ConfigurationTree, ValidationError> {
    let result = Validator::new(capabilities).validate(raw);
    if let Err(err) = &result {
        metrics::record_validation_failure(err.kind);
        tracing::debug!(kind = %err.kind, path = %err.path, "Configuration rejected");
    }
    result
}

/// Schema validator bound to the capabilities of this process.
#[derive(Debug, Clone, Copy)]
pub struct Validator<'a> {
    capabilities: &'a Capabilities,
}

/// Result of the exclusivity rule.
enum Selector<'r> {
    Type(&'r str),
    Service(ServiceName),
}

impl<'a> Validator<'a> {
    pub fn new(capabilities: &'a Capabilities) -> Self {
        Self { capabilities }
    }

    pub fn validate(&self, raw: RawConfig) -> Result<ConfigurationTree, ValidationError> {
        let adapter = self.adapter(raw.adapter)?;
        let metadata = MetadataSection {
            drivers: self.drivers(raw.metadata.drivers)?,
            cache: self.cache(raw.metadata.cache)?,
        };
        let persisters = self.persisters(raw.persisters)?;
        let rest = rest(raw.rest)?;
        let search_clients = self.search_clients(raw.search_clients)?;

        Ok(ConfigurationTree {
            adapter,
            metadata,
            persisters,
            rest,
            search_clients,
        })
    }

    fn adapter(&self, raw: Option<RawSelector>) -> Result<Selection<AdapterBackend>, ValidationError> {
        let path = namespaced("adapter");
        let raw = raw.ok_or_else(|| missing_section(&path))?;
        let kind = effective_kind(&raw.kind, raw.service.as_deref(), None);

        self.select(&path, kind, raw.service.as_deref(), &raw.parameters, |kind, _| match kind {
            "jsonapiorg" => {
                self.require(Backend::JsonApiAdapter, &path)?;
                Ok(AdapterBackend::JsonApiOrg)
            }
            other => Err(unsupported(&path, other, &["jsonapiorg"])),
        })
    }

    fn drivers(
        &self,
        raw: Option<IndexMap<String, RawSelector>>,
    ) -> Result<IndexMap<String, Selection<DriverBackend>>, ValidationError> {
        let section = namespaced("metadata.drivers");
        let raw = raw.unwrap_or_else(default_drivers);
        if raw.is_empty() {
            return Err(ValidationError::new(
                ValidationErrorKind::MissingSection,
                &section,
                format!("At least one metadata driver must be configured for \"{section}\""),
            ));
        }

        raw.into_iter()
            .map(|(name, driver)| {
                let path = format!("{section}.{name}");
                let kind = effective_kind(&driver.kind, driver.service.as_deref(), Some("yml"));
                let selection =
                    self.select(&path, kind, driver.service.as_deref(), &driver.parameters, |kind, params| {
                        match kind {
                            "yml" => Ok(DriverBackend::Yml {
                                model_dir: optional_str(params, "model_dir", &path)?,
                                mixin_dir: optional_str(params, "mixin_dir", &path)?,
                            }),
                            other => Err(unsupported(&path, other, &["yml"])),
                        }
                    })?;
                Ok((name, selection))
            })
            .collect()
    }

    fn cache(&self, raw: RawCacheSetting) -> Result<CacheSection, ValidationError> {
        let path = namespaced("metadata.cache");
        let raw = match raw {
            RawCacheSetting::Toggle(false) => return Ok(CacheSection::Disabled),
            RawCacheSetting::Toggle(true) => Default::default(),
            RawCacheSetting::Section(cache) => cache,
        };
        if raw.enabled == Some(false) {
            return Ok(CacheSection::Disabled);
        }

        let kind = effective_kind(&raw.kind, raw.service.as_deref(), Some("file"));
        self.select(&path, kind, raw.service.as_deref(), &raw.parameters, |kind, params| match kind {
            "file" => Ok(CacheBackend::File {
                dir: optional_str(params, "dir", &path)?.map(PathBuf::from),
            }),
            "binary_file" => Ok(CacheBackend::BinaryFile {
                dir: optional_str(params, "dir", &path)?.map(PathBuf::from),
            }),
            "redis" => {
                self.require(Backend::RedisCache, &path)?;
                let handler = required_str(
                    params,
                    "handler",
                    &path,
                    format!("A Redis handler service name must be defined for \"{path}.parameters.handler\""),
                )?;
                Ok(CacheBackend::Redis {
                    handler: ServiceName::clean(&handler),
                })
            }
            other => Err(unsupported(&path, other, &["file", "binary_file", "redis"])),
        })
        .map(CacheSection::Enabled)
    }

    fn persisters(
        &self,
        raw: Option<IndexMap<String, RawSelector>>,
    ) -> Result<IndexMap<String, Selection<PersisterBackend>>, ValidationError> {
        let section = namespaced("persisters");
        let raw = raw.ok_or_else(|| missing_section(&section))?;

        raw.into_iter()
            .map(|(name, persister)| {
                let path = format!("{section}.{name}");
                let kind = effective_kind(&persister.kind, persister.service.as_deref(), None);
                let selection = self.select(
                    &path,
                    kind,
                    persister.service.as_deref(),
                    &persister.parameters,
                    |kind, params| match kind {
                        "mongodb" => {
                            self.require(Backend::MongoDbPersister, &path)?;
                            let host = required_str(
                                params,
                                "host",
                                &path,
                                format!("The MongoDB persister requires a value for \"{path}.parameters.host\""),
                            )?;
                            Ok(PersisterBackend::MongoDb {
                                host,
                                options: optional_map(params, "options", &path)?,
                            })
                        }
                        other => Err(unsupported(&path, other, &["mongodb"])),
                    },
                )?;
                Ok((name, selection))
            })
            .collect()
    }

    fn search_clients(
        &self,
        raw: Option<IndexMap<String, RawSelector>>,
    ) -> Result<IndexMap<String, Selection<SearchBackend>>, ValidationError> {
        let section = namespaced("search_clients");
        let raw = raw.ok_or_else(|| missing_section(&section))?;

        raw.into_iter()
            .map(|(name, client)| {
                let path = format!("{section}.{name}");
                let kind = effective_kind(&client.kind, client.service.as_deref(), None);
                let selection =
                    self.select(&path, kind, client.service.as_deref(), &client.parameters, |kind, _| {
                        match kind {
                            "elastic" => {
                                self.require(Backend::ElasticSearchClient, &path)?;
                                Ok(SearchBackend::Elastic)
                            }
                            other => Err(unsupported(&path, other, &["elastic"])),
                        }
                    })?;
                Ok((name, selection))
            })
            .collect()
    }

    /// Apply exclusivity, then hand a chosen `type` to `build`.
    fn select<B>(
        &self,
        path: &str,
        kind: Option<&str>,
        service: Option<&str>,
        parameters: &Parameters,
        build: impl FnOnce(&str, &Parameters) -> Result<B, ValidationError>,
    ) -> Result<Selection<B>, ValidationError> {
        match selector(path, kind, service)? {
            Selector::Service(name) => Ok(Selection::Service(name)),
            Selector::Type(kind) => build(kind, parameters).map(Selection::BuiltIn),
        }
    }

    fn require(&self, backend: Backend, path: &str) -> Result<(), ValidationError> {
        if self.capabilities.is_available(backend) {
            return Ok(());
        }
        Err(ValidationError::new(
            ValidationErrorKind::BackendUnavailable,
            format!("{path}.type"),
            format!(
                "The library backend \"{}\" was not found for \"{path}.type\" - was the library installed?",
                backend.symbol()
            ),
        ))
    }
}

fn rest(raw: RawRest) -> Result<RestSection, ValidationError> {
    let path = namespaced("rest.root_endpoint");
    let root_endpoint = match raw.root_endpoint {
        None => DEFAULT_ROOT_ENDPOINT.to_string(),
        Some(endpoint) if endpoint.is_empty() => return Err(empty_value(&path)),
        Some(endpoint) => endpoint.trim_matches('/').to_string(),
    };
    Ok(RestSection { root_endpoint })
}

/// `type` after defaulting. A default applies only when the key is absent
/// and no `service` is given; an explicit `null` never defaults.
fn effective_kind<'r>(
    kind: &'r Option<Option<String>>,
    service: Option<&str>,
    default: Option<&'static str>,
) -> Option<&'r str> {
    match kind {
        None if service.is_none() => default,
        None => None,
        Some(inner) => inner.as_deref(),
    }
}

fn selector<'r>(
    path: &str,
    kind: Option<&'r str>,
    service: Option<&'r str>,
) -> Result<Selector<'r>, ValidationError> {
    if service == Some("") {
        return Err(empty_value(&format!("{path}.service")));
    }
    match (kind, service) {
        (Some(_), Some(_)) => Err(ValidationError::new(
            ValidationErrorKind::ConflictingSelector,
            path,
            format!("You cannot set both \"type\" and \"service\" for \"{path}\" - please choose one."),
        )),
        (None, None) => Err(ValidationError::new(
            ValidationErrorKind::MissingSelector,
            path,
            format!("You must set one of \"type\" or \"service\" for \"{path}\""),
        )),
        (Some(kind), None) => Ok(Selector::Type(kind)),
        (None, Some(service)) => Ok(Selector::Service(ServiceName::clean(service))),
    }
}

fn default_drivers() -> IndexMap<String, RawSelector> {
    let driver = RawSelector {
        kind: Some(Some("yml".to_string())),
        ..Default::default()
    };
    IndexMap::from([("default".to_string(), driver)])
}

fn required_str(
    params: &Parameters,
    key: &str,
    path: &str,
    message: String,
) -> Result<String, ValidationError> {
    let param_path = format!("{path}.parameters.{key}");
    match params.get(key) {
        None | Some(Value::Null) => Err(ValidationError::new(
            ValidationErrorKind::MissingRequiredParameter,
            param_path,
            message,
        )),
        Some(Value::String(value)) if !value.is_empty() => Ok(value.clone()),
        Some(_) => Err(not_a_string(&param_path)),
    }
}

fn optional_str(params: &Parameters, key: &str, path: &str) -> Result<Option<String>, ValidationError> {
    match params.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(value)) if !value.is_empty() => Ok(Some(value.clone())),
        Some(_) => Err(not_a_string(&format!("{path}.parameters.{key}"))),
    }
}

fn optional_map(
    params: &Parameters,
    key: &str,
    path: &str,
) -> Result<Map<String, Value>, ValidationError> {
    match params.get(key) {
        None | Some(Value::Null) => Ok(Map::new()),
        Some(Value::Object(map)) => Ok(map.clone()),
        Some(_) => Err(ValidationError::new(
            ValidationErrorKind::InvalidValue,
            format!("{path}.parameters.{key}"),
            format!("Expected a mapping for \"{path}.parameters.{key}\""),
        )),
    }
}

fn missing_section(path: &str) -> ValidationError {
    ValidationError::new(
        ValidationErrorKind::MissingSection,
        path,
        format!("The child node \"{path}\" must be configured."),
    )
}

fn unsupported(path: &str, kind: &str, allowed: &[&str]) -> ValidationError {
    let allowed: Vec<_> = allowed.iter().map(|v| format!("\"{v}\"")).collect();
    ValidationError::new(
        ValidationErrorKind::UnsupportedType,
        format!("{path}.type"),
        format!(
            "The value \"{kind}\" is not allowed for path \"{path}.type\". Permissible values: {}",
            allowed.join(", ")
        ),
    )
}

fn empty_value(path: &str) -> ValidationError {
    ValidationError::new(
        ValidationErrorKind::InvalidValue,
        path,
        format!("The path \"{path}\" cannot contain an empty value."),
    )
}

fn not_a_string(path: &str) -> ValidationError {
    ValidationError::new(
        ValidationErrorKind::InvalidValue,
        path,
        format!("Expected a non-empty string for \"{path}\""),
    )
}
