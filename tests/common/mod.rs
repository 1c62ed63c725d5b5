//! Shared fixtures for integration tests.

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use modlr_bootstrap::config::RawConfig;
use modlr_bootstrap::{
    assemble, validate_config, AssemblyError, Capabilities, ConfigurationTree, HostEnvironment,
    LoadContext, ServiceRegistry, ValidationError,
};
use serde_json::{json, Value};

/// The smallest configuration that validates.
pub fn minimal_config() -> Value {
    json!({
        "adapter": { "type": "jsonapiorg" },
        "persisters": {},
        "search_clients": {},
    })
}

/// A configuration touching every built-in backend.
pub fn full_config() -> Value {
    json!({
        "adapter": { "type": "jsonapiorg" },
        "metadata": {
            "drivers": { "default": { "type": "yml" } },
            "cache": { "type": "redis", "parameters": { "handler": "@app.redis" } },
        },
        "persisters": {
            "default": {
                "type": "mongodb",
                "parameters": { "host": "mongodb://localhost:27017", "options": { "connect": true } },
            },
        },
        "rest": { "root_endpoint": "/modlr/api/" },
        "search_clients": { "default": { "type": "elastic" } },
    })
}

pub fn validate(value: Value, capabilities: &Capabilities) -> Result<ConfigurationTree, ValidationError> {
    let raw = RawConfig::from_value(value).expect("fixture must match the raw schema");
    validate_config(raw, capabilities)
}

/// Host rooted in `root`, with one bundle named `AppBundle`.
pub fn host_in(root: &Path) -> HostEnvironment {
    HostEnvironment::new(root.join("var/cache"), root.join("app"))
        .with_bundle("AppBundle", root.join("src/AppBundle"))
}

/// Validate and assemble against a seeded registry.
pub fn assemble_value(
    value: Value,
    host: &HostEnvironment,
    capabilities: &Capabilities,
) -> Result<ServiceRegistry, AssemblyError> {
    let tree = validate(value, capabilities).expect("fixture must validate");
    let registry = host.seed_registry().expect("fresh registry");
    assemble(&tree, LoadContext::new(host, capabilities), registry)
}

pub fn write_config(dir: &Path, name: &str, content: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, content).expect("write config fixture");
    path
}
