//! Schema validation through the public API.

use modlr_bootstrap::config::{CacheSection, Selection, ValidationErrorKind};
use modlr_bootstrap::registry::ServiceName;
use modlr_bootstrap::{load_config, Backend, Capabilities, ConfigError};
use serde_json::{json, Value};

mod common;

fn with(section: &str, value: Value) -> Value {
    let mut config = common::minimal_config();
    config[section] = value;
    config
}

#[test]
fn test_selectors_are_exclusive_in_keyed_sections() {
    for section in ["persisters", "search_clients"] {
        let both = with(section, json!({ "x": { "type": "elastic", "service": "svc" } }));
        let err = common::validate(both, &Capabilities::all()).unwrap_err();
        assert_eq!(err.kind, ValidationErrorKind::ConflictingSelector);
        assert_eq!(err.path, format!("modlr.{section}.x"));

        let neither = with(section, json!({ "x": { "parameters": { "host": "h" } } }));
        let err = common::validate(neither, &Capabilities::all()).unwrap_err();
        assert_eq!(err.kind, ValidationErrorKind::MissingSelector);
    }
}

#[test]
fn test_first_violation_wins() {
    let config = json!({
        "adapter": { "type": "jsonapiorg", "service": "dup" },
        "persisters": { "main": {} },
        "search_clients": {},
    });
    let err = common::validate(config, &Capabilities::all()).unwrap_err();
    assert_eq!(err.path, "modlr.adapter");
}

#[test]
fn test_redis_handler_requirement() {
    let missing = with("metadata", json!({ "cache": { "type": "redis", "parameters": {} } }));
    let err = common::validate(missing, &Capabilities::all()).unwrap_err();
    assert_eq!(err.kind, ValidationErrorKind::MissingRequiredParameter);

    let present = with("metadata", json!({ "cache": { "type": "redis", "parameters": { "handler": "redis" } } }));
    assert!(common::validate(present, &Capabilities::all()).is_ok());
}

#[test]
fn test_custom_service_bypasses_backend_checks() {
    let mut config = with("persisters", json!({ "main": { "service": "@my_custom_persister" } }));
    config["adapter"] = json!({ "service": "@app.adapter" });
    let result = common::validate(config, &Capabilities::none());
    if let Err(err) = &result {
        assert_ne!(err.kind, ValidationErrorKind::BackendUnavailable, "{err:?}");
    }
    let tree = result.unwrap();
    assert_eq!(
        tree.persisters["main"],
        Selection::Service(ServiceName::clean("my_custom_persister"))
    );
}

#[test]
fn test_without_backend_rejects_builtin() {
    let mut caps = Capabilities::detect();
    caps.unregister(Backend::JsonApiAdapter);
    let err = common::validate(common::minimal_config(), &caps).unwrap_err();
    assert_eq!(err.kind, ValidationErrorKind::BackendUnavailable);
    assert_eq!(err.path, "modlr.adapter.type");
}

#[test]
fn test_toml_file_with_cache_toggle() {
    let dir = tempfile::tempdir().unwrap();
    let path = common::write_config(
        dir.path(),
        "modlr.toml",
        r#"
            [adapter]
            type = "jsonapiorg"

            [metadata]
            cache = false

            [rest]
            root_endpoint = "/modlr/api/"

            [persisters]
            [search_clients]
        "#,
    );

    let tree = load_config(&path, &Capabilities::all()).unwrap();
    assert_eq!(tree.metadata.cache, CacheSection::Disabled);
    assert_eq!(tree.rest.root_endpoint, "modlr/api");
}

#[test]
fn test_json_file_validation_error_carries_path() {
    let dir = tempfile::tempdir().unwrap();
    let path = common::write_config(
        dir.path(),
        "modlr.json",
        r#"{ "adapter": { "type": "jsonapiorg" }, "persisters": { "main": { "type": "mongodb" } }, "search_clients": {} }"#,
    );

    match load_config(&path, &Capabilities::all()) {
        Err(ConfigError::Validation(err)) => {
            assert_eq!(err.kind, ValidationErrorKind::MissingRequiredParameter);
            assert_eq!(err.path, "modlr.persisters.main.parameters.host");
        }
        other => panic!("expected validation error, got {other:?}"),
    }
}

#[test]
fn test_unsupported_extension() {
    let dir = tempfile::tempdir().unwrap();
    let path = common::write_config(dir.path(), "modlr.yml", "adapter: {}");
    assert!(matches!(
        load_config(&path, &Capabilities::all()),
        Err(ConfigError::UnsupportedFormat(_))
    ));
}
