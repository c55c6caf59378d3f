//! Tests that exercise the crate's public re-exports.

use std::sync::Arc;

use rstest::rstest;
use serde_json::{Map, json};

use courier_config::Config;
use ortho_config::OrthoConfig;

use crate::{
    DispatchError, Gateway, GatewayError, HandlerRegistry, LOGLINE_FILTER, MessageCatalog,
    Request, ResponseEnvelope, bootstrap_with,
};

use super::support::{
    FailingConfigLoader, RecordingSink, TEST_SECRET, TestConfigLoader, standard_registry,
    test_config,
};

#[rstest]
fn bootstrap_with_reexport_assembles_gateway() {
    let sink = Arc::new(RecordingSink::default());
    let gateway = bootstrap_with(&TestConfigLoader, standard_registry(), sink)
        .expect("bootstrap should succeed");

    assert_eq!(gateway.config(), &test_config());
    assert_eq!(gateway.plugin_name(), "courier");
    assert_eq!(gateway.logline_filter(), LOGLINE_FILTER);
}

#[rstest]
fn bootstrap_reports_configuration_failures() {
    let sink = Arc::new(RecordingSink::default());
    let result = bootstrap_with(&FailingConfigLoader, HandlerRegistry::new(), sink);
    assert!(matches!(result, Err(GatewayError::Configuration { .. })));
}

#[rstest]
fn gateway_requires_a_token_secret() {
    let sink = Arc::new(RecordingSink::default());
    let result = Gateway::new(Config::default(), HandlerRegistry::new(), sink);
    assert!(matches!(result, Err(GatewayError::Token { .. })));
}

#[rstest]
fn issued_tokens_authenticate_dispatch() {
    let sink = Arc::new(RecordingSink::default());
    let gateway =
        Gateway::new(test_config(), standard_registry(), sink).expect("gateway should assemble");

    let mut payload = Map::new();
    payload.insert(String::from("id"), json!(7));
    let request = Request::new("echo", payload, gateway.issue_token());
    let envelope = gateway.dispatch(request).expect("dispatch should succeed");
    assert_eq!(envelope, ResponseEnvelope::Success(json!({"id": 7})));

    let forged = Request::new("echo", Map::new(), "deadbeef");
    assert!(matches!(
        gateway.dispatch(forged),
        Err(DispatchError::AuthenticationFailure)
    ));
}

#[rstest]
fn gateway_translates_catalogued_messages() {
    let sink = Arc::new(RecordingSink::default());
    let catalog: MessageCatalog = [("auth_failed", "Authentication failed")]
        .into_iter()
        .collect();
    let gateway = Gateway::new(test_config(), HandlerRegistry::new(), sink)
        .expect("gateway should assemble")
        .with_messages(catalog);

    assert_eq!(gateway.retrieve_message("auth_failed"), "Authentication failed");
    assert_eq!(gateway.retrieve_message("unknown"), "");
}

#[rstest]
fn disabled_error_reporting_skips_logging() {
    let sink = Arc::new(RecordingSink::default());
    let config = Config {
        error_reporting: 0,
        ..test_config()
    };
    let gateway =
        Gateway::new(config, HandlerRegistry::new(), sink.clone()).expect("gateway should assemble");

    assert!(gateway.on_runtime_error(8, "ignored", "/srv/app/a.ext", 1));
    assert!(sink.lines().is_empty());
}

#[rstest]
fn loaded_defaults_unslash_payloads() {
    let config = Config {
        token_secret: String::from(TEST_SECRET),
        ..Config::load_from_iter(["courier"]).expect("configuration loads")
    };
    assert!(config.unslash_payload());

    let sink = Arc::new(RecordingSink::default());
    let gateway =
        Gateway::new(config, standard_registry(), sink).expect("gateway should assemble");
    let mut payload = Map::new();
    payload.insert(String::from("name"), json!("O\\'Brien"));

    let envelope = gateway
        .dispatch(Request::new("echo", payload, gateway.issue_token()))
        .expect("dispatch should succeed");

    assert_eq!(envelope, ResponseEnvelope::Success(json!({"name": "O'Brien"})));
}
