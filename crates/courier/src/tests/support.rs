//! Shared fixtures for the gateway suites.

use std::ffi::OsString;
use std::sync::{Arc, Mutex};

use ortho_config::{OrthoConfig, OrthoError};
use serde_json::{Value, json};

use courier_config::Config;

use crate::{
    ConfigLoader, DomainError, Fault, HandlerOutput, HandlerRegistry, HandlerResult, LogLevel,
    LogSink,
};

pub const TEST_SECRET: &str = "behaviour-secret";
pub const TEST_PROJECT_ROOT: &str = "/srv/app";

/// One line captured by [`RecordingSink`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggedLine {
    pub line: String,
    pub level: LogLevel,
    pub tag: String,
}

/// Sink that keeps every line it receives.
#[derive(Debug, Default)]
pub struct RecordingSink {
    lines: Mutex<Vec<LoggedLine>>,
}

impl RecordingSink {
    pub fn lines(&self) -> Vec<LoggedLine> {
        self.lines.lock().expect("sink lock poisoned").clone()
    }
}

impl LogSink for RecordingSink {
    fn log(&self, line: &str, level: LogLevel, tag: &str) {
        self.lines
            .lock()
            .expect("sink lock poisoned")
            .push(LoggedLine {
                line: line.to_owned(),
                level,
                tag: tag.to_owned(),
            });
    }
}

/// Configuration with a usable secret and a known project root.
pub fn test_config() -> Config {
    Config {
        token_secret: String::from(TEST_SECRET),
        project_root: TEST_PROJECT_ROOT.into(),
        ..Config::default()
    }
}

/// Registry carrying one handler per outcome shape.
pub fn standard_registry() -> HandlerRegistry {
    let mut registry = HandlerRegistry::new();
    registry
        .register("echo", |payload: Value| -> HandlerResult {
            Ok(HandlerOutput::Json(payload))
        })
        .expect("register echo");
    registry
        .register("legacy", |_: Value| -> HandlerResult {
            Ok(HandlerOutput::Text(String::from("legacy ok")))
        })
        .expect("register legacy");
    registry
        .register("reject", |_: Value| -> HandlerResult {
            Err(DomainError::new("invalid_input", "Value rejected")
                .with_data(json!({"field": "value"}))
                .into())
        })
        .expect("register reject");
    registry
        .register("divide", |_: Value| -> HandlerResult {
            Err(Fault::recoverable("DivisionByZeroError", "Division by zero")
                .at("/srv/app/lib/math.ext", 12)
                .into())
        })
        .expect("register divide");
    registry
        .register("explode", |_: Value| -> HandlerResult {
            panic!("handler blew up");
        })
        .expect("register explode");
    registry
}

/// Loader returning [`test_config`].
#[derive(Debug, Default)]
pub struct TestConfigLoader;

impl ConfigLoader for TestConfigLoader {
    fn load(&self) -> Result<Config, Arc<OrthoError>> {
        Ok(test_config())
    }
}

/// Loader that fails by passing an unparseable CLI argument.
#[derive(Debug, Default)]
pub struct FailingConfigLoader;

impl ConfigLoader for FailingConfigLoader {
    fn load(&self) -> Result<Config, Arc<OrthoError>> {
        let args = vec![
            OsString::from("courier"),
            OsString::from("--token-lifetime-secs"),
            OsString::from("forever"),
        ];
        Config::load_from_iter(args)
    }
}
