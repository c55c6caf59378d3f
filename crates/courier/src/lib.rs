//! Command dispatch and response-normalization gateway.
//!
//! The gateway exposes a single endpoint. A request names a subaction and
//! carries a payload and a token; the gateway authenticates the token, invokes
//! the handler registered for the subaction, and converts whatever the handler
//! returns, reports, or panics with into exactly one response envelope.
//!
//! Alongside dispatch, the [`hook`] module turns runtime error signals
//! (severity code, message, file, line) into filterable log lines and hands
//! them to a pluggable [`LogSink`].
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use courier::{Gateway, HandlerOutput, HandlerRegistry, HandlerResult, TracingLogSink};
//! use courier_config::Config;
//! use serde_json::{Value, json};
//!
//! let mut registry = HandlerRegistry::new();
//! registry
//!     .register("ping", |_: Value| -> HandlerResult {
//!         Ok(HandlerOutput::Json(json!({"pong": true})))
//!     })
//!     .expect("register ping");
//!
//! let config = Config {
//!     token_secret: String::from("change-me"),
//!     ..Config::default()
//! };
//! let gateway = Gateway::new(config, registry, Arc::new(TracingLogSink::new()))
//!     .expect("gateway");
//! gateway
//!     .serve(std::io::stdin().lock(), std::io::stdout().lock())
//!     .expect("serve");
//! ```

pub mod dispatch;
mod gateway;
mod handler;
pub mod hook;
mod logger;
pub mod logline;
mod messages;
mod registry;
mod telemetry;
pub mod token;
mod unslash;

pub use dispatch::{DispatchError, Dispatcher, Request, ResponseEnvelope};
pub use gateway::{
    ConfigLoader, Gateway, GatewayError, LOGLINE_FILTER, SystemConfigLoader, bootstrap_with,
};
pub use handler::{
    CommandHandler, DomainError, Fault, FaultKind, HandlerError, HandlerOutput, HandlerResult,
    SourceLocation,
};
pub use hook::{RUNTIME_EVENT_TAG, RuntimeErrorHook};
pub use logger::{LOG_TARGET, LogLevel, LogSink, TracingLogSink};
pub use logline::{
    LoglineTranslator, RuntimeErrorEvent, Severity, Suppression, Translation, to_logline,
};
pub use messages::MessageCatalog;
pub use registry::{HandlerRegistry, RegistryError};
pub use telemetry::{TelemetryError, TelemetryHandle, initialise as initialise_telemetry};
pub use token::{HmacNonceValidator, TokenValidator};
pub use unslash::{strip_slashes, unslash};

#[cfg(test)]
mod tests;
