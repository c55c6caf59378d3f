//! Gateway assembly.
//!
//! [`Gateway`] wires the token validator, handler registry, log sink,
//! dispatcher, and runtime error hook together from a resolved [`Config`].
//! Every collaborator is passed in explicitly; nothing is looked up from
//! global state.

use std::io::{Read, Write};
use std::sync::Arc;
use std::time::Duration;

use ortho_config::{OrthoConfig, OrthoError};
use serde_json::Value;
use thiserror::Error;
use tracing::info;

use courier_config::Config;

use crate::dispatch::{DispatchError, Dispatcher, Request, ResponseEnvelope, TOKEN_CONTEXT};
use crate::hook::RuntimeErrorHook;
use crate::logger::LogSink;
use crate::messages::MessageCatalog;
use crate::registry::HandlerRegistry;
use crate::telemetry::{self, TelemetryError};
use crate::token::{HmacNonceValidator, TokenError};

/// Name of the filter through which hosts receive gateway log lines.
pub const LOGLINE_FILTER: &str = "courier_logline";

const GATEWAY_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::gateway");

/// Trait abstracting configuration loading for testability.
pub trait ConfigLoader: Send + Sync {
    /// Loads the gateway configuration.
    fn load(&self) -> Result<Config, Arc<OrthoError>>;
}

/// Loader that delegates to [`Config::load`].
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemConfigLoader;

impl ConfigLoader for SystemConfigLoader {
    fn load(&self) -> Result<Config, Arc<OrthoError>> {
        Config::load()
    }
}

/// Errors surfaced while assembling the gateway.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// Configuration failed to load.
    #[error("failed to load configuration: {source}")]
    Configuration {
        #[source]
        source: Arc<OrthoError>,
    },
    /// Telemetry initialisation failed.
    #[error("failed to initialise telemetry: {source}")]
    Telemetry {
        #[source]
        source: TelemetryError,
    },
    /// The token validator could not be built from the configured secret.
    #[error("failed to configure request tokens: {source}")]
    Token {
        #[source]
        source: TokenError,
    },
}

/// The assembled gateway endpoint.
pub struct Gateway {
    config: Config,
    validator: Arc<HmacNonceValidator>,
    dispatcher: Dispatcher,
    hook: RuntimeErrorHook,
    messages: MessageCatalog,
}

impl Gateway {
    /// Builds a gateway whose validator is keyed from the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Token`] when `token_secret` is empty.
    pub fn new(
        config: Config,
        registry: HandlerRegistry,
        logger: Arc<dyn LogSink>,
    ) -> Result<Self, GatewayError> {
        let validator = HmacNonceValidator::new(
            config.token_secret(),
            Duration::from_secs(config.token_lifetime_secs()),
        )
        .map_err(|source| GatewayError::Token { source })?;
        Ok(Self::with_validator(config, Arc::new(validator), registry, logger))
    }

    /// Builds a gateway around an existing validator.
    pub fn with_validator(
        config: Config,
        validator: Arc<HmacNonceValidator>,
        registry: HandlerRegistry,
        logger: Arc<dyn LogSink>,
    ) -> Self {
        let dispatcher = Dispatcher::new(validator.clone(), Arc::new(registry), logger.clone())
            .with_unslash_payload(config.unslash_payload());
        let hook = RuntimeErrorHook::from_config(&config, logger);
        Self {
            config,
            validator,
            dispatcher,
            hook,
            messages: MessageCatalog::new(),
        }
    }

    /// Replaces the message catalog.
    #[must_use]
    pub fn with_messages(mut self, messages: MessageCatalog) -> Self {
        self.messages = messages;
        self
    }

    /// Accessor for the resolved configuration.
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Name of the host plugin embedding the gateway.
    #[must_use]
    pub fn plugin_name(&self) -> &str {
        self.config.plugin_name()
    }

    /// Name of the filter hosts use to receive gateway log lines.
    #[must_use]
    pub fn logline_filter(&self) -> &'static str {
        LOGLINE_FILTER
    }

    /// Issues a request token valid for this endpoint.
    #[must_use]
    pub fn issue_token(&self) -> String {
        self.validator.issue(TOKEN_CONTEXT)
    }

    /// Looks up a translated message; unknown keys yield `""`.
    #[must_use]
    pub fn retrieve_message(&self, key: &str) -> &str {
        self.messages.retrieve(key)
    }

    /// Dispatches one request. See [`Dispatcher::dispatch`].
    ///
    /// # Errors
    ///
    /// Returns the abort reason when the request is rejected.
    pub fn dispatch(&self, request: Request) -> Result<ResponseEnvelope, DispatchError> {
        self.dispatcher.dispatch(request)
    }

    /// Serves one request from `reader` to `writer`. See [`Dispatcher::serve`].
    ///
    /// # Errors
    ///
    /// Returns an error only when writing the response fails.
    pub fn serve<R: Read, W: Write>(&self, reader: R, writer: W) -> Result<(), DispatchError> {
        self.dispatcher.serve(reader, writer)
    }

    /// Routes a runtime error signal to the log sink. See
    /// [`RuntimeErrorHook::on_runtime_error`].
    pub fn on_runtime_error(
        &self,
        severity_code: i64,
        message: impl Into<Value>,
        file: &str,
        line: u32,
    ) -> bool {
        self.hook.on_runtime_error(severity_code, message, file, line)
    }
}

/// Loads configuration, initialises telemetry, and assembles the gateway.
///
/// # Errors
///
/// Returns a [`GatewayError`] naming the stage that failed.
pub fn bootstrap_with(
    loader: &dyn ConfigLoader,
    registry: HandlerRegistry,
    logger: Arc<dyn LogSink>,
) -> Result<Gateway, GatewayError> {
    let config = loader
        .load()
        .map_err(|source| GatewayError::Configuration { source })?;
    telemetry::initialise(&config).map_err(|source| GatewayError::Telemetry { source })?;

    let gateway = Gateway::new(config, registry, logger)?;
    info!(
        target: GATEWAY_TARGET,
        plugin = gateway.plugin_name(),
        log_filter = %gateway.config().log_filter(),
        log_format = %gateway.config().log_format(),
        "gateway ready"
    );
    Ok(gateway)
}
