//! Request authentication, handler resolution, and result normalization.

use std::sync::Arc;

use tracing::debug;

use super::errors::DispatchError;
use super::fault;
use super::request::Request;
use super::response::ResponseEnvelope;
use crate::handler::{HandlerError, HandlerResult};
use crate::logger::{LogLevel, LogSink};
use crate::registry::HandlerRegistry;
use crate::token::TokenValidator;
use crate::unslash::unslash;

/// Tracing target for dispatch operations.
pub(crate) const DISPATCH_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::dispatch");

/// Action context every request token is checked against.
pub const TOKEN_CONTEXT: &str = "credential-test";

/// Tag attached to fault diagnostics sent to the log sink.
pub const FAULT_LOG_TAG: &str = "fatal_error";

/// Routes authenticated requests to registered handlers.
///
/// Collaborators are injected at construction and shared read-only across
/// dispatch cycles.
pub struct Dispatcher {
    validator: Arc<dyn TokenValidator>,
    registry: Arc<HandlerRegistry>,
    logger: Arc<dyn LogSink>,
    unslash_payload: bool,
}

impl Dispatcher {
    /// Creates a dispatcher. Payload unslashing starts disabled.
    pub fn new(
        validator: Arc<dyn TokenValidator>,
        registry: Arc<HandlerRegistry>,
        logger: Arc<dyn LogSink>,
    ) -> Self {
        Self {
            validator,
            registry,
            logger,
            unslash_payload: false,
        }
    }

    /// Enables or disables unslashing of inbound payload strings.
    #[must_use]
    pub fn with_unslash_payload(mut self, enabled: bool) -> Self {
        self.unslash_payload = enabled;
        self
    }

    /// Dispatches one request.
    ///
    /// # Errors
    ///
    /// Aborts with `AuthenticationFailure` before anything else when the token
    /// is rejected, with `MissingSubaction` for an empty subaction, and with
    /// `UnknownCommand` when no handler is registered under the subaction.
    /// Handler failures never surface here; they become envelopes.
    pub fn dispatch(&self, request: Request) -> Result<ResponseEnvelope, DispatchError> {
        if !self.validator.validate(&request.token, TOKEN_CONTEXT) {
            return Err(DispatchError::AuthenticationFailure);
        }
        if request.subaction.is_empty() {
            return Err(DispatchError::MissingSubaction);
        }
        let Some(handler) = self.registry.resolve(&request.subaction).cloned() else {
            return Err(DispatchError::unknown_command(request.subaction));
        };

        debug!(
            target: DISPATCH_TARGET,
            subaction = %request.subaction,
            "dispatching request"
        );

        let subaction = request.subaction.clone();
        let mut payload = request.into_effective_payload();
        if self.unslash_payload {
            payload = unslash(payload);
        }

        let result = fault::invoke(handler.as_ref(), payload);
        Ok(self.normalize(&subaction, result))
    }

    fn normalize(&self, subaction: &str, result: HandlerResult) -> ResponseEnvelope {
        match result {
            Ok(output) => output.into(),
            Err(HandlerError::Domain(error)) => {
                debug!(
                    target: DISPATCH_TARGET,
                    subaction,
                    code = %error.code,
                    "handler reported domain error"
                );
                ResponseEnvelope::domain_error(error)
            }
            Err(HandlerError::Fault(fault)) => {
                let diagnostic = fault.diagnostic(subaction);
                self.logger.log(&diagnostic, LogLevel::Error, FAULT_LOG_TAG);
                ResponseEnvelope::fault(diagnostic)
            }
        }
    }
}
