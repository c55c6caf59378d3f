//! Runtime error hook bridging error signals to the log sink.

use std::sync::Arc;

use serde_json::Value;
use tracing::trace;

use courier_config::Config;

use crate::logger::{LogLevel, LogSink};
use crate::logline::{LoglineTranslator, RuntimeErrorEvent, Translation};

/// Tag attached to every runtime error log line.
pub const RUNTIME_EVENT_TAG: &str = "php_event";

const HOOK_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::hook");

/// Receives runtime error signals and forwards rendered lines to a sink.
#[derive(Clone)]
pub struct RuntimeErrorHook {
    translator: LoglineTranslator,
    logger: Arc<dyn LogSink>,
    error_reporting: u32,
    stop_when_logged: bool,
}

impl std::fmt::Debug for RuntimeErrorHook {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RuntimeErrorHook")
            .field("translator", &self.translator)
            .field("error_reporting", &self.error_reporting)
            .field("stop_when_logged", &self.stop_when_logged)
            .finish_non_exhaustive()
    }
}

impl RuntimeErrorHook {
    /// Creates a hook from its collaborators.
    pub fn new(
        translator: LoglineTranslator,
        logger: Arc<dyn LogSink>,
        error_reporting: u32,
        stop_when_logged: bool,
    ) -> Self {
        Self {
            translator,
            logger,
            error_reporting,
            stop_when_logged,
        }
    }

    /// Builds a hook from the shared configuration.
    pub fn from_config(config: &Config, logger: Arc<dyn LogSink>) -> Self {
        Self::new(
            LoglineTranslator::new(
                config.project_root(),
                config.suppress_deprecation_warnings(),
            ),
            logger,
            config.error_reporting(),
            config.error_reporting_stop_when_logged(),
        )
    }

    /// Handles one runtime error signal.
    ///
    /// Returns whether normal fault propagation should continue. With
    /// diagnostics disabled (`error_reporting == 0`) this is always `true`
    /// and nothing is logged; otherwise it is the configured
    /// `error_reporting_stop_when_logged` value.
    pub fn on_runtime_error(
        &self,
        severity_code: i64,
        message: impl Into<Value>,
        file: &str,
        line: u32,
    ) -> bool {
        if self.error_reporting == 0 {
            return true;
        }

        let event = RuntimeErrorEvent::new(severity_code, message, file, line);
        match self.translator.translate(&event) {
            Translation::Line(logline) => {
                self.logger.log(&logline, LogLevel::Notice, RUNTIME_EVENT_TAG);
            }
            Translation::Suppressed(reason) => {
                trace!(
                    target: HOOK_TARGET,
                    severity = %event.severity,
                    code = event.severity.code(),
                    ?reason,
                    "runtime error suppressed"
                );
            }
        }
        self.stop_when_logged
    }
}
