//! Process-wide `tracing` setup for embedders that let the gateway own it.
//!
//! Gateway log lines are emitted under the `courier::log` target, dispatch
//! outcomes under `courier::dispatch`; both are subject to the configured
//! `log_filter`. Output always goes to stderr so the response stream stays
//! clean.

use std::io::{self, IsTerminal};

use once_cell::sync::OnceCell;
use tracing::subscriber::SetGlobalDefaultError;
use tracing_subscriber::fmt::time::UtcTime;
use tracing_subscriber::{EnvFilter, fmt};

use courier_config::{Config, LogFormat};

static INSTALLED_FORMAT: OnceCell<LogFormat> = OnceCell::new();

/// Proof that the global subscriber is in place.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TelemetryHandle {
    format: LogFormat,
}

impl TelemetryHandle {
    /// Format chosen by the call that installed the subscriber.
    #[must_use]
    pub fn format(&self) -> LogFormat {
        self.format
    }
}

/// Errors encountered while configuring telemetry.
#[derive(Debug, thiserror::Error)]
pub enum TelemetryError {
    /// The configured filter expression did not parse.
    #[error("invalid log filter '{filter}': {message}")]
    Filter { filter: String, message: String },
    /// Another subscriber was already installed globally.
    #[error("failed to install telemetry subscriber: {0}")]
    Subscriber(#[from] SetGlobalDefaultError),
}

/// Installs the global subscriber on first use.
///
/// Later calls leave the installed subscriber alone and return a handle
/// reporting the format it was installed with, whatever `config` says.
///
/// # Errors
///
/// Fails when the filter is invalid or a foreign subscriber already owns
/// the global slot.
pub fn initialise(config: &Config) -> Result<TelemetryHandle, TelemetryError> {
    INSTALLED_FORMAT
        .get_or_try_init(|| {
            install(config)?;
            Ok(config.log_format())
        })
        .map(|format| TelemetryHandle { format: *format })
}

fn parse_filter(expression: &str) -> Result<EnvFilter, TelemetryError> {
    EnvFilter::try_new(expression).map_err(|error| TelemetryError::Filter {
        filter: expression.to_owned(),
        message: error.to_string(),
    })
}

fn install(config: &Config) -> Result<(), TelemetryError> {
    let filter = parse_filter(config.log_filter())?;
    let ansi = io::stderr().is_terminal();
    let base = fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_ansi(ansi)
        .with_target(true)
        .with_timer(UtcTime::rfc_3339());

    match config.log_format() {
        LogFormat::Json => {
            tracing::subscriber::set_global_default(base.json().flatten_event(true).finish())?;
        }
        LogFormat::Compact => {
            tracing::subscriber::set_global_default(base.compact().finish())?;
        }
    }
    Ok(())
}
