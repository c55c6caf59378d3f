//! Shared configuration for the Courier gateway.
//!
//! Values are layered by `ortho_config`: built-in defaults, then an optional
//! TOML file (`--config-path` or `COURIER_CONFIG_PATH`), then `COURIER_*`
//! environment variables, then command-line flags.
//!
//! The boolean switches are read from the file and environment layers only.
//! A `SetTrue` flag reports `false` when absent, which would mask both layers.

mod defaults;
mod logging;

use camino::{Utf8Path, Utf8PathBuf};
use ortho_config::OrthoConfig;
use serde::{Deserialize, Serialize};

pub use defaults::{
    DEFAULT_ERROR_REPORTING, DEFAULT_LOG_FILTER, DEFAULT_PLUGIN_NAME,
    DEFAULT_TOKEN_LIFETIME_SECS, default_log_filter, default_log_filter_string,
    default_log_format, default_plugin_name, default_project_root,
};
pub use logging::{LogFormat, LogFormatParseError};

/// Resolved gateway configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, OrthoConfig)]
#[ortho_config(prefix = "COURIER")]
pub struct Config {
    /// `tracing` filter expression applied by the telemetry subscriber.
    #[ortho_config(default = defaults::default_log_filter_string())]
    pub log_filter: String,
    /// Output format of the telemetry subscriber.
    #[ortho_config(default = defaults::default_log_format())]
    pub log_format: LogFormat,
    /// Prefix stripped from file paths embedded in runtime error log lines.
    #[ortho_config(default = defaults::default_project_root())]
    pub project_root: Utf8PathBuf,
    /// Shared secret keying request tokens.
    #[ortho_config(default = String::new())]
    pub token_secret: String,
    /// Lifetime of an issued token in seconds.
    #[ortho_config(default = DEFAULT_TOKEN_LIFETIME_SECS)]
    pub token_lifetime_secs: u64,
    /// Ambient diagnostics level; `0` disables runtime error logging.
    #[ortho_config(default = DEFAULT_ERROR_REPORTING)]
    pub error_reporting: u32,
    /// Value returned by the runtime error hook once a line has been logged.
    #[ortho_config(default = false, skip_cli)]
    pub error_reporting_stop_when_logged: bool,
    /// Drops `E_DEPRECATED` log lines when set.
    #[ortho_config(default = false, skip_cli)]
    pub suppress_deprecation_warnings: bool,
    /// Removes transport backslash escapes from inbound payload strings.
    #[ortho_config(default = true, skip_cli)]
    pub unslash_payload: bool,
    /// Name of the host plugin embedding the gateway.
    #[ortho_config(default = defaults::default_plugin_name())]
    pub plugin_name: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_filter: default_log_filter_string(),
            log_format: default_log_format(),
            project_root: default_project_root(),
            token_secret: String::new(),
            token_lifetime_secs: DEFAULT_TOKEN_LIFETIME_SECS,
            error_reporting: DEFAULT_ERROR_REPORTING,
            error_reporting_stop_when_logged: false,
            suppress_deprecation_warnings: false,
            unslash_payload: true,
            plugin_name: default_plugin_name(),
        }
    }
}

impl Config {
    /// Filter expression for the telemetry subscriber.
    #[must_use]
    pub fn log_filter(&self) -> &str {
        self.log_filter.as_str()
    }

    /// Output format for the telemetry subscriber.
    #[must_use]
    pub fn log_format(&self) -> LogFormat {
        self.log_format
    }

    /// Project root stripped from runtime error file paths.
    #[must_use]
    pub fn project_root(&self) -> &Utf8Path {
        self.project_root.as_path()
    }

    /// Secret used to key request tokens.
    #[must_use]
    pub fn token_secret(&self) -> &str {
        self.token_secret.as_str()
    }

    /// Token lifetime in seconds.
    #[must_use]
    pub fn token_lifetime_secs(&self) -> u64 {
        self.token_lifetime_secs
    }

    /// Ambient diagnostics level.
    #[must_use]
    pub fn error_reporting(&self) -> u32 {
        self.error_reporting
    }

    /// Whether the runtime error hook reports "stop propagation" after logging.
    #[must_use]
    pub fn error_reporting_stop_when_logged(&self) -> bool {
        self.error_reporting_stop_when_logged
    }

    /// Whether deprecation log lines are dropped.
    #[must_use]
    pub fn suppress_deprecation_warnings(&self) -> bool {
        self.suppress_deprecation_warnings
    }

    /// Whether inbound payload strings are unslashed before dispatch.
    #[must_use]
    pub fn unslash_payload(&self) -> bool {
        self.unslash_payload
    }

    /// Host plugin name.
    #[must_use]
    pub fn plugin_name(&self) -> &str {
        self.plugin_name.as_str()
    }
}
