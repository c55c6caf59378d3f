use camino::Utf8PathBuf;

use crate::logging::LogFormat;

/// Default log filter expression.
pub const DEFAULT_LOG_FILTER: &str = "info";

/// Default nonce lifetime in seconds. Tokens stay valid for up to this long.
pub const DEFAULT_TOKEN_LIFETIME_SECS: u64 = 86_400;

/// Diagnostics level that reports every runtime error category.
pub const DEFAULT_ERROR_REPORTING: u32 = 30_719;

/// Name reported by the host when no override is configured.
pub const DEFAULT_PLUGIN_NAME: &str = "courier";

/// Default log filter expression.
pub fn default_log_filter() -> &'static str {
    DEFAULT_LOG_FILTER
}

/// Owned log filter value used where allocation is required (e.g. serde).
pub fn default_log_filter_string() -> String {
    DEFAULT_LOG_FILTER.to_string()
}

/// Default logging format.
pub fn default_log_format() -> LogFormat {
    LogFormat::Json
}

/// Project root used for relative-path normalization. Empty disables
/// stripping.
pub fn default_project_root() -> Utf8PathBuf {
    Utf8PathBuf::new()
}

/// Owned plugin name used where allocation is required.
pub fn default_plugin_name() -> String {
    DEFAULT_PLUGIN_NAME.to_string()
}
