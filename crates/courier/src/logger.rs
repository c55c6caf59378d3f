//! Pluggable log sink receiving rendered diagnostic lines.
//!
//! The gateway never writes diagnostics to a terminal or file itself. Every
//! line it produces (runtime error log lines and fault diagnostics) is handed
//! to a [`LogSink`] together with a level and a short tag.

use std::sync::Arc;

use strum::{Display, EnumString};

/// Tracing target used by [`TracingLogSink`].
pub const LOG_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::log");

/// Severity attached to a logged line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumString, Display)]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum LogLevel {
    Debug,
    Info,
    Notice,
    Warning,
    Error,
}

/// Receiver for rendered log lines.
pub trait LogSink: Send + Sync {
    /// Records a single line.
    fn log(&self, line: &str, level: LogLevel, tag: &str);
}

impl<T> LogSink for Arc<T>
where
    T: LogSink + ?Sized,
{
    fn log(&self, line: &str, level: LogLevel, tag: &str) {
        (**self).log(line, level, tag);
    }
}

/// Default sink that forwards lines to `tracing`.
///
/// `notice` has no direct `tracing` counterpart and is emitted at `INFO` with
/// the requested level preserved as a field.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingLogSink;

impl TracingLogSink {
    /// Builds a new sink.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl LogSink for TracingLogSink {
    fn log(&self, line: &str, level: LogLevel, tag: &str) {
        match level {
            LogLevel::Debug => {
                tracing::debug!(target: LOG_TARGET, tag, level = %level, "{line}");
            }
            LogLevel::Info | LogLevel::Notice => {
                tracing::info!(target: LOG_TARGET, tag, level = %level, "{line}");
            }
            LogLevel::Warning => {
                tracing::warn!(target: LOG_TARGET, tag, level = %level, "{line}");
            }
            LogLevel::Error => {
                tracing::error!(target: LOG_TARGET, tag, level = %level, "{line}");
            }
        }
    }
}
