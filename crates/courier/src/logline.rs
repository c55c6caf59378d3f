//! Translation of runtime error signals into single-line diagnostics.
//!
//! A runtime error signal carries a numeric severity code, a message, and the
//! file and line it was raised from. [`LoglineTranslator`] maps the code onto
//! a closed [`Severity`] enum, applies the suppression rules, and renders the
//! line in the fixed format consumed by downstream log filters:
//!
//! ```text
//! PHP event: code E_NOTICE: x undefined (line 10, /foo.ext)
//! ```

use std::borrow::Cow;
use std::fmt;

use camino::Utf8PathBuf;
use serde_json::Value;

/// Message fragment identifying a noisy third-party table-schema warning.
pub const THIRD_PARTY_SCHEMA_NOTICE: &str =
    "table which is not valid in this version of Gravity Forms";

/// Runtime error category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Severity {
    Error,
    Warning,
    Parse,
    Notice,
    CoreError,
    CoreWarning,
    CompileError,
    CompileWarning,
    UserError,
    UserWarning,
    UserNotice,
    Strict,
    RecoverableError,
    Deprecated,
    UserDeprecated,
    All,
    /// Unrecognised code, preserved for diagnostics.
    Unknown(i64),
}

impl Severity {
    /// Maps a numeric severity code onto its category.
    #[must_use]
    pub fn from_code(code: i64) -> Self {
        match code {
            1 => Self::Error,
            2 => Self::Warning,
            4 => Self::Parse,
            8 => Self::Notice,
            16 => Self::CoreError,
            32 => Self::CoreWarning,
            64 => Self::CompileError,
            128 => Self::CompileWarning,
            256 => Self::UserError,
            512 => Self::UserWarning,
            1024 => Self::UserNotice,
            2048 => Self::Strict,
            4096 => Self::RecoverableError,
            8192 => Self::Deprecated,
            16384 => Self::UserDeprecated,
            30719 => Self::All,
            other => Self::Unknown(other),
        }
    }

    /// Returns the numeric code of the category.
    #[must_use]
    pub fn code(self) -> i64 {
        match self {
            Self::Error => 1,
            Self::Warning => 2,
            Self::Parse => 4,
            Self::Notice => 8,
            Self::CoreError => 16,
            Self::CoreWarning => 32,
            Self::CompileError => 64,
            Self::CompileWarning => 128,
            Self::UserError => 256,
            Self::UserWarning => 512,
            Self::UserNotice => 1024,
            Self::Strict => 2048,
            Self::RecoverableError => 4096,
            Self::Deprecated => 8192,
            Self::UserDeprecated => 16384,
            Self::All => 30719,
            Self::Unknown(code) => code,
        }
    }

    /// Returns the canonical label, e.g. `E_NOTICE` or `E_UNKNOWN (3)`.
    #[must_use]
    pub fn label(self) -> Cow<'static, str> {
        let label = match self {
            Self::Error => "E_ERROR",
            Self::Warning => "E_WARNING",
            Self::Parse => "E_PARSE",
            Self::Notice => "E_NOTICE",
            Self::CoreError => "E_CORE_ERROR",
            Self::CoreWarning => "E_CORE_WARNING",
            Self::CompileError => "E_COMPILE_ERROR",
            Self::CompileWarning => "E_COMPILE_WARNING",
            Self::UserError => "E_USER_ERROR",
            Self::UserWarning => "E_USER_WARNING",
            Self::UserNotice => "E_USER_NOTICE",
            Self::Strict => "E_STRICT",
            Self::RecoverableError => "E_RECOVERABLE_ERROR",
            Self::Deprecated => "E_DEPRECATED",
            Self::UserDeprecated => "E_USER_DEPRECATED",
            Self::All => "E_ALL",
            Self::Unknown(code) => return Cow::Owned(format!("E_UNKNOWN ({code})")),
        };
        Cow::Borrowed(label)
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label())
    }
}

/// A runtime error signal.
#[derive(Debug, Clone, PartialEq)]
pub struct RuntimeErrorEvent {
    pub severity: Severity,
    /// Message text, or any structured value raised in its place.
    pub message: Value,
    pub file: String,
    pub line: u32,
}

impl RuntimeErrorEvent {
    pub fn new(code: i64, message: impl Into<Value>, file: impl Into<String>, line: u32) -> Self {
        Self {
            severity: Severity::from_code(code),
            message: message.into(),
            file: file.into(),
            line,
        }
    }

    /// Returns the message as text, serializing non-string values as compact
    /// JSON.
    #[must_use]
    pub fn message_text(&self) -> Cow<'_, str> {
        match &self.message {
            Value::String(text) => Cow::Borrowed(text.as_str()),
            other => Cow::Owned(other.to_string()),
        }
    }
}

/// Reason a would-be log line was discarded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Suppression {
    /// Known third-party schema notice.
    ThirdPartySchemaNotice,
    /// Deprecation notices are switched off.
    Deprecation,
}

/// Result of translating a runtime error signal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Translation {
    /// The rendered line. May embed an empty message.
    Line(String),
    /// No line is produced.
    Suppressed(Suppression),
}

impl Translation {
    /// Returns the rendered line, if any.
    #[must_use]
    pub fn into_line(self) -> Option<String> {
        match self {
            Self::Line(line) => Some(line),
            Self::Suppressed(_) => None,
        }
    }
}

/// Renders runtime error signals as log lines.
#[derive(Debug, Clone, Default)]
pub struct LoglineTranslator {
    project_root: Utf8PathBuf,
    suppress_deprecation: bool,
}

impl LoglineTranslator {
    /// Creates a translator stripping `project_root` from file paths.
    pub fn new(project_root: impl Into<Utf8PathBuf>, suppress_deprecation: bool) -> Self {
        Self {
            project_root: project_root.into(),
            suppress_deprecation,
        }
    }

    /// Translates a runtime error signal.
    #[must_use]
    pub fn translate(&self, event: &RuntimeErrorEvent) -> Translation {
        let message = event.message_text();
        if contains_ignore_ascii_case(&message, THIRD_PARTY_SCHEMA_NOTICE) {
            return Translation::Suppressed(Suppression::ThirdPartySchemaNotice);
        }
        if event.severity == Severity::Deprecated && self.suppress_deprecation {
            return Translation::Suppressed(Suppression::Deprecation);
        }

        let file = self.relative_file(&event.file);
        Translation::Line(format!(
            "PHP event: code {}: {message} (line {}, {file})",
            event.severity, event.line
        ))
    }

    fn relative_file<'a>(&self, file: &'a str) -> &'a str {
        let root = self.project_root.as_str();
        if root.is_empty() {
            return file;
        }
        file.strip_prefix(root).unwrap_or(file)
    }
}

/// One-shot translation of a runtime error signal.
#[must_use]
pub fn to_logline(
    severity_code: i64,
    message: impl Into<Value>,
    file: &str,
    line: u32,
    project_root: &str,
    suppress_deprecation: bool,
) -> Translation {
    LoglineTranslator::new(project_root, suppress_deprecation).translate(&RuntimeErrorEvent::new(
        severity_code,
        message,
        file,
        line,
    ))
}

fn contains_ignore_ascii_case(haystack: &str, needle: &str) -> bool {
    haystack
        .to_ascii_lowercase()
        .contains(&needle.to_ascii_lowercase())
}
