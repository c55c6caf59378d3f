//! Handler contract and the values a handler may produce.

use std::fmt;
use std::panic::Location;

use serde_json::Value;
use strum::Display;

/// Outcome of a handler invocation.
pub type HandlerResult = Result<HandlerOutput, HandlerError>;

/// A command handler registered under a subaction name.
pub trait CommandHandler: Send + Sync {
    /// Handles the effective request payload.
    fn handle(&self, payload: Value) -> HandlerResult;
}

impl<F> CommandHandler for F
where
    F: Fn(Value) -> HandlerResult + Send + Sync,
{
    fn handle(&self, payload: Value) -> HandlerResult {
        self(payload)
    }
}

/// Successful handler output.
#[derive(Debug, Clone, PartialEq)]
pub enum HandlerOutput {
    /// Structured payload returned to the caller unchanged.
    Json(Value),
    /// Legacy text body written verbatim (for example an iframe document).
    Text(String),
}

impl From<Value> for HandlerOutput {
    fn from(value: Value) -> Self {
        Self::Json(value)
    }
}

impl From<String> for HandlerOutput {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<&str> for HandlerOutput {
    fn from(text: &str) -> Self {
        Self::Text(text.to_owned())
    }
}

/// Failure reported by a handler.
#[derive(Debug, Clone, PartialEq)]
pub enum HandlerError {
    /// Expected, caller-actionable business failure.
    Domain(DomainError),
    /// Defect raised while handling the request.
    Fault(Fault),
}

impl From<DomainError> for HandlerError {
    fn from(error: DomainError) -> Self {
        Self::Domain(error)
    }
}

impl From<Fault> for HandlerError {
    fn from(fault: Fault) -> Self {
        Self::Fault(fault)
    }
}

/// Structured business-level failure surfaced to the caller in full.
#[derive(Debug, Clone, PartialEq)]
pub struct DomainError {
    pub code: String,
    pub message: String,
    pub data: Value,
}

impl DomainError {
    /// Creates a domain error without attached data.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            data: Value::Null,
        }
    }

    /// Attaches caller-facing data.
    #[must_use]
    pub fn with_data(mut self, data: Value) -> Self {
        self.data = data;
        self
    }
}

/// Class of runtime fault.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "snake_case")]
pub enum FaultKind {
    /// Logic error raised deliberately by the handler.
    Recoverable,
    /// Engine-level failure such as a panic or broken invariant.
    Fatal,
}

/// Place in the source where a fault originated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceLocation {
    pub file: String,
    pub line: u32,
}

impl SourceLocation {
    pub fn new(file: impl Into<String>, line: u32) -> Self {
        Self {
            file: file.into(),
            line,
        }
    }
}

impl From<&Location<'_>> for SourceLocation {
    fn from(location: &Location<'_>) -> Self {
        Self::new(location.file(), location.line())
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {} in {}", self.line, self.file)
    }
}

/// Runtime fault captured at the dispatch boundary.
///
/// The constructors record the caller's location; use [`Fault::at`] to
/// report a different origin.
#[derive(Debug, Clone, PartialEq)]
pub struct Fault {
    pub kind: FaultKind,
    /// Name of the failure type, e.g. `InvalidArgument`.
    pub class: String,
    pub message: String,
    pub code: i64,
    pub location: SourceLocation,
}

impl Fault {
    /// Creates a recoverable fault located at the caller.
    #[track_caller]
    pub fn recoverable(class: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(FaultKind::Recoverable, class, message)
    }

    /// Creates a fatal fault located at the caller.
    #[track_caller]
    pub fn fatal(class: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(FaultKind::Fatal, class, message)
    }

    #[track_caller]
    fn new(kind: FaultKind, class: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind,
            class: class.into(),
            message: message.into(),
            code: 0,
            location: Location::caller().into(),
        }
    }

    /// Sets the numeric fault code.
    #[must_use]
    pub fn with_code(mut self, code: i64) -> Self {
        self.code = code;
        self
    }

    /// Overrides the recorded origin.
    #[must_use]
    pub fn at(mut self, file: impl Into<String>, line: u32) -> Self {
        self.location = SourceLocation::new(file, line);
        self
    }

    /// Renders the full diagnostic for a fault raised while handling
    /// `subaction`.
    #[must_use]
    pub fn diagnostic(&self, subaction: &str) -> String {
        let heading = match self.kind {
            FaultKind::Recoverable => "PHP Fatal Exception error",
            FaultKind::Fatal => "PHP Fatal error",
        };
        format!(
            "{heading} ({}) has occurred during {subaction} subaction. Error Message: {} (Code: {}, {})",
            self.class, self.message, self.code, self.location
        )
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn closures_are_handlers() {
        let handler = |payload: Value| -> HandlerResult { Ok(HandlerOutput::Json(payload)) };
        let output = handler.handle(json!({"a": 1})).expect("handled");
        assert_eq!(output, HandlerOutput::Json(json!({"a": 1})));
    }

    #[test]
    fn fault_records_caller_location() {
        let line = line!() + 1;
        let fault = Fault::recoverable("Oops", "boom");
        assert_eq!(fault.location.line, line);
        assert!(fault.location.file.ends_with("handler.rs"));
    }

    #[test]
    fn recoverable_diagnostic_names_every_detail() {
        let fault = Fault::recoverable("DivisionByZero", "divide by zero")
            .with_code(7)
            .at("handlers.ext", 42);
        assert_eq!(
            fault.diagnostic("calculate"),
            "PHP Fatal Exception error (DivisionByZero) has occurred during calculate subaction. \
             Error Message: divide by zero (Code: 7, line 42 in handlers.ext)"
        );
    }

    #[test]
    fn fatal_diagnostic_uses_distinct_heading() {
        let fault = Fault::fatal("TypeError", "bad type").at("handlers.ext", 3);
        let diagnostic = fault.diagnostic("calculate");
        assert!(diagnostic.starts_with("PHP Fatal error (TypeError)"));
    }

    #[test]
    fn domain_error_defaults_to_null_data() {
        let error = DomainError::new("E1", "bad input");
        assert_eq!(error.data, Value::Null);
        assert_eq!(
            error.with_data(json!([1])).data,
            json!([1]),
        );
    }
}
