//! Response envelopes and the single-shot response writer.
//!
//! Every completed dispatch produces exactly one [`ResponseEnvelope`]:
//!
//! - a raw string, written verbatim;
//! - the handler's success payload, serialized unchanged;
//! - `{"result":false,"error_code":..,"error_message":..,"error_data":..}`
//!   for domain errors;
//! - `{"fatal_error":true,"fatal_error_message":..}` for faults.

use std::io::Write;

use serde::de::{self, Unexpected};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

use super::errors::DispatchError;
use crate::handler::{DomainError, HandlerOutput};

/// A boolean field pinned to a single value on the wire.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Flag<const VALUE: bool>;

impl<const VALUE: bool> Serialize for Flag<VALUE> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_bool(VALUE)
    }
}

impl<'de, const VALUE: bool> Deserialize<'de> for Flag<VALUE> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = bool::deserialize(deserializer)?;
        if value == VALUE {
            return Ok(Self);
        }
        let expected = if VALUE { "true" } else { "false" };
        Err(de::Error::invalid_value(Unexpected::Bool(value), &expected))
    }
}

/// Body of a domain error response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DomainErrorBody {
    pub result: Flag<false>,
    pub error_code: String,
    pub error_message: String,
    #[serde(default)]
    pub error_data: Value,
}

impl From<DomainError> for DomainErrorBody {
    fn from(error: DomainError) -> Self {
        Self {
            result: Flag,
            error_code: error.code,
            error_message: error.message,
            error_data: error.data,
        }
    }
}

/// Body of a fault response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FaultBody {
    pub fatal_error: Flag<true>,
    pub fatal_error_message: String,
}

/// The single response produced by a dispatch cycle.
///
/// Variant order matters for deserialization: the two pinned shapes are
/// tried before the catch-all success payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ResponseEnvelope {
    DomainError(DomainErrorBody),
    Fault(FaultBody),
    Raw(String),
    Success(Value),
}

impl ResponseEnvelope {
    /// Wraps a success payload. A JSON string payload becomes a raw body.
    #[must_use]
    pub fn success(value: Value) -> Self {
        match value {
            Value::String(text) => Self::Raw(text),
            other => Self::Success(other),
        }
    }

    /// Builds the domain error envelope.
    #[must_use]
    pub fn domain_error(error: DomainError) -> Self {
        Self::DomainError(error.into())
    }

    /// Builds the fault envelope carrying `message`.
    pub fn fault(message: impl Into<String>) -> Self {
        Self::Fault(FaultBody {
            fatal_error: Flag,
            fatal_error_message: message.into(),
        })
    }

    /// Renders the response body as written to the transport.
    ///
    /// # Errors
    ///
    /// Returns an error if the structured payload cannot be serialized.
    pub fn to_wire(&self) -> Result<String, serde_json::Error> {
        match self {
            Self::Raw(text) => Ok(text.clone()),
            structured => serde_json::to_string(structured),
        }
    }

    /// Recovers an envelope from a response body. Bodies that are not a
    /// structured JSON value are raw.
    ///
    /// The wire carries no tag, so a `Raw` body that is itself valid
    /// non-string JSON (`42`, `{"a":1}`) comes back as `Success` or one of the
    /// error shapes. Only bodies that fail to parse, or parse as a JSON
    /// string, stay `Raw`.
    #[must_use]
    pub fn from_wire(body: &str) -> Self {
        match serde_json::from_str::<Self>(body) {
            Ok(Self::Raw(_)) | Err(_) => Self::Raw(body.to_owned()),
            Ok(envelope) => envelope,
        }
    }
}

impl From<HandlerOutput> for ResponseEnvelope {
    fn from(output: HandlerOutput) -> Self {
        match output {
            HandlerOutput::Json(value) => Self::success(value),
            HandlerOutput::Text(text) => Self::Raw(text),
        }
    }
}

/// Writer emitting exactly one response body.
///
/// Both write methods consume the writer, so a second body cannot be
/// appended to the same request.
pub struct ResponseWriter<W> {
    writer: W,
}

impl<W: Write> ResponseWriter<W> {
    /// Creates a new response writer wrapping the given output stream.
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    /// Writes the envelope and flushes the stream.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization, writing, or flushing fails.
    pub fn write_envelope(mut self, envelope: &ResponseEnvelope) -> Result<(), DispatchError> {
        match envelope {
            ResponseEnvelope::Raw(text) => self.writer.write_all(text.as_bytes())?,
            structured => serde_json::to_writer(&mut self.writer, structured)?,
        }
        self.writer.flush()?;
        Ok(())
    }

    /// Writes the abort body for `error`, if it has one, and flushes.
    ///
    /// # Errors
    ///
    /// Returns an error if writing or flushing fails.
    pub fn write_abort(mut self, error: &DispatchError) -> Result<(), DispatchError> {
        if let Some(body) = error.abort_body() {
            self.writer.write_all(body.as_bytes())?;
        }
        self.writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;
    use serde_json::json;

    use super::*;
    use crate::dispatch::errors::SECURITY_CHECK_BODY;

    fn written(envelope: &ResponseEnvelope) -> String {
        let mut output = Vec::new();
        ResponseWriter::new(&mut output)
            .write_envelope(envelope)
            .expect("write envelope");
        String::from_utf8(output).expect("valid utf8")
    }

    #[test]
    fn domain_error_has_exact_shape() {
        let envelope = ResponseEnvelope::domain_error(DomainError::new("E1", "bad input"));
        let value = serde_json::to_value(&envelope).expect("serialize");
        assert_eq!(
            value,
            json!({
                "result": false,
                "error_code": "E1",
                "error_message": "bad input",
                "error_data": null,
            })
        );
    }

    #[test]
    fn fault_has_exact_shape() {
        let value = serde_json::to_value(ResponseEnvelope::fault("boom")).expect("serialize");
        assert_eq!(
            value,
            json!({"fatal_error": true, "fatal_error_message": "boom"})
        );
    }

    #[test]
    fn success_payload_is_written_unchanged() {
        let payload = json!({"result": true, "items": [1, 2, 3], "nested": {"k": null}});
        let body = written(&ResponseEnvelope::success(payload.clone()));
        let parsed: Value = serde_json::from_str(&body).expect("json body");
        assert_eq!(parsed, payload);
    }

    #[test]
    fn raw_body_is_written_verbatim() {
        let body = written(&ResponseEnvelope::from(HandlerOutput::from("<html>ok</html>")));
        assert_eq!(body, "<html>ok</html>");
    }

    #[test]
    fn json_string_payload_is_raw() {
        assert_eq!(
            ResponseEnvelope::success(json!("plain")),
            ResponseEnvelope::Raw(String::from("plain"))
        );
    }

    #[rstest]
    #[case::success(ResponseEnvelope::success(json!({"a": [1, {"b": false}]})))]
    #[case::success_array(ResponseEnvelope::success(json!([1, 2])))]
    #[case::domain(ResponseEnvelope::domain_error(
        DomainError::new("E2", "nope").with_data(json!({"field": "name"}))
    ))]
    #[case::fault(ResponseEnvelope::fault("PHP Fatal error (panic) ..."))]
    #[case::raw(ResponseEnvelope::Raw(String::from("<iframe/>")))]
    fn wire_round_trip_preserves_shape(#[case] envelope: ResponseEnvelope) {
        let wire = envelope.to_wire().expect("to wire");
        assert_eq!(ResponseEnvelope::from_wire(&wire), envelope);
    }

    #[rstest]
    #[case::number("42", json!(42))]
    #[case::object(r#"{"a":1}"#, json!({"a": 1}))]
    fn raw_json_text_reads_back_as_success(#[case] body: &str, #[case] expected: Value) {
        let wire = ResponseEnvelope::Raw(body.to_owned())
            .to_wire()
            .expect("to wire");
        assert_eq!(wire, body);
        assert_eq!(
            ResponseEnvelope::from_wire(&wire),
            ResponseEnvelope::Success(expected)
        );
    }

    #[test]
    fn raw_json_string_text_stays_raw() {
        let body = r#""quoted""#;
        assert_eq!(
            ResponseEnvelope::from_wire(body),
            ResponseEnvelope::Raw(body.to_owned())
        );
    }

    #[test]
    fn result_true_object_is_a_success_payload() {
        let envelope = ResponseEnvelope::from_wire(
            r#"{"result":true,"error_code":"x","error_message":"y","error_data":null}"#,
        );
        assert!(matches!(envelope, ResponseEnvelope::Success(_)));
    }

    #[test]
    fn quoted_raw_body_stays_verbatim() {
        let envelope = ResponseEnvelope::from_wire(r#""quoted""#);
        assert_eq!(envelope, ResponseEnvelope::Raw(String::from(r#""quoted""#)));
    }

    #[rstest]
    #[case::security(DispatchError::AuthenticationFailure, SECURITY_CHECK_BODY)]
    #[case::silent(DispatchError::unknown_command("nope"), "")]
    fn abort_writes_only_generic_body(#[case] error: DispatchError, #[case] expected: &str) {
        let mut output = Vec::new();
        ResponseWriter::new(&mut output)
            .write_abort(&error)
            .expect("write abort");
        assert_eq!(String::from_utf8(output).expect("utf8"), expected);
    }
}
