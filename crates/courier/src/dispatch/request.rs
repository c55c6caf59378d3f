//! Inbound request deserialization.
//!
//! A request arrives as a single JSON line:
//!
//! ```json
//! {"subaction":"get_status","token":"5f3c...","payload":{"verbose":true}}
//! ```
//!
//! `nonce` is accepted in place of `token`. Missing fields default to empty
//! values so that the security check, not the parser, rejects them.

use serde::Deserialize;
use serde_json::{Map, Value};

use super::errors::DispatchError;

/// Payload field that, when present, replaces the whole payload.
pub const NESTED_PAYLOAD_FIELD: &str = "action_data";

/// Parsed command request.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Request {
    /// Name of the handler to invoke.
    #[serde(default)]
    pub subaction: String,
    /// Caller-supplied arguments.
    #[serde(default)]
    pub payload: Map<String, Value>,
    /// Request token checked before any handler is resolved.
    #[serde(default, alias = "nonce")]
    pub token: String,
}

impl Request {
    /// Creates a request from its parts.
    pub fn new(
        subaction: impl Into<String>,
        payload: Map<String, Value>,
        token: impl Into<String>,
    ) -> Self {
        Self {
            subaction: subaction.into(),
            payload,
            token: token.into(),
        }
    }

    /// Parses a request line. Trailing whitespace (including the newline
    /// delimiter) is trimmed before parsing.
    ///
    /// # Errors
    ///
    /// Returns `DispatchError::MalformedRequest` if the line is empty or is
    /// not a JSON request object.
    pub fn parse(line: &[u8]) -> Result<Self, DispatchError> {
        let trimmed = line.trim_ascii_end();
        if trimmed.is_empty() {
            return Err(DispatchError::malformed("empty request line"));
        }

        serde_json::from_slice(trimmed).map_err(DispatchError::from_json_error)
    }

    /// Consumes the request and returns the payload handed to the handler.
    ///
    /// A nested `action_data` field takes precedence over the top-level
    /// payload.
    #[must_use]
    pub fn into_effective_payload(mut self) -> Value {
        match self.payload.remove(NESTED_PAYLOAD_FIELD) {
            Some(nested) => nested,
            None => Value::Object(self.payload),
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn parses_full_request() {
        let input = br#"{"subaction":"ping","token":"abc","payload":{"a":1}}"#;
        let request = Request::parse(input).expect("parse request");
        assert_eq!(request.subaction, "ping");
        assert_eq!(request.token, "abc");
        assert_eq!(request.payload.get("a"), Some(&json!(1)));
    }

    #[test]
    fn accepts_nonce_alias() {
        let request = Request::parse(br#"{"subaction":"ping","nonce":"abc"}"#).expect("parse");
        assert_eq!(request.token, "abc");
    }

    #[test]
    fn missing_fields_default_to_empty() {
        let request = Request::parse(b"{}\n").expect("parse");
        assert_eq!(request, Request::default());
    }

    #[test]
    fn rejects_whitespace_only() {
        let result = Request::parse(b"   \n");
        assert!(matches!(result, Err(DispatchError::MalformedRequest { .. })));
    }

    #[test]
    fn rejects_invalid_json() {
        let result = Request::parse(b"not json");
        assert!(matches!(result, Err(DispatchError::MalformedRequest { .. })));
    }

    #[test]
    fn nested_action_data_replaces_payload() {
        let payload = json!({"action_data": {"inner": true}, "outer": 1});
        let Value::Object(payload) = payload else {
            panic!("object payload");
        };
        let request = Request::new("ping", payload, "t");
        assert_eq!(request.into_effective_payload(), json!({"inner": true}));
    }

    #[test]
    fn nested_action_data_may_be_scalar() {
        let mut payload = Map::new();
        payload.insert(String::from(NESTED_PAYLOAD_FIELD), json!("raw"));
        let request = Request::new("ping", payload, "t");
        assert_eq!(request.into_effective_payload(), json!("raw"));
    }

    #[test]
    fn payload_is_passed_through_without_nesting() {
        let mut payload = Map::new();
        payload.insert(String::from("k"), json!([1, 2]));
        let request = Request::new("ping", payload, "t");
        assert_eq!(request.into_effective_payload(), json!({"k": [1, 2]}));
    }
}
