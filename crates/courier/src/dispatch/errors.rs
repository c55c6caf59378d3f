//! Abort conditions raised while dispatching a request.
//!
//! A `DispatchError` ends the request cycle without a response envelope. The
//! only body ever written for an abort is the generic security notice; no
//! variant discloses why a token or subaction was rejected.

use std::io;

use thiserror::Error;

/// Generic body written when a request fails the security check.
pub const SECURITY_CHECK_BODY: &str = "Security check";

/// Errors that abort a dispatch cycle.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// Token missing or rejected.
    #[error("security check failed")]
    AuthenticationFailure,

    /// Subaction missing or empty.
    #[error("subaction is missing")]
    MissingSubaction,

    /// No handler is registered under the subaction.
    #[error("unknown subaction: {subaction}")]
    UnknownCommand { subaction: String },

    /// Request line could not be parsed.
    #[error("malformed request: {message}")]
    MalformedRequest {
        message: String,
        #[source]
        source: Option<serde_json::Error>,
    },

    /// Request exceeds the maximum allowed size.
    #[error("request too large: {size} bytes exceeds {max_size} byte limit")]
    RequestTooLarge { size: usize, max_size: usize },

    /// IO error during read or write.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// Response serialization failed.
    #[error("failed to serialize response: {0}")]
    SerializeResponse(#[from] serde_json::Error),
}

impl DispatchError {
    /// Returns the body written to the transport for this abort, if any.
    ///
    /// Security failures and unreadable requests get the generic notice.
    /// Unknown subactions and transport failures end without a body.
    #[must_use]
    pub fn abort_body(&self) -> Option<&'static str> {
        match self {
            Self::AuthenticationFailure
            | Self::MissingSubaction
            | Self::MalformedRequest { .. }
            | Self::RequestTooLarge { .. } => Some(SECURITY_CHECK_BODY),
            Self::UnknownCommand { .. } | Self::Io(_) | Self::SerializeResponse(_) => None,
        }
    }

    /// Creates a malformed request error from a serde error.
    pub fn from_json_error(source: serde_json::Error) -> Self {
        Self::MalformedRequest {
            message: source.to_string(),
            source: Some(source),
        }
    }

    /// Creates a malformed request error with a custom message.
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedRequest {
            message: message.into(),
            source: None,
        }
    }

    /// Creates an unknown command error.
    pub fn unknown_command(subaction: impl Into<String>) -> Self {
        Self::UnknownCommand {
            subaction: subaction.into(),
        }
    }

    /// Creates a request too large error.
    pub fn request_too_large(size: usize, max_size: usize) -> Self {
        Self::RequestTooLarge { size, max_size }
    }
}
