//! Request dispatch for the gateway endpoint.
//!
//! A dispatch cycle validates the request token, resolves the handler
//! registered under the request's subaction, invokes it inside a fault
//! boundary, and normalizes whatever it produced into one
//! [`ResponseEnvelope`].
//!
//! ## Protocol
//!
//! Callers send a single JSON request line:
//!
//! ```json
//! {"subaction":"get_status","token":"5f3c9d0e1a2b3c4d5e6f","payload":{}}
//! ```
//!
//! The gateway answers with exactly one body and closes the cycle:
//!
//! ```json
//! {"fatal_error":true,"fatal_error_message":"PHP Fatal error (panic) has occurred during ..."}
//! ```
//!
//! ## Aborts
//!
//! A rejected token, a missing subaction, or an unreadable request writes the
//! bare text `Security check`. An unknown subaction writes nothing at all.

mod dispatcher;
mod errors;
mod fault;
mod request;
mod response;
mod transport;

pub use self::dispatcher::{Dispatcher, FAULT_LOG_TAG, TOKEN_CONTEXT};
pub use self::errors::{DispatchError, SECURITY_CHECK_BODY};
pub use self::fault::{PANIC_FAULT_CLASS, invoke};
pub use self::request::{NESTED_PAYLOAD_FIELD, Request};
pub use self::response::{DomainErrorBody, FaultBody, Flag, ResponseEnvelope, ResponseWriter};
pub use self::transport::MAX_REQUEST_BYTES;
