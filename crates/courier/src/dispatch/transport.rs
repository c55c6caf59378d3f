//! Single-request transport adapter.
//!
//! Each call to [`Dispatcher::serve`] reads one bounded request line, runs a
//! full dispatch cycle, and writes exactly one response body before
//! returning.

use std::io::{self, Read, Write};

use tracing::{debug, warn};

use super::dispatcher::{DISPATCH_TARGET, Dispatcher};
use super::errors::DispatchError;
use super::request::Request;
use super::response::ResponseWriter;

/// Maximum size of a single request line in bytes.
pub const MAX_REQUEST_BYTES: usize = 1024 * 1024;

impl Dispatcher {
    /// Reads one request from `reader`, dispatches it, and writes the single
    /// response body to `writer`.
    ///
    /// Aborts are terminal outcomes, not errors: they write their abort body
    /// (possibly nothing) and return `Ok`.
    ///
    /// # Errors
    ///
    /// Returns an error only when writing the response fails.
    pub fn serve<R: Read, W: Write>(&self, mut reader: R, writer: W) -> Result<(), DispatchError> {
        let writer = ResponseWriter::new(writer);
        let outcome = read_request_line(&mut reader)
            .and_then(|line| {
                line.ok_or_else(|| DispatchError::malformed("client disconnected without request"))
            })
            .and_then(|line| Request::parse(&line))
            .and_then(|request| self.dispatch(request));

        match outcome {
            Ok(envelope) => writer.write_envelope(&envelope),
            Err(error) => {
                match &error {
                    DispatchError::UnknownCommand { .. } => {
                        debug!(target: DISPATCH_TARGET, %error, "request aborted");
                    }
                    _ => warn!(target: DISPATCH_TARGET, %error, "request aborted"),
                }
                writer.write_abort(&error)
            }
        }
    }
}

/// Reads a bounded request line from the stream.
///
/// Returns `Ok(None)` if the stream ends without data and `Ok(Some(bytes))`
/// once a newline or EOF with partial data is seen.
fn read_request_line<R: Read>(stream: &mut R) -> Result<Option<Vec<u8>>, DispatchError> {
    let mut buffer = Vec::new();
    let mut chunk = [0_u8; 1024];

    loop {
        let bytes_read = read_with_retry(stream, &mut chunk)?;
        let Some(read) = chunk.get(..bytes_read) else {
            return Err(DispatchError::malformed("reader reported an invalid length"));
        };

        if read.is_empty() {
            return Ok(if buffer.is_empty() {
                None
            } else {
                Some(buffer)
            });
        }

        if let Some(newline_pos) = read.iter().position(|b| *b == b'\n') {
            buffer.extend_from_slice(read.get(..=newline_pos).unwrap_or(read));
            enforce_limit(buffer.len())?;
            return Ok(Some(buffer));
        }

        buffer.extend_from_slice(read);
        enforce_limit(buffer.len())?;
    }
}

/// Reads from the stream, retrying on interrupts.
fn read_with_retry<R: Read>(stream: &mut R, buf: &mut [u8]) -> io::Result<usize> {
    loop {
        match stream.read(buf) {
            Ok(n) => return Ok(n),
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
}

/// Enforces the maximum request size limit.
fn enforce_limit(size: usize) -> Result<(), DispatchError> {
    if size > MAX_REQUEST_BYTES {
        return Err(DispatchError::request_too_large(size, MAX_REQUEST_BYTES));
    }
    Ok(())
}
