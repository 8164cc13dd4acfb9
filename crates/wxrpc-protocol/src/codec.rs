//! Pure encode and decode functions for single envelope lines.

use serde::Serialize;
use serde_json::Value;

use crate::envelope::{Request, RequestId, Response};
use crate::error::CodecError;

/// Serialises an envelope as one JSON object followed by `\n`.
///
/// Compact JSON escapes control characters inside strings, so the only
/// newline in the output is the terminator.
///
/// # Errors
///
/// Returns [`CodecError::Serialize`] if the value cannot be represented as
/// JSON.
pub fn encode<T: Serialize>(envelope: &T) -> Result<Vec<u8>, CodecError> {
    let mut line = serde_json::to_vec(envelope).map_err(CodecError::Serialize)?;
    line.push(b'\n');
    Ok(line)
}

/// Parses a request line.
///
/// Trailing whitespace, including the terminator, is ignored. The line must
/// be a JSON object with a string `id` and a non-empty string `tool`; `args`
/// defaults to an empty map.
///
/// # Errors
///
/// Returns [`CodecError::MalformedEnvelope`] when the line is empty, is not
/// valid JSON, or lacks a required field.
pub fn decode_request(line: &[u8]) -> Result<Request, CodecError> {
    let trimmed = non_empty(line, "empty request line")?;
    let request: Request = serde_json::from_slice(trimmed).map_err(CodecError::from_json_error)?;
    if request.operation().trim().is_empty() {
        return Err(CodecError::malformed("tool field is empty"));
    }
    Ok(request)
}

/// Parses a response line.
///
/// The line must be a JSON object with an `id` (string or `null`) and a
/// boolean `ok`.
///
/// # Errors
///
/// Returns [`CodecError::MalformedEnvelope`] when the line is empty, is not
/// valid JSON, or lacks a required field.
pub fn decode_response(line: &[u8]) -> Result<Response, CodecError> {
    let trimmed = non_empty(line, "empty response line")?;
    serde_json::from_slice(trimmed).map_err(CodecError::from_json_error)
}

/// Best-effort extraction of a string `id` from a line that failed to decode.
///
/// Used to address the error response for a request that is valid JSON but
/// does not match the request schema.
#[must_use]
pub fn recover_request_id(line: &[u8]) -> Option<RequestId> {
    let value: Value = serde_json::from_slice(trim_trailing_whitespace(line)).ok()?;
    value.get("id").and_then(Value::as_str).map(RequestId::new)
}

fn non_empty<'a>(line: &'a [u8], message: &'static str) -> Result<&'a [u8], CodecError> {
    let trimmed = trim_trailing_whitespace(line);
    if trimmed.is_empty() {
        return Err(CodecError::malformed(message));
    }
    Ok(trimmed)
}

/// Trims trailing ASCII whitespace from a byte slice.
fn trim_trailing_whitespace(bytes: &[u8]) -> &[u8] {
    let end = bytes
        .iter()
        .rposition(|b| !b.is_ascii_whitespace())
        .map_or(0, |pos| pos + 1);
    bytes.split_at(end).0
}
