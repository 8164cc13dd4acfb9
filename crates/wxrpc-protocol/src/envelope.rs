//! Request and response envelope types.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::error::ArgumentError;

/// Correlation id linking a request to its response.
///
/// The id is opaque to the server, which only echoes it back. The client
/// renders its counter as a decimal string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestId(String);

impl RequestId {
    /// Wraps an id string.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the id as sent on the wire.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl From<u64> for RequestId {
    fn from(value: u64) -> Self {
        Self(value.to_string())
    }
}

impl From<&str> for RequestId {
    fn from(value: &str) -> Self {
        Self(value.to_owned())
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(&self.0)
    }
}

/// Named arguments passed to an operation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Arguments(Map<String, Value>);

impl Arguments {
    /// Creates an empty argument map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an argument, builder style.
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(name, value);
        self
    }

    /// Inserts or replaces an argument.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.0.insert(name.into(), value.into());
    }

    /// Looks up an argument by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    /// Returns a string argument that the operation cannot do without.
    ///
    /// # Errors
    ///
    /// Returns [`ArgumentError`] when the argument is absent or not a string.
    pub fn required_str(&self, name: &str) -> Result<&str, ArgumentError> {
        match self.optional_str(name)? {
            Some(value) => Ok(value),
            None => Err(ArgumentError::Missing {
                name: name.to_owned(),
            }),
        }
    }

    /// Returns a string argument, or `None` when it is absent or `null`.
    ///
    /// # Errors
    ///
    /// Returns [`ArgumentError::WrongType`] when the argument is present but
    /// not a string.
    pub fn optional_str(&self, name: &str) -> Result<Option<&str>, ArgumentError> {
        match self.0.get(name) {
            None | Some(Value::Null) => Ok(None),
            Some(Value::String(value)) => Ok(Some(value.as_str())),
            Some(_) => Err(ArgumentError::WrongType {
                name: name.to_owned(),
                expected: "string",
            }),
        }
    }

    /// Returns `true` when no arguments were supplied.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Map<String, Value>> for Arguments {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

/// Request envelope sent by the client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Request {
    id: RequestId,
    #[serde(rename = "tool")]
    operation: String,
    #[serde(rename = "args", default)]
    arguments: Arguments,
}

impl Request {
    /// Builds a request envelope.
    pub fn new(id: RequestId, operation: impl Into<String>, arguments: Arguments) -> Self {
        Self {
            id,
            operation: operation.into(),
            arguments,
        }
    }

    /// Correlation id chosen by the client.
    #[must_use]
    pub const fn id(&self) -> &RequestId {
        &self.id
    }

    /// Name of the operation to invoke.
    #[must_use]
    pub fn operation(&self) -> &str {
        self.operation.as_str()
    }

    /// Arguments for the operation.
    #[must_use]
    pub const fn arguments(&self) -> &Arguments {
        &self.arguments
    }

    /// Splits the envelope into its parts.
    #[must_use]
    pub fn into_parts(self) -> (RequestId, String, Arguments) {
        (self.id, self.operation, self.arguments)
    }
}

/// Outcome carried by a response.
#[derive(Debug, Clone, PartialEq)]
pub enum ResponseBody {
    /// The operation completed and produced this value.
    Success(Value),
    /// The request failed with this explanation.
    Failure(String),
}

/// Response envelope produced by the server.
///
/// The id is `None` only when the server could not recover one from the
/// request line; it is then sent as `null`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(into = "WireResponse", from = "WireResponse")]
pub struct Response {
    id: Option<RequestId>,
    body: ResponseBody,
}

impl Response {
    /// Builds a successful response.
    #[must_use]
    pub const fn success(id: RequestId, result: Value) -> Self {
        Self {
            id: Some(id),
            body: ResponseBody::Success(result),
        }
    }

    /// Builds a failure response.
    pub fn failure(id: Option<RequestId>, error: impl Into<String>) -> Self {
        Self {
            id,
            body: ResponseBody::Failure(error.into()),
        }
    }

    /// Id of the originating request, if it could be recovered.
    #[must_use]
    pub const fn id(&self) -> Option<&RequestId> {
        self.id.as_ref()
    }

    /// Returns `true` for a successful response.
    #[must_use]
    pub const fn is_ok(&self) -> bool {
        matches!(self.body, ResponseBody::Success(_))
    }

    /// Outcome carried by the response.
    #[must_use]
    pub const fn body(&self) -> &ResponseBody {
        &self.body
    }

    /// Result value for a successful response.
    #[must_use]
    pub const fn result(&self) -> Option<&Value> {
        match &self.body {
            ResponseBody::Success(value) => Some(value),
            ResponseBody::Failure(_) => None,
        }
    }

    /// Error text for a failure response.
    #[must_use]
    pub fn error(&self) -> Option<&str> {
        match &self.body {
            ResponseBody::Success(_) => None,
            ResponseBody::Failure(message) => Some(message.as_str()),
        }
    }

    /// Converts the outcome into a `Result`.
    ///
    /// # Errors
    ///
    /// Returns the error text of a failure response.
    pub fn into_result(self) -> Result<Value, String> {
        match self.body {
            ResponseBody::Success(value) => Ok(value),
            ResponseBody::Failure(message) => Err(message),
        }
    }
}

const UNSPECIFIED_ERROR: &str = "unspecified error";

/// Flat on-the-wire shape of a response.
///
/// `result` is present only when `ok` is true and `error` only when it is
/// false. `id` must be present but may be `null`.
#[derive(Serialize, Deserialize)]
struct WireResponse {
    #[serde(deserialize_with = "nullable_id")]
    id: Option<RequestId>,
    ok: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    result: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

fn nullable_id<'de, D>(deserializer: D) -> Result<Option<RequestId>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<RequestId>::deserialize(deserializer)
}

impl From<Response> for WireResponse {
    fn from(response: Response) -> Self {
        match response.body {
            ResponseBody::Success(value) => Self {
                id: response.id,
                ok: true,
                result: Some(value),
                error: None,
            },
            ResponseBody::Failure(message) => Self {
                id: response.id,
                ok: false,
                result: None,
                error: Some(message),
            },
        }
    }
}

impl From<WireResponse> for Response {
    fn from(wire: WireResponse) -> Self {
        let body = if wire.ok {
            ResponseBody::Success(wire.result.unwrap_or(Value::Null))
        } else {
            ResponseBody::Failure(wire.error.unwrap_or_else(|| UNSPECIFIED_ERROR.to_owned()))
        };
        Self { id: wire.id, body }
    }
}
