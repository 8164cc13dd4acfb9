//! Pluggable operation contract.

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::Value;

use wxrpc_protocol::Arguments;

use super::DispatchError;

/// A named capability the dispatcher can invoke.
///
/// Implementations are shared by every connection and may be invoked from
/// several threads at once. They must either return a complete result or an
/// error.
pub trait Operation: Send + Sync + 'static {
    /// Describes the operation for `tools.list`.
    fn descriptor(&self) -> OperationDescriptor;

    /// Runs the operation.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::InvalidArguments`] for unusable arguments or
    /// an operation-specific failure.
    fn invoke(&self, arguments: &Arguments) -> Result<Value, DispatchError>;
}

/// Declared shape of an operation, as published by `tools.list`.
///
/// Argument and return fields map a name to a short type label such as
/// `string` or `number?`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OperationDescriptor {
    name: String,
    args: BTreeMap<String, String>,
    returns: BTreeMap<String, String>,
}

impl OperationDescriptor {
    /// Starts a descriptor with no declared fields.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            args: BTreeMap::new(),
            returns: BTreeMap::new(),
        }
    }

    /// Declares an argument.
    #[must_use]
    pub fn arg(mut self, name: impl Into<String>, kind: impl Into<String>) -> Self {
        self.args.insert(name.into(), kind.into());
        self
    }

    /// Declares a result field.
    #[must_use]
    pub fn returns(mut self, name: impl Into<String>, kind: impl Into<String>) -> Self {
        self.returns.insert(name.into(), kind.into());
        self
    }

    /// Operation name.
    #[must_use]
    pub fn name(&self) -> &str {
        self.name.as_str()
    }
}
