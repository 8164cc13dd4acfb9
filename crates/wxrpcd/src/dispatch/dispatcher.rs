//! Operation registry and invocation.

use std::collections::BTreeMap;
use std::collections::btree_map::Entry;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use serde_json::{Value, json};
use thiserror::Error;

use wxrpc_protocol::Arguments;

use super::{DispatchError, Operation, OperationDescriptor};

/// Name of the built-in introspection operation.
pub const TOOLS_LIST: &str = "tools.list";

/// Errors raised while assembling a [`Dispatcher`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    /// Two operations claimed the same name.
    #[error("operation '{name}' is already registered")]
    Duplicate {
        /// Contested name.
        name: String,
    },
}

/// Immutable name-to-operation registry shared by all connections.
///
/// `tools.list` is always available and lists every operation, itself
/// included, in name order.
#[derive(Clone)]
pub struct Dispatcher {
    operations: BTreeMap<String, Arc<dyn Operation>>,
    catalogue: Value,
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter
            .debug_struct("Dispatcher")
            .field("operations", &self.operations.keys().collect::<Vec<_>>())
            .finish_non_exhaustive()
    }
}

impl Dispatcher {
    /// Starts an empty registry.
    #[must_use]
    pub fn builder() -> DispatcherBuilder {
        DispatcherBuilder::default()
    }

    /// Invokes `operation` with `arguments`.
    ///
    /// A panicking operation is contained and reported as
    /// [`DispatchError::Internal`].
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::UnknownOperation`] for an unregistered name,
    /// or whatever the operation itself fails with.
    pub fn dispatch(&self, operation: &str, arguments: &Arguments) -> Result<Value, DispatchError> {
        if operation == TOOLS_LIST {
            return Ok(self.catalogue.clone());
        }
        let handler = self
            .operations
            .get(operation)
            .ok_or_else(|| DispatchError::unknown_operation(operation))?;
        panic::catch_unwind(AssertUnwindSafe(|| handler.invoke(arguments))).unwrap_or_else(
            |_| {
                Err(DispatchError::internal(format!(
                    "operation '{operation}' panicked"
                )))
            },
        )
    }

    /// Registered operation names, `tools.list` excluded, in order.
    pub fn operation_names(&self) -> impl Iterator<Item = &str> {
        self.operations.keys().map(String::as_str)
    }

    /// Result value returned by `tools.list`.
    #[must_use]
    pub const fn catalogue(&self) -> &Value {
        &self.catalogue
    }
}

/// Builder for [`Dispatcher`].
#[derive(Default)]
pub struct DispatcherBuilder {
    operations: BTreeMap<String, Arc<dyn Operation>>,
}

impl std::fmt::Debug for DispatcherBuilder {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter
            .debug_struct("DispatcherBuilder")
            .field("operations", &self.operations.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl DispatcherBuilder {
    /// Adds an operation under the name in its descriptor.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::Duplicate`] when the name is taken, including
    /// by the built-in `tools.list`.
    pub fn register<O: Operation>(mut self, operation: O) -> Result<Self, RegistryError> {
        let name = operation.descriptor().name().to_owned();
        if name == TOOLS_LIST {
            return Err(RegistryError::Duplicate { name });
        }
        match self.operations.entry(name) {
            Entry::Occupied(entry) => Err(RegistryError::Duplicate {
                name: entry.key().clone(),
            }),
            Entry::Vacant(entry) => {
                entry.insert(Arc::new(operation));
                Ok(self)
            }
        }
    }

    /// Freezes the registry.
    #[must_use]
    pub fn build(self) -> Dispatcher {
        let mut descriptors: Vec<OperationDescriptor> = self
            .operations
            .values()
            .map(|operation| operation.descriptor())
            .collect();
        descriptors.push(OperationDescriptor::new(TOOLS_LIST).returns("tools", "array"));
        descriptors.sort_by(|left, right| left.name().cmp(right.name()));
        let catalogue = json!({ "tools": descriptors });
        Dispatcher {
            operations: self.operations,
            catalogue,
        }
    }
}
