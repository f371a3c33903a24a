//! Adapter error types.

use thiserror::Error;

use crate::adapter::BackendKind;

/// Errors surfaced by the document adapters.
///
/// Backend-native driver errors never cross the adapter boundary; they are
/// wrapped here together with the backend name and, for CRUD failures, the
/// collection and operation that triggered them.
#[derive(Debug, Error)]
pub enum AdapterError {
    /// Connect or disconnect failure.
    #[error("{backend} connection failed: {message}")]
    Connection {
        backend: BackendKind,
        message: String,
    },

    /// A CRUD call was issued while the adapter is not connected.
    #[error("{backend} adapter is not connected")]
    NotConnected { backend: BackendKind },

    /// A filter or update shape the translator cannot compile.
    #[error("invalid query or update: {0}")]
    Translation(String),

    /// A backend operation failed.
    #[error("{backend} {operation} on '{collection}' failed: {message}")]
    Operation {
        backend: BackendKind,
        operation: &'static str,
        collection: String,
        message: String,
    },
}

impl AdapterError {
    /// Wrap a backend connect/disconnect failure.
    pub fn connection(backend: BackendKind, cause: impl std::fmt::Display) -> Self {
        Self::Connection {
            backend,
            message: cause.to_string(),
        }
    }

    /// Wrap a backend operation failure with its call context.
    pub fn operation(
        backend: BackendKind,
        operation: &'static str,
        collection: &str,
        cause: impl std::fmt::Display,
    ) -> Self {
        Self::Operation {
            backend,
            operation,
            collection: collection.to_string(),
            message: cause.to_string(),
        }
    }
}
