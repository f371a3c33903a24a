//! The uniform document adapter contract.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use crate::config::ConnectionConfig;
use crate::document::{Document, Filter, QueryOptions, UpdateReport, UpdateSpec};
use crate::error::AdapterError;
use crate::mongo::MongoAdapter;
use crate::postgres::PostgresAdapter;
use crate::Result;

/// The closed set of supported backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BackendKind {
    /// Native document store (MongoDB).
    Mongo,
    /// Relational store emulating documents on a JSONB column (PostgreSQL).
    Postgres,
}

impl std::fmt::Display for BackendKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BackendKind::Mongo => write!(f, "mongodb"),
            BackendKind::Postgres => write!(f, "postgres"),
        }
    }
}

impl std::str::FromStr for BackendKind {
    type Err = AdapterError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "mongo" | "mongodb" => Ok(BackendKind::Mongo),
            "postgres" | "postgresql" | "pg" => Ok(BackendKind::Postgres),
            other => Err(AdapterError::Translation(format!(
                "unknown backend '{}'",
                other
            ))),
        }
    }
}

/// Adapter connection state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    /// No connection established.
    Disconnected,
    /// Connection attempt in flight.
    Connecting,
    /// Pool established and usable.
    Connected,
}

/// Uniform CRUD/query contract implemented per backend.
///
/// All operations guard on connectivity first: any CRUD call issued while the
/// adapter is disconnected rejects with [`AdapterError::NotConnected`]. Every
/// document returned by a read or write has already passed the identity/shape
/// normalizer (see [`crate::normalize`]).
#[async_trait]
pub trait DocumentAdapter: Send + Sync {
    /// Which backend this adapter drives.
    fn backend(&self) -> BackendKind;

    /// Establish the connection pool. Connecting an already-connected
    /// adapter is a no-op; a failed attempt leaves no partial state behind.
    async fn connect(&self) -> Result<()>;

    /// Close the pool, clear cached collection state, and return to the
    /// disconnected state. Disconnecting a never-connected adapter is a no-op.
    async fn disconnect(&self) -> Result<()>;

    /// Whether the adapter can currently serve calls. Polls the underlying
    /// pool where the driver exposes that, not just the local flag.
    async fn is_connected(&self) -> bool;

    /// Ensure the named collection/table exists. Idempotent.
    async fn create_collection(&self, name: &str) -> Result<()>;

    /// Drop the named collection/table. Returns `true` only if something was
    /// actually dropped; dropping a nonexistent name is a `false` no-op.
    async fn drop_collection(&self, name: &str) -> Result<bool>;

    /// Insert one document; returns the normalized stored document.
    async fn insert_one(&self, collection: &str, doc: Document) -> Result<Document>;

    /// Insert a batch of documents. An empty batch returns an empty result
    /// without touching the backend.
    async fn insert_many(&self, collection: &str, docs: Vec<Document>) -> Result<Vec<Document>>;

    /// Find all documents matching the filter.
    async fn find(
        &self,
        collection: &str,
        filter: &Filter,
        options: &QueryOptions,
    ) -> Result<Vec<Document>>;

    /// Find the first document matching the filter.
    async fn find_one(&self, collection: &str, filter: &Filter) -> Result<Option<Document>>;

    /// Find a document by its identity value, as returned in `_id`.
    async fn find_by_id(&self, collection: &str, id: &Value) -> Result<Option<Document>>;

    /// Update the first document matching the filter; returns the post-update
    /// document, or `None` when nothing matched.
    async fn update_one(
        &self,
        collection: &str,
        filter: &Filter,
        update: &UpdateSpec,
    ) -> Result<Option<Document>>;

    /// Update every document matching the filter.
    async fn update_many(
        &self,
        collection: &str,
        filter: &Filter,
        update: &UpdateSpec,
    ) -> Result<UpdateReport>;

    /// Delete the first document matching the filter; `true` if one was
    /// deleted.
    async fn delete_one(&self, collection: &str, filter: &Filter) -> Result<bool>;

    /// Delete every document matching the filter; returns the deleted count.
    async fn delete_many(&self, collection: &str, filter: &Filter) -> Result<u64>;

    /// Count documents matching the filter (all documents for an empty
    /// filter).
    async fn count(&self, collection: &str, filter: &Filter) -> Result<u64>;

    /// Backend-native escape hatch. For PostgreSQL, a parameterized SQL
    /// statement returning rows as a JSON array; for MongoDB, a database
    /// command given as a JSON document (params ignored).
    async fn execute_raw(&self, query: &str, params: Vec<Value>) -> Result<Value>;
}

/// Build an adapter for the given backend.
///
/// Callers own the returned instance and pass it to whatever drives it;
/// there is no process-wide adapter registry.
pub fn create_adapter(kind: BackendKind, config: ConnectionConfig) -> Arc<dyn DocumentAdapter> {
    match kind {
        BackendKind::Mongo => Arc::new(MongoAdapter::new(config)),
        BackendKind::Postgres => Arc::new(PostgresAdapter::new(config)),
    }
}
