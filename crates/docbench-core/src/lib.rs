//! docbench core - backend-agnostic document CRUD adapters.
//!
//! This crate provides the uniform [`DocumentAdapter`] contract and its two
//! implementations: a MongoDB adapter that passes operations through to the
//! native driver, and a PostgreSQL adapter that emulates document semantics
//! on top of a schema-less JSONB column.

pub mod adapter;
pub mod config;
pub mod document;
pub mod error;
pub mod mongo;
pub mod normalize;
pub mod postgres;

pub use adapter::{create_adapter, BackendKind, ConnectionState, DocumentAdapter};
pub use config::ConnectionConfig;
pub use document::{Document, Filter, QueryOptions, SortDirection, UpdateReport, UpdateSpec};
pub use error::AdapterError;
pub use mongo::MongoAdapter;
pub use normalize::{CREATED_AT_FIELD, ID_FIELD, UPDATED_AT_FIELD};
pub use postgres::PostgresAdapter;

/// Convenience alias used throughout the adapter API.
pub type Result<T> = std::result::Result<T, AdapterError>;
