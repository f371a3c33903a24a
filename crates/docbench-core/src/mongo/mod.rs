//! MongoDB document adapter.
//!
//! This backend is a thin pass-through: filters and updates are already in
//! the driver's native dialect, so the adapter only manages the connection
//! lifecycle, identity/timestamp shaping, and collection existence caching.

mod convert;

pub use convert::{bson_to_json, document_to_json_map, json_map_to_document, json_to_bson};

use std::collections::HashSet;

use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::bson::{self, doc, Bson};
use mongodb::options::{ClientOptions, ReturnDocument};
use mongodb::{Client, Collection, Database};
use parking_lot::RwLock;
use serde_json::Value;

use crate::adapter::{BackendKind, ConnectionState, DocumentAdapter};
use crate::config::ConnectionConfig;
use crate::document::{Document, Filter, QueryOptions, UpdateReport, UpdateSpec};
use crate::error::AdapterError;
use crate::normalize::{strip_reserved, CREATED_AT_FIELD, ID_FIELD, RESERVED_FIELDS, UPDATED_AT_FIELD};
use crate::Result;

use convert::{bson_datetime_to_string, parse_object_id};

const BACKEND: BackendKind = BackendKind::Mongo;

/// Document adapter backed by MongoDB.
pub struct MongoAdapter {
    config: ConnectionConfig,
    state: RwLock<ConnectionState>,
    client: RwLock<Option<Client>>,
    known_collections: RwLock<HashSet<String>>,
}

impl MongoAdapter {
    /// Create a disconnected adapter for the given configuration.
    pub fn new(config: ConnectionConfig) -> Self {
        Self {
            config,
            state: RwLock::new(ConnectionState::Disconnected),
            client: RwLock::new(None),
            known_collections: RwLock::new(HashSet::new()),
        }
    }

    fn connection_uri(&self) -> String {
        format!(
            "mongodb://{}{}:{}/",
            self.config.credentials(),
            self.config.host,
            self.config.port
        )
    }

    /// The database handle, or `NotConnected` when the adapter is down.
    fn database(&self) -> Result<Database> {
        let client = self.client.read();
        match (client.as_ref(), *self.state.read()) {
            (Some(client), ConnectionState::Connected) => {
                Ok(client.database(&self.config.database))
            }
            _ => Err(AdapterError::NotConnected { backend: BACKEND }),
        }
    }

    fn collection(&self, name: &str) -> Result<Collection<bson::Document>> {
        Ok(self.database()?.collection::<bson::Document>(name))
    }

    async fn collection_exists(&self, db: &Database, name: &str) -> Result<bool> {
        let names = db.list_collection_names().await.map_err(|e| {
            AdapterError::operation(BACKEND, "listCollections", name, e)
        })?;
        Ok(names.iter().any(|n| n == name))
    }

    /// Convert a logical filter, mapping `_id` values back into ObjectIds.
    fn filter_to_document(filter: &Filter) -> Result<bson::Document> {
        fn id_bson(value: &Value) -> Result<Bson> {
            parse_object_id(value).map(Bson::ObjectId)
        }

        let mut doc = bson::Document::new();
        for (field, condition) in filter {
            if field != ID_FIELD {
                doc.insert(field.clone(), json_to_bson(condition));
                continue;
            }
            match condition {
                Value::Object(map) if map.keys().any(|k| k.starts_with('$')) => {
                    let mut operators = bson::Document::new();
                    for (op, operand) in map {
                        match (op.as_str(), operand) {
                            ("$in", Value::Array(values)) => {
                                let ids = values
                                    .iter()
                                    .map(id_bson)
                                    .collect::<Result<Vec<_>>>()?;
                                operators.insert("$in", Bson::Array(ids));
                            }
                            (_, operand) => {
                                operators.insert(op.clone(), id_bson(operand)?);
                            }
                        }
                    }
                    doc.insert(ID_FIELD, operators);
                }
                literal => {
                    doc.insert(ID_FIELD, id_bson(literal)?);
                }
            }
        }
        Ok(doc)
    }

    /// Convert a logical update, wrapping a plain document as a direct `$set`
    /// and stamping the adapter-owned modification timestamp.
    fn to_update_document(update: &UpdateSpec) -> bson::Document {
        let has_operators = update.keys().any(|k| k.starts_with('$'));
        let mut doc = if has_operators {
            json_map_to_document(update)
        } else {
            let mut wrapper = bson::Document::new();
            wrapper.insert("$set", json_map_to_document(update));
            wrapper
        };

        let now = bson::DateTime::now();
        if let Ok(set) = doc.get_document_mut("$set") {
            for field in RESERVED_FIELDS {
                set.remove(field);
            }
            set.insert(UPDATED_AT_FIELD, now);
        } else {
            let mut set = bson::Document::new();
            set.insert(UPDATED_AT_FIELD, now);
            doc.insert("$set", set);
        }
        doc
    }

    /// Stored BSON document to the normalized caller-facing shape.
    fn normalize_document(doc: bson::Document) -> Document {
        document_to_json_map(doc)
    }
}

#[async_trait]
impl DocumentAdapter for MongoAdapter {
    fn backend(&self) -> BackendKind {
        BACKEND
    }

    async fn connect(&self) -> Result<()> {
        if self.is_connected().await {
            return Ok(());
        }
        *self.state.write() = ConnectionState::Connecting;

        let uri = self.connection_uri();
        let result = async {
            let mut options = ClientOptions::parse(&uri)
                .await
                .map_err(|e| AdapterError::connection(BACKEND, e))?;
            options.max_pool_size = Some(self.config.max_pool_size);
            options.connect_timeout = Some(self.config.connect_timeout);
            options.server_selection_timeout = Some(self.config.connect_timeout);
            options.max_idle_time = Some(self.config.idle_timeout);

            let client =
                Client::with_options(options).map_err(|e| AdapterError::connection(BACKEND, e))?;

            // The driver connects lazily; a ping makes connect() fail fast
            // instead of deferring the error to the first CRUD call.
            client
                .database(&self.config.database)
                .run_command(doc! {"ping": 1})
                .await
                .map_err(|e| AdapterError::connection(BACKEND, e))?;
            Ok(client)
        }
        .await;

        match result {
            Ok(client) => {
                *self.client.write() = Some(client);
                *self.state.write() = ConnectionState::Connected;
                tracing::info!(host = %self.config.host, port = self.config.port, "mongodb connected");
                Ok(())
            }
            Err(e) => {
                *self.client.write() = None;
                *self.state.write() = ConnectionState::Disconnected;
                Err(e)
            }
        }
    }

    async fn disconnect(&self) -> Result<()> {
        let client = self.client.write().take();
        if let Some(client) = client {
            client.shutdown().await;
            tracing::info!("mongodb disconnected");
        }
        self.known_collections.write().clear();
        *self.state.write() = ConnectionState::Disconnected;
        Ok(())
    }

    async fn is_connected(&self) -> bool {
        // The driver exposes no pool liveness probe, so connectivity here is
        // the adapter's own state.
        *self.state.read() == ConnectionState::Connected && self.client.read().is_some()
    }

    async fn create_collection(&self, name: &str) -> Result<()> {
        let db = self.database()?;
        if self.known_collections.read().contains(name) {
            return Ok(());
        }
        if !self.collection_exists(&db, name).await? {
            if let Err(e) = db.create_collection(name).await {
                let already_exists =
                    matches!(*e.kind, mongodb::error::ErrorKind::Command(ref c) if c.code == 48);
                if !already_exists {
                    return Err(AdapterError::operation(BACKEND, "createCollection", name, e));
                }
            }
        }
        self.known_collections.write().insert(name.to_string());
        Ok(())
    }

    async fn drop_collection(&self, name: &str) -> Result<bool> {
        let db = self.database()?;
        self.known_collections.write().remove(name);

        if !self.collection_exists(&db, name).await? {
            return Ok(false);
        }
        db.collection::<bson::Document>(name)
            .drop()
            .await
            .map_err(|e| AdapterError::operation(BACKEND, "dropCollection", name, e))?;
        Ok(true)
    }

    async fn insert_one(&self, collection: &str, doc: Document) -> Result<Document> {
        let coll = self.collection(collection)?;

        let mut payload = doc;
        strip_reserved(&mut payload);
        let now = bson::DateTime::now();
        let mut stored = json_map_to_document(&payload);
        stored.insert(CREATED_AT_FIELD, now);
        stored.insert(UPDATED_AT_FIELD, now);

        let result = coll
            .insert_one(&stored)
            .await
            .map_err(|e| AdapterError::operation(BACKEND, "insertOne", collection, e))?;

        let mut normalized = payload;
        normalized.insert(ID_FIELD.to_string(), bson_to_json(result.inserted_id));
        let timestamp = Value::String(bson_datetime_to_string(now));
        normalized.insert(CREATED_AT_FIELD.to_string(), timestamp.clone());
        normalized.insert(UPDATED_AT_FIELD.to_string(), timestamp);
        Ok(normalized)
    }

    async fn insert_many(&self, collection: &str, docs: Vec<Document>) -> Result<Vec<Document>> {
        let coll = self.collection(collection)?;
        if docs.is_empty() {
            return Ok(Vec::new());
        }

        let now = bson::DateTime::now();
        let mut payloads = Vec::with_capacity(docs.len());
        let mut stored = Vec::with_capacity(docs.len());
        for mut payload in docs {
            strip_reserved(&mut payload);
            let mut doc = json_map_to_document(&payload);
            doc.insert(CREATED_AT_FIELD, now);
            doc.insert(UPDATED_AT_FIELD, now);
            stored.push(doc);
            payloads.push(payload);
        }

        let result = coll
            .insert_many(&stored)
            .await
            .map_err(|e| AdapterError::operation(BACKEND, "insertMany", collection, e))?;

        let timestamp = Value::String(bson_datetime_to_string(now));
        let mut normalized = Vec::with_capacity(payloads.len());
        for (index, mut payload) in payloads.into_iter().enumerate() {
            let id = result.inserted_ids.get(&index).cloned().unwrap_or(Bson::Null);
            payload.insert(ID_FIELD.to_string(), bson_to_json(id));
            payload.insert(CREATED_AT_FIELD.to_string(), timestamp.clone());
            payload.insert(UPDATED_AT_FIELD.to_string(), timestamp.clone());
            normalized.push(payload);
        }
        Ok(normalized)
    }

    async fn find(
        &self,
        collection: &str,
        filter: &Filter,
        options: &QueryOptions,
    ) -> Result<Vec<Document>> {
        let coll = self.collection(collection)?;
        let filter_doc = Self::filter_to_document(filter)?;

        let mut find = coll.find(filter_doc);
        if !options.sort.is_empty() {
            let mut sort = bson::Document::new();
            for (field, direction) in &options.sort {
                sort.insert(field.clone(), direction.as_order());
            }
            find = find.sort(sort);
        }
        if let Some(limit) = options.limit {
            find = find.limit(limit as i64);
        }
        if let Some(skip) = options.skip {
            find = find.skip(skip);
        }
        if !options.projection.is_empty() {
            let mut projection = bson::Document::new();
            for field in &options.projection {
                projection.insert(field.clone(), 1);
            }
            find = find.projection(projection);
        }

        let docs: Vec<bson::Document> = find
            .await
            .map_err(|e| AdapterError::operation(BACKEND, "find", collection, e))?
            .try_collect()
            .await
            .map_err(|e| AdapterError::operation(BACKEND, "find", collection, e))?;

        Ok(docs.into_iter().map(Self::normalize_document).collect())
    }

    async fn find_one(&self, collection: &str, filter: &Filter) -> Result<Option<Document>> {
        let coll = self.collection(collection)?;
        let filter_doc = Self::filter_to_document(filter)?;
        let doc = coll
            .find_one(filter_doc)
            .await
            .map_err(|e| AdapterError::operation(BACKEND, "findOne", collection, e))?;
        Ok(doc.map(Self::normalize_document))
    }

    async fn find_by_id(&self, collection: &str, id: &Value) -> Result<Option<Document>> {
        let coll = self.collection(collection)?;
        let oid = parse_object_id(id)?;
        let doc = coll
            .find_one(doc! {"_id": oid})
            .await
            .map_err(|e| AdapterError::operation(BACKEND, "findById", collection, e))?;
        Ok(doc.map(Self::normalize_document))
    }

    async fn update_one(
        &self,
        collection: &str,
        filter: &Filter,
        update: &UpdateSpec,
    ) -> Result<Option<Document>> {
        let coll = self.collection(collection)?;
        let filter_doc = Self::filter_to_document(filter)?;
        let update_doc = Self::to_update_document(update);

        let doc = coll
            .find_one_and_update(filter_doc, update_doc)
            .return_document(ReturnDocument::After)
            .await
            .map_err(|e| AdapterError::operation(BACKEND, "updateOne", collection, e))?;
        Ok(doc.map(Self::normalize_document))
    }

    async fn update_many(
        &self,
        collection: &str,
        filter: &Filter,
        update: &UpdateSpec,
    ) -> Result<UpdateReport> {
        let coll = self.collection(collection)?;
        let filter_doc = Self::filter_to_document(filter)?;
        let update_doc = Self::to_update_document(update);

        let result = coll
            .update_many(filter_doc, update_doc)
            .await
            .map_err(|e| AdapterError::operation(BACKEND, "updateMany", collection, e))?;
        Ok(UpdateReport {
            matched_count: result.matched_count,
            modified_count: result.modified_count,
        })
    }

    async fn delete_one(&self, collection: &str, filter: &Filter) -> Result<bool> {
        let coll = self.collection(collection)?;
        let filter_doc = Self::filter_to_document(filter)?;
        let result = coll
            .delete_one(filter_doc)
            .await
            .map_err(|e| AdapterError::operation(BACKEND, "deleteOne", collection, e))?;
        Ok(result.deleted_count > 0)
    }

    async fn delete_many(&self, collection: &str, filter: &Filter) -> Result<u64> {
        let coll = self.collection(collection)?;
        let filter_doc = Self::filter_to_document(filter)?;
        let result = coll
            .delete_many(filter_doc)
            .await
            .map_err(|e| AdapterError::operation(BACKEND, "deleteMany", collection, e))?;
        Ok(result.deleted_count)
    }

    async fn count(&self, collection: &str, filter: &Filter) -> Result<u64> {
        let coll = self.collection(collection)?;
        let filter_doc = Self::filter_to_document(filter)?;
        coll.count_documents(filter_doc)
            .await
            .map_err(|e| AdapterError::operation(BACKEND, "count", collection, e))
    }

    async fn execute_raw(&self, query: &str, params: Vec<Value>) -> Result<Value> {
        let db = self.database()?;
        if !params.is_empty() {
            tracing::debug!("mongodb raw queries take a command document; params ignored");
        }

        let parsed: Value = serde_json::from_str(query)
            .map_err(|e| AdapterError::Translation(format!("invalid raw command: {}", e)))?;
        let command = match parsed {
            Value::Object(map) => json_map_to_document(&map),
            _ => {
                return Err(AdapterError::Translation(
                    "raw command must be a JSON object".to_string(),
                ))
            }
        };

        let reply = db
            .run_command(command)
            .await
            .map_err(|e| AdapterError::operation(BACKEND, "executeRawQuery", "-", e))?;
        Ok(Value::Object(document_to_json_map(reply)))
    }
}

impl std::fmt::Debug for MongoAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MongoAdapter")
            .field("host", &self.config.host)
            .field("port", &self.config.port)
            .field("database", &self.config.database)
            .field("state", &*self.state.read())
            .finish()
    }
}
