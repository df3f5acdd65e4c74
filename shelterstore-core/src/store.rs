//! The generic CRUD surface over one document collection.
//!
//! [`DocumentStore`] validates operation arguments, tracks the active
//! database/collection pair, and delegates execution to a [`StoreBackend`].
//! One store addresses one collection at a time; switch operations repoint it
//! without reconnecting.
//!
//! # Example
//!
//! ```ignore
//! use shelterstore_core::store::DocumentStore;
//! use bson::doc;
//!
//! let mut store = DocumentStore::new(backend, "AAC", "animals")?;
//!
//! let id = store.create(doc! { "animal_type": "Dog" }).await?;
//! let found = store.read(Some(doc! { "_id": id }.into())).await?;
//!
//! store.switch_collection("outcomes");
//! ```

use bson::{Bson, Document};
use serde::Serialize;
use tracing::{debug, warn};

use crate::{
    backend::StoreBackend,
    error::{StoreError, StoreResult},
};

/// The live binding to a database/collection pair.
///
/// A handle is never mutated in place: switch operations build a new value and
/// assign it wholesale, so the store always observes a consistent pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreHandle {
    database: String,
    collection: String,
}

impl StoreHandle {
    fn new(database: impl Into<String>, collection: impl Into<String>) -> Self {
        Self {
            database: database.into(),
            collection: collection.into(),
        }
    }

    /// The active database name.
    pub fn database(&self) -> &str {
        &self.database
    }

    /// The active collection name.
    pub fn collection(&self) -> &str {
        &self.collection
    }
}

/// Snapshot of collection statistics, tagged with the handle it was taken from.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct CollectionInfo {
    pub database: String,
    pub collection: String,
    pub document_count: u64,
    pub size_bytes: u64,
    pub average_document_size: f64,
}

/// A validated CRUD surface over one document collection at a time.
///
/// Queries, documents, and patches are dynamically typed ([`Bson`]) and pass
/// through to the engine in its native dialect; the store only checks that
/// they are mappings before anything reaches the wire. Wrong-shaped arguments
/// are rejected with [`StoreError::InvalidArgument`] and logged — no engine
/// call is made.
///
/// Switch operations take `&mut self`: a store is a single-caller value, and
/// exclusive access during a switch is enforced by the borrow checker rather
/// than a lock.
#[derive(Debug)]
pub struct DocumentStore<B: StoreBackend> {
    backend: B,
    handle: StoreHandle,
}

impl<B: StoreBackend> DocumentStore<B> {
    /// Creates a store addressing `database`.`collection` through `backend`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Configuration`] if either name is empty.
    pub fn new(
        backend: B,
        database: impl Into<String>,
        collection: impl Into<String>,
    ) -> StoreResult<Self> {
        let handle = StoreHandle::new(database, collection);

        if handle.database().is_empty() {
            return Err(StoreError::Configuration(
                "database name is required".to_string(),
            ));
        }
        if handle.collection().is_empty() {
            return Err(StoreError::Configuration(
                "collection name is required".to_string(),
            ));
        }

        Ok(Self { backend, handle })
    }

    /// The active handle.
    pub fn handle(&self) -> &StoreHandle {
        &self.handle
    }

    /// The active database name.
    pub fn database(&self) -> &str {
        self.handle.database()
    }

    /// The active collection name.
    pub fn collection(&self) -> &str {
        self.handle.collection()
    }

    /// Repoints the store at another collection in the same database.
    ///
    /// Takes effect immediately and performs no I/O. Existence is not checked:
    /// document stores create collections lazily on first write.
    pub fn switch_collection(&mut self, collection: impl Into<String>) {
        self.handle = StoreHandle::new(self.handle.database().to_string(), collection);
        debug!(
            database = self.database(),
            collection = self.collection(),
            "switched collection"
        );
    }

    /// Repoints the store at another database and, optionally, another
    /// collection. When `collection` is `None` the previously active
    /// collection name is reused against the new database.
    pub fn switch_database(&mut self, database: impl Into<String>, collection: Option<&str>) {
        let collection = match collection {
            Some(name) => name.to_string(),
            None => self.handle.collection().to_string(),
        };

        self.handle = StoreHandle::new(database, collection);
        debug!(
            database = self.database(),
            collection = self.collection(),
            "switched database"
        );
    }

    /// Inserts one document and returns the engine-assigned identifier.
    ///
    /// # Errors
    ///
    /// [`StoreError::InvalidArgument`] if `document` is not a mapping (no
    /// engine call is made), [`StoreError::Backend`] on engine faults such as
    /// duplicate keys or a lost connection.
    pub async fn create(&self, document: impl Into<Bson>) -> StoreResult<Bson> {
        let document = require_document(document.into(), "document")?;

        self.backend
            .insert_one(self.database(), self.collection(), document)
            .await
    }

    /// Returns the documents matching `query`, in engine order.
    ///
    /// `None` (or an empty mapping) matches every document in the active
    /// collection. This is the only operation that materializes a full result
    /// sequence into memory; callers bound result size through their query.
    pub async fn read(&self, query: Option<Bson>) -> StoreResult<Vec<Document>> {
        let filter = require_filter(query)?;

        self.backend
            .find(self.database(), self.collection(), filter)
            .await
    }

    /// Applies a set-only merge of `patch` to the documents matching `query`.
    ///
    /// Unspecified fields are never removed. Returns the number of documents
    /// actually modified; matching documents the patch leaves unchanged are
    /// not counted. With `many` false at most one matching document
    /// (first found) is updated.
    pub async fn update(
        &self,
        query: impl Into<Bson>,
        patch: impl Into<Bson>,
        many: bool,
    ) -> StoreResult<u64> {
        let filter = require_document(query.into(), "query")?;
        let patch = require_document(patch.into(), "patch")?;

        self.backend
            .update(self.database(), self.collection(), filter, patch, many)
            .await
    }

    /// Removes the documents matching `query` and returns the number removed.
    ///
    /// With `many` false at most one matching document is removed.
    pub async fn delete(&self, query: impl Into<Bson>, many: bool) -> StoreResult<u64> {
        let filter = require_document(query.into(), "query")?;

        self.backend
            .delete(self.database(), self.collection(), filter, many)
            .await
    }

    /// Counts the documents matching `query` without materializing them.
    ///
    /// `None` counts every document in the active collection.
    pub async fn count_documents(&self, query: Option<Bson>) -> StoreResult<u64> {
        let filter = require_filter(query)?;

        self.backend
            .count(self.database(), self.collection(), filter)
            .await
    }

    /// Returns a statistics snapshot for the active collection.
    pub async fn collection_info(&self) -> StoreResult<CollectionInfo> {
        let stats = self
            .backend
            .collection_stats(self.database(), self.collection())
            .await?;

        Ok(CollectionInfo {
            database: self.database().to_string(),
            collection: self.collection().to_string(),
            document_count: stats.document_count,
            size_bytes: stats.size_bytes,
            average_document_size: stats.average_object_size,
        })
    }

    /// Releases the underlying connection.
    ///
    /// Consumes the store; construct a new one to reconnect.
    pub async fn close(self) -> StoreResult<()> {
        self.backend.shutdown().await
    }
}

fn require_document(value: Bson, what: &str) -> StoreResult<Document> {
    match value {
        Bson::Document(document) => Ok(document),
        other => {
            warn!(argument = what, value = ?other, "rejected non-mapping argument");
            Err(StoreError::InvalidArgument(format!(
                "{what} must be a mapping"
            )))
        }
    }
}

fn require_filter(query: Option<Bson>) -> StoreResult<Document> {
    match query {
        // An absent query matches all documents.
        None => Ok(Document::new()),
        Some(value) => require_document(value, "query"),
    }
}
