//! Engine abstraction for the store layer.
//!
//! [`StoreBackend`] is the seam between the validated CRUD surface and a
//! concrete document engine. Every operation names its target database and
//! collection explicitly, so a store can repoint its active handle at runtime
//! without reconnecting.
//!
//! Filters, documents, and patches cross this boundary in the engine's native
//! dialect, unmodified — this layer defines no query language of its own.

use async_trait::async_trait;
use bson::{Bson, Document};
use std::fmt::Debug;

use crate::error::StoreResult;

/// Collection statistics as reported by the engine.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CollectionStats {
    /// Number of documents in the collection.
    pub document_count: u64,
    /// Total size of the stored documents in bytes.
    pub size_bytes: u64,
    /// Average document size in bytes, 0 for an empty collection.
    pub average_object_size: f64,
}

/// Abstract interface to a document database engine.
///
/// Implementations must be thread-safe. Engine-level faults are reported as
/// [`StoreError::Backend`](crate::error::StoreError::Backend) — backends never
/// convert faults into benign results; that distinction belongs to callers.
#[async_trait]
pub trait StoreBackend: Send + Sync + Debug {
    /// Issues a liveness check against the given database.
    async fn ping(&self, database: &str) -> StoreResult<()>;

    /// Inserts one document and returns the engine-assigned identifier.
    ///
    /// The target collection is created lazily if it does not exist.
    async fn insert_one(
        &self,
        database: &str,
        collection: &str,
        document: Document,
    ) -> StoreResult<Bson>;

    /// Returns all documents matching `filter`, materialized in engine order.
    ///
    /// An empty filter matches every document in the collection.
    async fn find(
        &self,
        database: &str,
        collection: &str,
        filter: Document,
    ) -> StoreResult<Vec<Document>>;

    /// Applies a set-only merge of `patch` to the documents matching `filter`
    /// and returns the number actually modified. Matching documents the patch
    /// leaves unchanged are not counted.
    ///
    /// With `many` false, at most one matching document is touched.
    async fn update(
        &self,
        database: &str,
        collection: &str,
        filter: Document,
        patch: Document,
        many: bool,
    ) -> StoreResult<u64>;

    /// Removes the documents matching `filter` and returns the number removed.
    ///
    /// With `many` false, at most one matching document is removed.
    async fn delete(
        &self,
        database: &str,
        collection: &str,
        filter: Document,
        many: bool,
    ) -> StoreResult<u64>;

    /// Counts the documents matching `filter` without materializing them.
    async fn count(
        &self,
        database: &str,
        collection: &str,
        filter: Document,
    ) -> StoreResult<u64>;

    /// Returns collection statistics as reported by the engine.
    async fn collection_stats(
        &self,
        database: &str,
        collection: &str,
    ) -> StoreResult<CollectionStats>;

    /// Cleanly shuts down the backend, releasing its connection.
    ///
    /// The default implementation is a no-op; backends holding an external
    /// connection should override it.
    async fn shutdown(self) -> StoreResult<()>
    where
        Self: Sized,
    {
        Ok(())
    }
}

/// Factory trait for constructing backend instances.
///
/// Builders perform whatever connection setup their engine needs, including
/// liveness checks. A backend that cannot reach its engine is never produced,
/// so a backend value in hand is always safe to call.
#[async_trait]
pub trait StoreBackendBuilder {
    type Backend: StoreBackend;

    async fn build(self) -> StoreResult<Self::Backend>;
}
