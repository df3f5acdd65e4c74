//! In-memory engine backend for development and tests.
//!
//! Stores documents as BSON values in nested maps behind an async read-write
//! lock and interprets the same filter dialect the MongoDB backend passes
//! through, so store behavior can be exercised without a live engine.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use async_trait::async_trait;
use bson::{Bson, Document, oid::ObjectId, ser::serialize_to_vec};
use mea::rwlock::RwLock;

use shelterstore_core::{
    backend::{CollectionStats, StoreBackend, StoreBackendBuilder},
    error::{StoreError, StoreResult},
};

use crate::evaluator::FilterEvaluator;

/// Documents keyed by their identifier's string form. A BTreeMap keeps
/// iteration stable, so "first match" semantics are deterministic and results
/// come back in insertion order for engine-assigned ids.
type CollectionMap = BTreeMap<String, Document>;
type DatabaseMap = HashMap<String, CollectionMap>;
type StoreMap = HashMap<String, DatabaseMap>;

/// Thread-safe in-memory document engine.
///
/// `MemoryBackend` is cloneable and uses an `Arc`-wrapped internal state:
/// clones of the same instance share the same data. Queries scan every
/// document in a collection, which is fine at test scale; use the MongoDB
/// backend for real data sets.
#[derive(Default, Clone, Debug)]
pub struct MemoryBackend {
    store: Arc<RwLock<StoreMap>>,
}

impl MemoryBackend {
    /// Creates a new empty in-memory engine.
    pub fn new() -> Self {
        Self {
            store: Arc::new(RwLock::new(StoreMap::new())),
        }
    }

    /// Creates a builder for constructing a `MemoryBackend`.
    pub fn builder() -> MemoryBackendBuilder {
        MemoryBackendBuilder::default()
    }
}

#[async_trait]
impl StoreBackend for MemoryBackend {
    async fn ping(&self, _database: &str) -> StoreResult<()> {
        Ok(())
    }

    async fn insert_one(
        &self,
        database: &str,
        collection: &str,
        mut document: Document,
    ) -> StoreResult<Bson> {
        let id = match document.get("_id") {
            Some(id) => id.clone(),
            None => {
                let id = Bson::ObjectId(ObjectId::new());
                document.insert("_id", id.clone());
                id
            }
        };

        let mut store = self.store.write().await;
        let collection_map = store
            .entry(database.to_string())
            .or_default()
            .entry(collection.to_string())
            .or_default();

        let key = key_of(&id);
        if collection_map.contains_key(&key) {
            return Err(StoreError::Backend(format!("duplicate key: _id {key}")));
        }
        collection_map.insert(key, document);

        Ok(id)
    }

    async fn find(
        &self,
        database: &str,
        collection: &str,
        filter: Document,
    ) -> StoreResult<Vec<Document>> {
        let store = self.store.read().await;
        let Some(collection_map) = store.get(database).and_then(|db| db.get(collection)) else {
            return Ok(vec![]);
        };

        let mut results = Vec::new();
        for document in collection_map.values() {
            if FilterEvaluator::matches(&filter, document)? {
                results.push(document.clone());
            }
        }

        Ok(results)
    }

    async fn update(
        &self,
        database: &str,
        collection: &str,
        filter: Document,
        patch: Document,
        many: bool,
    ) -> StoreResult<u64> {
        let mut store = self.store.write().await;
        let Some(collection_map) = store.get_mut(database).and_then(|db| db.get_mut(collection))
        else {
            return Ok(0);
        };

        let mut modified = 0;
        for document in collection_map.values_mut() {
            if !FilterEvaluator::matches(&filter, document)? {
                continue;
            }

            if apply_patch(document, &patch) {
                modified += 1;
            }
            if !many {
                break;
            }
        }

        Ok(modified)
    }

    async fn delete(
        &self,
        database: &str,
        collection: &str,
        filter: Document,
        many: bool,
    ) -> StoreResult<u64> {
        let mut store = self.store.write().await;
        let Some(collection_map) = store.get_mut(database).and_then(|db| db.get_mut(collection))
        else {
            return Ok(0);
        };

        let mut keys = Vec::new();
        for (key, document) in collection_map.iter() {
            if FilterEvaluator::matches(&filter, document)? {
                keys.push(key.clone());
                if !many {
                    break;
                }
            }
        }

        for key in &keys {
            collection_map.remove(key);
        }

        Ok(keys.len() as u64)
    }

    async fn count(
        &self,
        database: &str,
        collection: &str,
        filter: Document,
    ) -> StoreResult<u64> {
        let store = self.store.read().await;
        let Some(collection_map) = store.get(database).and_then(|db| db.get(collection)) else {
            return Ok(0);
        };

        let mut count = 0;
        for document in collection_map.values() {
            if FilterEvaluator::matches(&filter, document)? {
                count += 1;
            }
        }

        Ok(count)
    }

    async fn collection_stats(
        &self,
        database: &str,
        collection: &str,
    ) -> StoreResult<CollectionStats> {
        let store = self.store.read().await;
        let Some(collection_map) = store.get(database).and_then(|db| db.get(collection)) else {
            return Ok(CollectionStats::default());
        };

        let mut size_bytes = 0_u64;
        for document in collection_map.values() {
            size_bytes += serialize_to_vec(document)?.len() as u64;
        }

        let document_count = collection_map.len() as u64;
        let average_object_size = if document_count == 0 {
            0.0
        } else {
            size_bytes as f64 / document_count as f64
        };

        Ok(CollectionStats {
            document_count,
            size_bytes,
            average_object_size,
        })
    }
}

fn key_of(id: &Bson) -> String {
    match id {
        Bson::ObjectId(oid) => oid.to_hex(),
        other => other.to_string(),
    }
}

/// Set-only merge: assigns patch fields, removes nothing. Returns whether the
/// document changed.
fn apply_patch(document: &mut Document, patch: &Document) -> bool {
    let mut changed = false;
    for (field, value) in patch {
        if document.get(field) != Some(value) {
            document.insert(field.clone(), value.clone());
            changed = true;
        }
    }

    changed
}

/// Builder for constructing [`MemoryBackend`] instances. Always succeeds.
#[derive(Default)]
pub struct MemoryBackendBuilder;

#[async_trait]
impl StoreBackendBuilder for MemoryBackendBuilder {
    type Backend = MemoryBackend;

    async fn build(self) -> StoreResult<Self::Backend> {
        Ok(MemoryBackend::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bson::doc;

    #[tokio::test]
    async fn insert_assigns_object_id() {
        let backend = MemoryBackend::new();

        let id = backend
            .insert_one("AAC", "animals", doc! { "breed": "Beagle" })
            .await
            .unwrap();

        assert!(matches!(id, Bson::ObjectId(_)));
        let found = backend.find("AAC", "animals", doc! {}).await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].get("_id"), Some(&id));
    }

    #[tokio::test]
    async fn insert_rejects_duplicate_id() {
        let backend = MemoryBackend::new();
        let document = doc! { "_id": 7, "breed": "Beagle" };

        backend
            .insert_one("AAC", "animals", document.clone())
            .await
            .unwrap();
        let err = backend
            .insert_one("AAC", "animals", document)
            .await
            .unwrap_err();

        assert!(matches!(err, StoreError::Backend(_)));
    }

    #[tokio::test]
    async fn missing_collection_reads_as_empty() {
        let backend = MemoryBackend::new();

        assert!(backend.find("AAC", "nothing", doc! {}).await.unwrap().is_empty());
        assert_eq!(backend.count("AAC", "nothing", doc! {}).await.unwrap(), 0);
        assert_eq!(
            backend.delete("AAC", "nothing", doc! {}, true).await.unwrap(),
            0
        );
    }

    #[tokio::test]
    async fn update_counts_only_changed_documents() {
        let backend = MemoryBackend::new();
        backend
            .insert_one("AAC", "animals", doc! { "breed": "Beagle", "status": "intake" })
            .await
            .unwrap();
        backend
            .insert_one("AAC", "animals", doc! { "breed": "Beagle", "status": "ready" })
            .await
            .unwrap();

        let modified = backend
            .update(
                "AAC",
                "animals",
                doc! { "breed": "Beagle" },
                doc! { "status": "ready" },
                true,
            )
            .await
            .unwrap();

        assert_eq!(modified, 1);
    }

    #[tokio::test]
    async fn patch_merges_without_removing_fields() {
        let backend = MemoryBackend::new();
        backend
            .insert_one("AAC", "animals", doc! { "_id": 1, "breed": "Beagle", "name": "Ada" })
            .await
            .unwrap();

        backend
            .update(
                "AAC",
                "animals",
                doc! { "_id": 1 },
                doc! { "name": "Grace", "trained": true },
                false,
            )
            .await
            .unwrap();

        let found = backend
            .find("AAC", "animals", doc! { "_id": 1 })
            .await
            .unwrap();
        assert_eq!(found[0].get_str("breed").unwrap(), "Beagle");
        assert_eq!(found[0].get_str("name").unwrap(), "Grace");
        assert!(found[0].get_bool("trained").unwrap());
    }

    #[tokio::test]
    async fn stats_reflect_serialized_sizes() {
        let backend = MemoryBackend::new();
        backend
            .insert_one("AAC", "animals", doc! { "breed": "Beagle" })
            .await
            .unwrap();
        backend
            .insert_one("AAC", "animals", doc! { "breed": "Newfoundland" })
            .await
            .unwrap();

        let stats = backend.collection_stats("AAC", "animals").await.unwrap();
        assert_eq!(stats.document_count, 2);
        assert!(stats.size_bytes > 0);
        assert_eq!(
            stats.average_object_size,
            stats.size_bytes as f64 / 2.0
        );

        let empty = backend.collection_stats("AAC", "nothing").await.unwrap();
        assert_eq!(empty, CollectionStats::default());
    }
}
