use async_trait::async_trait;
use bson::{Bson, Document, doc};
use futures::TryStreamExt;
use mongodb::{Client, Collection as MongoCollection, options::ClientOptions};
use tracing::{debug, error, info};

use shelterstore_core::{
    backend::{CollectionStats, StoreBackend, StoreBackendBuilder},
    config::StoreConfig,
    error::{StoreError, StoreResult},
    store::DocumentStore,
};

#[derive(Debug)]
pub struct MongoBackend {
    client: Client,
}

impl MongoBackend {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    pub fn builder(config: StoreConfig) -> MongoBackendBuilder {
        MongoBackendBuilder::new(config)
    }

    fn get_collection(&self, database: &str, collection: &str) -> MongoCollection<Document> {
        self.client.database(database).collection(collection)
    }
}

#[async_trait]
impl StoreBackend for MongoBackend {
    async fn ping(&self, database: &str) -> StoreResult<()> {
        self.client
            .database(database)
            .run_command(doc! { "ping": 1 })
            .await
            .map(|_| ())
            .map_err(|e| backend_error("ping", e))
    }

    async fn insert_one(
        &self,
        database: &str,
        collection: &str,
        document: Document,
    ) -> StoreResult<Bson> {
        Ok(self
            .get_collection(database, collection)
            .insert_one(document)
            .await
            .map_err(|e| backend_error("insert", e))?
            .inserted_id)
    }

    async fn find(
        &self,
        database: &str,
        collection: &str,
        filter: Document,
    ) -> StoreResult<Vec<Document>> {
        self.get_collection(database, collection)
            .find(filter)
            .await
            .map_err(|e| backend_error("find", e))?
            .try_collect::<Vec<Document>>()
            .await
            .map_err(|e| backend_error("find", e))
    }

    async fn update(
        &self,
        database: &str,
        collection: &str,
        filter: Document,
        patch: Document,
        many: bool,
    ) -> StoreResult<u64> {
        let collection = self.get_collection(database, collection);
        let update = doc! { "$set": patch };

        let result = if many {
            collection.update_many(filter, update).await
        } else {
            collection.update_one(filter, update).await
        }
        .map_err(|e| backend_error("update", e))?;

        Ok(result.modified_count)
    }

    async fn delete(
        &self,
        database: &str,
        collection: &str,
        filter: Document,
        many: bool,
    ) -> StoreResult<u64> {
        let collection = self.get_collection(database, collection);

        let result = if many {
            collection.delete_many(filter).await
        } else {
            collection.delete_one(filter).await
        }
        .map_err(|e| backend_error("delete", e))?;

        Ok(result.deleted_count)
    }

    async fn count(
        &self,
        database: &str,
        collection: &str,
        filter: Document,
    ) -> StoreResult<u64> {
        self.get_collection(database, collection)
            .count_documents(filter)
            .await
            .map_err(|e| backend_error("count", e))
    }

    async fn collection_stats(
        &self,
        database: &str,
        collection: &str,
    ) -> StoreResult<CollectionStats> {
        let stats = self
            .client
            .database(database)
            .run_command(doc! { "collStats": collection })
            .await
            .map_err(|e| backend_error("collStats", e))?;

        Ok(CollectionStats {
            document_count: stat_u64(&stats, "count"),
            size_bytes: stat_u64(&stats, "size"),
            average_object_size: stat_f64(&stats, "avgObjSize"),
        })
    }

    async fn shutdown(self) -> StoreResult<()> {
        self.client.shutdown().await;

        Ok(())
    }
}

fn backend_error(op: &'static str, err: impl std::fmt::Display) -> StoreError {
    error!(%err, op, "MongoDB operation failed");
    StoreError::Backend(err.to_string())
}

// collStats reports numbers as int32, int64, or double depending on server
// version; coerce instead of matching a single width.
fn stat_u64(stats: &Document, key: &str) -> u64 {
    match stats.get(key) {
        Some(Bson::Int32(v)) => (*v).max(0) as u64,
        Some(Bson::Int64(v)) => (*v).max(0) as u64,
        Some(Bson::Double(v)) if *v > 0.0 => *v as u64,
        _ => 0,
    }
}

fn stat_f64(stats: &Document, key: &str) -> f64 {
    match stats.get(key) {
        Some(Bson::Int32(v)) => f64::from(*v),
        Some(Bson::Int64(v)) => *v as f64,
        Some(Bson::Double(v)) => *v,
        _ => 0.0,
    }
}

pub struct MongoBackendBuilder {
    config: StoreConfig,
}

impl MongoBackendBuilder {
    pub fn new(config: StoreConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl StoreBackendBuilder for MongoBackendBuilder {
    type Backend = MongoBackend;

    #[tracing::instrument(
        skip(self),
        fields(host = %self.config.host, database = %self.config.database)
    )]
    async fn build(self) -> StoreResult<Self::Backend> {
        debug!("connecting to MongoDB");

        let options = ClientOptions::parse(&self.config.connection_string())
            .await
            .map_err(|e| StoreError::Connection(e.to_string()))?;
        let client =
            Client::with_options(options).map_err(|e| StoreError::Connection(e.to_string()))?;

        // A store must never exist half-connected; probe before handing the
        // backend out.
        client
            .database(&self.config.database)
            .run_command(doc! { "ping": 1 })
            .await
            .map_err(|e| {
                error!(%e, "MongoDB liveness check failed");
                StoreError::Connection(e.to_string())
            })?;

        info!(database = %self.config.database, "connected to MongoDB");

        Ok(MongoBackend::new(client))
    }
}

/// Connects and returns a ready [`DocumentStore`] addressing the configured
/// database and collection.
///
/// # Errors
///
/// [`StoreError::Configuration`] for empty database/collection names,
/// [`StoreError::Connection`] when the engine is unreachable or rejects
/// authentication. Both are fatal: no store value is produced.
pub async fn connect(config: StoreConfig) -> StoreResult<DocumentStore<MongoBackend>> {
    config.validate()?;

    let database = config.database.clone();
    let collection = config.collection.clone();
    let backend = MongoBackendBuilder::new(config).build().await?;

    DocumentStore::new(backend, database, collection)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stat_coercion_accepts_all_numeric_widths() {
        let stats = doc! {
            "count": 12_i32,
            "size": 4096_i64,
            "avgObjSize": 341.33_f64,
        };

        assert_eq!(stat_u64(&stats, "count"), 12);
        assert_eq!(stat_u64(&stats, "size"), 4096);
        assert_eq!(stat_f64(&stats, "avgObjSize"), 341.33);
    }

    #[test]
    fn stat_coercion_defaults_missing_keys_to_zero() {
        let stats = doc! { "ok": 1 };

        assert_eq!(stat_u64(&stats, "count"), 0);
        assert_eq!(stat_f64(&stats, "avgObjSize"), 0.0);
    }
}
