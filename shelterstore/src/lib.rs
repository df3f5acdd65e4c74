//! Generic CRUD access over document collections, plus the rescue-training
//! candidate finder built on top of it.
//!
//! This crate is the primary entry point for users of shelterstore. It
//! re-exports the core store surface and provides access to the available
//! engine backends:
//!
//! - [`memory`] - In-memory backend for development and tests
//! - [`mongodb`] - Persistent MongoDB backend (requires the `mongodb` feature)
//!
//! # Quick Start
//!
//! ```ignore
//! use shelterstore::{memory::MemoryBackend, prelude::*};
//! use bson::doc;
//!
//! #[tokio::main]
//! async fn main() -> StoreResult<()> {
//!     let mut store = DocumentStore::new(MemoryBackend::new(), "AAC", "animals")?;
//!
//!     let id = store
//!         .create(doc! { "animal_type": "Dog", "breed": "Newfoundland" })
//!         .await?;
//!     let dogs = store.read(Some(doc! { "animal_type": "Dog" }.into())).await?;
//!     assert_eq!(dogs.len(), 1);
//!
//!     // Repoint the same store at another collection; no reconnect needed.
//!     store.switch_collection("outcomes");
//!     assert_eq!(store.count_documents(None).await?, 0);
//!
//!     store.close().await
//! }
//! ```
//!
//! # Rescue candidates
//!
//! The [`rescue`] module maps rescue-training categories to fixed filter
//! documents over animal-shelter outcome records:
//!
//! ```ignore
//! use shelterstore::rescue::RescueFinder;
//!
//! let finder = RescueFinder::new(store);
//! let candidates = finder.find_candidates("water").await?;
//! ```
//!
//! # Connecting to MongoDB
//!
//! With the `mongodb` feature enabled:
//!
//! ```ignore
//! use shelterstore::{mongodb, prelude::*};
//!
//! let config = StoreConfig::from_env()?;
//! let store = mongodb::connect(config).await?;
//! ```

pub mod prelude;
pub mod rescue;

pub use shelterstore_core::{backend, config, error, store};

// Re-export BSON types for convenience
pub use bson;

/// In-memory engine backend.
pub mod memory {
    pub use shelterstore_memory::{MemoryBackend, MemoryBackendBuilder};
}

/// MongoDB engine backend.
///
/// This module is only available when the `mongodb` feature is enabled.
#[cfg(feature = "mongodb")]
pub mod mongodb {
    pub use shelterstore_mongodb::{MongoBackend, MongoBackendBuilder, connect};
}
