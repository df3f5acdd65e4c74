//! Rescue-training candidate selection over animal-shelter records.
//!
//! Maps a small set of rescue-training categories to fixed filter documents
//! and runs them through a [`DocumentStore`]. This module adds no storage
//! behavior of its own: the resolved filter is delegated unchanged, and the
//! result sequence comes back without post-filtering, sorting, or pagination.

use std::str::FromStr;

use bson::{Document, doc};
use tracing::warn;

use shelterstore_core::{
    backend::StoreBackend,
    error::{StoreError, StoreResult},
    store::DocumentStore,
};

#[cfg(feature = "mongodb")]
use shelterstore_core::config::StoreConfig;
#[cfg(feature = "mongodb")]
use shelterstore_mongodb::MongoBackend;

/// Database holding the shelter's intake/outcome records.
pub const DEFAULT_DATABASE: &str = "AAC";
/// Collection holding the animal records.
pub const DEFAULT_COLLECTION: &str = "animals";

/// A rescue-training role with fixed selection criteria.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RescueCategory {
    /// Water rescue: retriever-type breeds, 26-156 weeks old.
    Water,
    /// Mountain and wilderness rescue: working breeds, 26-156 weeks old.
    Mountain,
    /// Disaster and individual tracking: scent and guard breeds, 20-300 weeks old.
    Disaster,
}

impl RescueCategory {
    /// Every known category.
    pub const ALL: [RescueCategory; 3] = [
        RescueCategory::Water,
        RescueCategory::Mountain,
        RescueCategory::Disaster,
    ];

    /// The category name as used in requests.
    pub fn name(&self) -> &'static str {
        match self {
            RescueCategory::Water => "water",
            RescueCategory::Mountain => "mountain",
            RescueCategory::Disaster => "disaster",
        }
    }

    fn breeds(&self) -> &'static [&'static str] {
        match self {
            RescueCategory::Water => &[
                "Labrador Retriever Mix",
                "Chesapeake Bay Retriever",
                "Newfoundland",
                "Portuguese Water Dog",
            ],
            RescueCategory::Mountain => &[
                "German Shepherd",
                "Alaskan Malamute",
                "Old English Sheepdog",
                "Siberian Husky",
                "Rottweiler",
            ],
            RescueCategory::Disaster => &[
                "Doberman Pinscher",
                "German Shepherd",
                "Golden Retriever",
                "Bloodhound",
                "Rottweiler",
            ],
        }
    }

    fn age_range_weeks(&self) -> (i32, i32) {
        match self {
            RescueCategory::Water | RescueCategory::Mountain => (26, 156),
            RescueCategory::Disaster => (20, 300),
        }
    }

    /// The filter document selecting candidates for this category, in the
    /// engine's native dialect.
    pub fn criteria(&self) -> Document {
        let (min_weeks, max_weeks) = self.age_range_weeks();

        doc! {
            "animal_type": "Dog",
            "breed": { "$in": self.breeds().to_vec() },
            "$expr": {
                "$and": [
                    { "$gte": ["$age_upon_outcome_in_weeks", min_weeks] },
                    { "$lte": ["$age_upon_outcome_in_weeks", max_weeks] },
                ]
            },
        }
    }
}

impl FromStr for RescueCategory {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "water" => Ok(RescueCategory::Water),
            "mountain" => Ok(RescueCategory::Mountain),
            "disaster" => Ok(RescueCategory::Disaster),
            _ => Err(StoreError::UnknownCategory(s.to_string())),
        }
    }
}

/// Finds animals suitable for rescue-training roles.
///
/// Composes a [`DocumentStore`] and delegates query execution to it.
#[derive(Debug)]
pub struct RescueFinder<B: StoreBackend> {
    store: DocumentStore<B>,
}

impl<B: StoreBackend> RescueFinder<B> {
    /// Wraps an existing store.
    pub fn new(store: DocumentStore<B>) -> Self {
        Self { store }
    }

    /// The underlying store.
    pub fn store(&self) -> &DocumentStore<B> {
        &self.store
    }

    /// Mutable access to the underlying store, e.g. to switch collections.
    pub fn store_mut(&mut self) -> &mut DocumentStore<B> {
        &mut self.store
    }

    /// Consumes the finder, returning the wrapped store.
    pub fn into_store(self) -> DocumentStore<B> {
        self.store
    }

    /// Returns the animals matching `category`'s criteria, unmodified and in
    /// engine order.
    ///
    /// # Errors
    ///
    /// [`StoreError::UnknownCategory`] for a category outside the criteria
    /// table; no query reaches the engine in that case.
    pub async fn find_candidates(&self, category: &str) -> StoreResult<Vec<Document>> {
        let parsed: RescueCategory = category.parse().inspect_err(|_| {
            warn!(category, "unknown rescue category requested");
        })?;

        self.store.read(Some(parsed.criteria().into())).await
    }
}

#[cfg(feature = "mongodb")]
impl RescueFinder<MongoBackend> {
    /// Connects to MongoDB and wraps a store pointed at the shelter records.
    ///
    /// Empty database/collection names in `config` fall back to
    /// [`DEFAULT_DATABASE`] and [`DEFAULT_COLLECTION`].
    pub async fn connect(mut config: StoreConfig) -> StoreResult<Self> {
        if config.database.is_empty() {
            config.database = DEFAULT_DATABASE.to_string();
        }
        if config.collection.is_empty() {
            config.collection = DEFAULT_COLLECTION.to_string();
        }

        Ok(Self::new(shelterstore_mongodb::connect(config).await?))
    }
}
