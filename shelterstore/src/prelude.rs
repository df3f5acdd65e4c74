//! Convenient re-exports of commonly used types from shelterstore.
//!
//! Import this prelude module to quickly access the most frequently used types
//! without needing to import from multiple sub-modules:
//!
//! ```ignore
//! use shelterstore::prelude::*;
//! ```

pub use shelterstore_core::{
    backend::{CollectionStats, StoreBackend, StoreBackendBuilder},
    config::StoreConfig,
    error::{StoreError, StoreResult},
    store::{CollectionInfo, DocumentStore, StoreHandle},
};

pub use crate::rescue::{RescueCategory, RescueFinder};
