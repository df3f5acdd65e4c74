//! MongoDB engine backend for shelterstore.
//!
//! This crate implements the `StoreBackend` trait on top of MongoDB's async
//! driver. Construction goes through [`MongoBackendBuilder`], which parses the
//! connection string, creates the client, and issues a `ping` against the
//! configured database — a backend that cannot reach its engine is never
//! produced.
//!
//! # Example
//!
//! ```ignore
//! use shelterstore_core::config::StoreConfig;
//! use shelterstore_mongodb::connect;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = StoreConfig::new("AAC", "animals");
//!     let store = connect(config).await?;
//!
//!     Ok(())
//! }
//! ```

pub mod store;

pub use store::{MongoBackend, MongoBackendBuilder, connect};
