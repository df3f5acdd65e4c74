//! In-memory engine backend for shelterstore.
//!
//! This crate provides a `StoreBackend` implementation that keeps every
//! document in process memory and evaluates the MongoDB filter dialect
//! locally. It exists for development and tests: the full store surface can
//! be exercised without a running engine.

pub mod evaluator;
pub mod store;

pub use store::{MemoryBackend, MemoryBackendBuilder};
