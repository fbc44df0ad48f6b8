//! Plant persistence contract and implementations.
//!
//! # Responsibility
//! - Define the storage capability the service and import pipeline consume.
//! - Provide an in-memory store and a SQLite-backed store.
//!
//! # Invariants
//! - "Not found" is an absent result, never an error.
//! - `save` is an upsert keyed by `PlantId`.
//! - Store errors describe infrastructure failures only, never user input.

pub mod memory;
pub mod plant_store;
pub mod sqlite;

pub use memory::InMemoryPlantStore;
pub use plant_store::{PlantStore, StoreError, StoreResult};
pub use sqlite::SqlitePlantStore;
