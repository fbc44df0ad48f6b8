//! Core domain logic for LeafLog.
//! This crate is the single source of truth for plant-care business rules.

pub mod db;
pub mod import;
pub mod logging;
pub mod model;
pub mod service;
pub mod store;

pub use import::pipeline::{BulkImporter, ImportError, ImportLineError, ImportReport, LineFailure};
pub use import::record::{parse_record_line, RawPlantRecord};
pub use logging::{init_logging, logging_status, LogLevel, LoggingError};
pub use model::plant::{Plant, PlantDetails, PlantDraft, PlantId, PlantInput, WateringStatus};
pub use model::values::{
    now_epoch_ms, parse_whole_number, DomainValidationError, LastWateredDate,
    MalformedNumberError, Notes, PlantName, PlantSpecies, WateringFrequencyInDays,
};
pub use service::plant_service::{
    parse_plant_id, IdGenerator, PlantService, PlantServiceError, RandomIdGenerator,
    ServiceResult, MAX_ID_ATTEMPTS,
};
pub use store::{InMemoryPlantStore, PlantStore, SqlitePlantStore, StoreError, StoreResult};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
