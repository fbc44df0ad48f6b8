//! Plant use-case service.
//!
//! # Responsibility
//! - Provide the single-record CRUD entry points (create, get, list, update,
//!   delete, water) shared by every transport.
//! - Own id generation for new plants and the bounded collision retry.
//! - Expose the bulk-import pipeline over the same validation path.
//!
//! # Invariants
//! - Every write goes through value-object validation before `PlantStore::save`.
//! - Missing ids surface as `PlantServiceError::NotFound`, never as an absent
//!   value or a validation error.
//! - The service is storage-agnostic.

use crate::import::pipeline::{BulkImporter, ImportError, ImportReport};
use crate::model::plant::{Plant, PlantDetails, PlantId, PlantInput};
use crate::model::values::{DomainValidationError, MalformedNumberError};
use crate::store::plant_store::{PlantStore, StoreError};
use log::{debug, info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::io::BufRead;
use std::path::Path;
use uuid::Uuid;

/// Upper bound on id draws before `create_plant` gives up.
pub const MAX_ID_ATTEMPTS: usize = 8;

pub type ServiceResult<T> = Result<T, PlantServiceError>;

/// Typed failure of a plant use-case.
#[derive(Debug)]
pub enum PlantServiceError {
    /// Input violated a value-object rule.
    Validation(DomainValidationError),
    /// Numeric text could not be parsed.
    MalformedNumber(MalformedNumberError),
    /// Id text is not a valid plant id.
    MalformedId(String),
    /// No plant is stored under the id.
    NotFound(PlantId),
    /// Every generated id collided with an existing plant.
    IdSpaceExhausted { attempts: usize },
    /// Persistence-layer failure.
    Store(StoreError),
}

impl PlantServiceError {
    /// Whether the failure stems from caller input rather than the system.
    pub fn is_user_error(&self) -> bool {
        matches!(
            self,
            Self::Validation(_) | Self::MalformedNumber(_) | Self::MalformedId(_) | Self::NotFound(_)
        )
    }
}

impl Display for PlantServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::MalformedNumber(err) => write!(f, "{err}"),
            Self::MalformedId(raw) => write!(f, "invalid plant id: `{raw}`"),
            Self::NotFound(id) => write!(f, "Plant with id {id} not found"),
            Self::IdSpaceExhausted { attempts } => {
                write!(f, "could not allocate a unique plant id after {attempts} attempts")
            }
            Self::Store(err) => write!(f, "{err}"),
        }
    }
}

impl Error for PlantServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::MalformedNumber(err) => Some(err),
            Self::Store(err) => Some(err),
            Self::MalformedId(_) | Self::NotFound(_) | Self::IdSpaceExhausted { .. } => None,
        }
    }
}

impl From<DomainValidationError> for PlantServiceError {
    fn from(value: DomainValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<MalformedNumberError> for PlantServiceError {
    fn from(value: MalformedNumberError) -> Self {
        Self::MalformedNumber(value)
    }
}

impl From<StoreError> for PlantServiceError {
    fn from(value: StoreError) -> Self {
        Self::Store(value)
    }
}

/// Parses id text supplied by a transport.
pub fn parse_plant_id(raw: &str) -> ServiceResult<PlantId> {
    let trimmed = raw.trim();
    Uuid::parse_str(trimmed).map_err(|_| PlantServiceError::MalformedId(trimmed.to_string()))
}

/// Source of candidate ids for new plants.
pub trait IdGenerator {
    fn next_id(&self) -> PlantId;
}

/// Random UUID v4 ids.
#[derive(Debug, Default, Clone, Copy)]
pub struct RandomIdGenerator;

impl IdGenerator for RandomIdGenerator {
    fn next_id(&self) -> PlantId {
        Uuid::new_v4()
    }
}

/// Use-case service over a `PlantStore`.
pub struct PlantService<S: PlantStore, G: IdGenerator = RandomIdGenerator> {
    store: S,
    ids: G,
}

impl<S: PlantStore> PlantService<S> {
    /// Creates a service with random id generation.
    pub fn new(store: S) -> Self {
        Self::with_id_generator(store, RandomIdGenerator)
    }
}

impl<S: PlantStore, G: IdGenerator> PlantService<S, G> {
    pub fn with_id_generator(store: S, ids: G) -> Self {
        Self { store, ids }
    }

    /// Underlying store, for callers that need direct reads.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Lists every plant in store order.
    pub fn list_plants(&self) -> ServiceResult<Vec<Plant>> {
        Ok(self.store.find_all()?)
    }

    /// Gets one plant by id.
    pub fn get_plant(&self, id: PlantId) -> ServiceResult<Plant> {
        self.store
            .find_by_id(id)?
            .ok_or(PlantServiceError::NotFound(id))
    }

    /// Validates raw input and persists a new plant.
    pub fn create_plant(&self, input: &PlantInput) -> ServiceResult<Plant> {
        let details = PlantDetails::from_input(input)?;
        let plant = self.insert_new(details)?;
        info!(
            "event=plant_create module=service status=ok plant_id={}",
            plant.id()
        );
        Ok(plant)
    }

    /// Replaces all mutable fields of an existing plant.
    ///
    /// The stored plant stays untouched when any field is invalid.
    pub fn update_plant(&self, id: PlantId, input: &PlantInput) -> ServiceResult<Plant> {
        let mut plant = self.get_plant(id)?;
        plant.update_details(input)?;
        let saved = self.store.save(&plant)?;
        info!("event=plant_update module=service status=ok plant_id={id}");
        Ok(saved)
    }

    /// Deletes an existing plant.
    ///
    /// Returns `NotFound` when the id is unknown.
    pub fn delete_plant(&self, id: PlantId) -> ServiceResult<bool> {
        if self.store.find_by_id(id)?.is_none() {
            return Err(PlantServiceError::NotFound(id));
        }
        self.store.delete_by_id(id)?;
        info!("event=plant_delete module=service status=ok plant_id={id}");
        Ok(true)
    }

    /// Stamps the current time as the plant's last watering.
    pub fn mark_watered(&self, id: PlantId) -> ServiceResult<Plant> {
        let mut plant = self.get_plant(id)?;
        plant.mark_as_watered();
        let saved = self.store.save(&plant)?;
        info!("event=plant_water module=service status=ok plant_id={id}");
        Ok(saved)
    }

    /// Replaces only the watering interval of an existing plant.
    pub fn set_watering_frequency(&self, id: PlantId, days: i64) -> ServiceResult<Plant> {
        let mut plant = self.get_plant(id)?;
        plant.update_watering_frequency(days)?;
        let saved = self.store.save(&plant)?;
        info!("event=plant_set_frequency module=service status=ok plant_id={id}");
        Ok(saved)
    }

    /// Lists plants whose watering is due at `now_ms`, in store order.
    pub fn list_due(&self, now_ms: i64) -> ServiceResult<Vec<Plant>> {
        let plants = self.store.find_all()?;
        Ok(plants
            .into_iter()
            .filter(|plant| plant.watering_status(now_ms).is_due)
            .collect())
    }

    /// Imports plant records from text lines.
    pub fn import_lines<I, L>(&self, lines: I) -> Result<ImportReport, ImportError>
    where
        I: IntoIterator<Item = L>,
        L: AsRef<str>,
    {
        BulkImporter::new(self).import_lines(lines)
    }

    /// Imports plant records from a buffered reader.
    pub fn import_reader<R: BufRead>(&self, reader: R) -> Result<ImportReport, ImportError> {
        BulkImporter::new(self).import_reader(reader)
    }

    /// Imports plant records from a text file.
    pub fn import_file(&self, path: impl AsRef<Path>) -> Result<ImportReport, ImportError> {
        BulkImporter::new(self).import_file(path)
    }

    /// Assigns a fresh id to validated details and saves the plant.
    pub(crate) fn insert_new(&self, details: PlantDetails) -> ServiceResult<Plant> {
        let id = self.allocate_id()?;
        Ok(self.store.save(&Plant::with_id(id, details))?)
    }

    fn allocate_id(&self) -> ServiceResult<PlantId> {
        for attempt in 1..=MAX_ID_ATTEMPTS {
            let candidate = self.ids.next_id();
            if self.store.find_by_id(candidate)?.is_none() {
                return Ok(candidate);
            }
            debug!("event=plant_id_collision module=service status=retry attempt={attempt}");
        }

        warn!(
            "event=plant_id_collision module=service status=error attempts={MAX_ID_ATTEMPTS}"
        );
        Err(PlantServiceError::IdSpaceExhausted {
            attempts: MAX_ID_ATTEMPTS,
        })
    }
}
