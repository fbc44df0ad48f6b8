//! Store contract consumed by the plant service.

use crate::db::DbError;
use crate::model::plant::{Plant, PlantId};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type StoreResult<T> = Result<T, StoreError>;

/// Infrastructure failure while reading or writing plants.
#[derive(Debug)]
pub enum StoreError {
    Db(DbError),
    /// Persisted data no longer satisfies plant invariants.
    InvalidData(String),
    /// In-process store state is unusable (for example a poisoned lock).
    Unavailable(String),
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::InvalidData(message) => write!(f, "invalid persisted plant data: {message}"),
            Self::Unavailable(message) => write!(f, "plant store unavailable: {message}"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::InvalidData(_) | Self::Unavailable(_) => None,
        }
    }
}

impl From<DbError> for StoreError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Persistence capability for plants.
pub trait PlantStore {
    /// Returns every plant in store order.
    fn find_all(&self) -> StoreResult<Vec<Plant>>;
    fn find_by_id(&self, id: PlantId) -> StoreResult<Option<Plant>>;
    /// Inserts or replaces the plant with the same id and returns it.
    fn save(&self, plant: &Plant) -> StoreResult<Plant>;
    /// Removes the plant if present. Removing an absent id is a no-op.
    fn delete_by_id(&self, id: PlantId) -> StoreResult<()>;
}

impl<S: PlantStore + ?Sized> PlantStore for &S {
    fn find_all(&self) -> StoreResult<Vec<Plant>> {
        (**self).find_all()
    }

    fn find_by_id(&self, id: PlantId) -> StoreResult<Option<Plant>> {
        (**self).find_by_id(id)
    }

    fn save(&self, plant: &Plant) -> StoreResult<Plant> {
        (**self).save(plant)
    }

    fn delete_by_id(&self, id: PlantId) -> StoreResult<()> {
        (**self).delete_by_id(id)
    }
}
