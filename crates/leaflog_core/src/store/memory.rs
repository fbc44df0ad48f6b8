//! Process-local plant store.
//!
//! Each instance owns its own data; nothing is shared between instances.
//! Iteration order is first-save order.

use crate::model::plant::{Plant, PlantId};
use crate::store::plant_store::{PlantStore, StoreError, StoreResult};
use std::sync::{Mutex, MutexGuard};

/// In-memory `PlantStore`, usable from several threads.
#[derive(Debug, Default)]
pub struct InMemoryPlantStore {
    plants: Mutex<Vec<Plant>>,
}

impl InMemoryPlantStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored plants.
    pub fn len(&self) -> StoreResult<usize> {
        Ok(self.lock()?.len())
    }

    pub fn is_empty(&self) -> StoreResult<bool> {
        Ok(self.lock()?.is_empty())
    }

    fn lock(&self) -> StoreResult<MutexGuard<'_, Vec<Plant>>> {
        self.plants
            .lock()
            .map_err(|_| StoreError::Unavailable("in-memory plant store lock poisoned".to_string()))
    }
}

impl PlantStore for InMemoryPlantStore {
    fn find_all(&self) -> StoreResult<Vec<Plant>> {
        Ok(self.lock()?.clone())
    }

    fn find_by_id(&self, id: PlantId) -> StoreResult<Option<Plant>> {
        Ok(self.lock()?.iter().find(|plant| plant.id() == id).cloned())
    }

    fn save(&self, plant: &Plant) -> StoreResult<Plant> {
        let mut plants = self.lock()?;
        match plants.iter_mut().find(|existing| existing.id() == plant.id()) {
            Some(existing) => *existing = plant.clone(),
            None => plants.push(plant.clone()),
        }
        Ok(plant.clone())
    }

    fn delete_by_id(&self, id: PlantId) -> StoreResult<()> {
        self.lock()?.retain(|plant| plant.id() != id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::InMemoryPlantStore;
    use crate::store::plant_store::{PlantStore, StoreError};
    use std::thread;

    #[test]
    fn poisoned_lock_is_reported_not_hidden() {
        let store = InMemoryPlantStore::new();
        thread::scope(|scope| {
            let _ = scope
                .spawn(|| {
                    let _guard = store.plants.lock().unwrap();
                    panic!("poison the store");
                })
                .join();
        });

        assert!(matches!(store.len(), Err(StoreError::Unavailable(_))));
        assert!(matches!(store.is_empty(), Err(StoreError::Unavailable(_))));
        assert!(matches!(store.find_all(), Err(StoreError::Unavailable(_))));
    }
}
