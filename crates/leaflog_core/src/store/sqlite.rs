//! SQLite-backed plant store.
//!
//! # Invariants
//! - Connections passed in must already be migrated (`db::open_db*`).
//! - Read paths re-validate every row and reject corrupt data instead of
//!   masking it, except for the "not in the future" rule on timestamps.

use crate::model::plant::{Plant, PlantDetails, PlantId};
use crate::model::values::{
    DomainValidationError, LastWateredDate, Notes, PlantName, PlantSpecies, WateringFrequencyInDays,
};
use crate::store::plant_store::{PlantStore, StoreError, StoreResult};
use rusqlite::{params, Connection, Row};
use std::borrow::Borrow;
use uuid::Uuid;

const PLANT_SELECT_SQL: &str = "SELECT
    id,
    name,
    species,
    last_watered_ms,
    watering_frequency_days,
    notes
FROM plants";

/// SQLite `PlantStore`.
///
/// Works over an owned `Connection` or a borrowed `&Connection`.
pub struct SqlitePlantStore<C = Connection> {
    conn: C,
}

impl<C: Borrow<Connection>> SqlitePlantStore<C> {
    pub fn new(conn: C) -> Self {
        Self { conn }
    }

    pub fn connection(&self) -> &Connection {
        self.conn.borrow()
    }
}

impl<C: Borrow<Connection>> PlantStore for SqlitePlantStore<C> {
    fn find_all(&self) -> StoreResult<Vec<Plant>> {
        let mut stmt = self
            .connection()
            .prepare(&format!("{PLANT_SELECT_SQL} ORDER BY created_at ASC, rowid ASC;"))?;
        let mut rows = stmt.query([])?;
        let mut plants = Vec::new();

        while let Some(row) = rows.next()? {
            plants.push(parse_plant_row(row)?);
        }

        Ok(plants)
    }

    fn find_by_id(&self, id: PlantId) -> StoreResult<Option<Plant>> {
        let mut stmt = self
            .connection()
            .prepare(&format!("{PLANT_SELECT_SQL} WHERE id = ?1;"))?;
        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_plant_row(row)?));
        }

        Ok(None)
    }

    fn save(&self, plant: &Plant) -> StoreResult<Plant> {
        self.connection().execute(
            "INSERT INTO plants (
                id,
                name,
                species,
                last_watered_ms,
                watering_frequency_days,
                notes
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            ON CONFLICT(id) DO UPDATE SET
                name = excluded.name,
                species = excluded.species,
                last_watered_ms = excluded.last_watered_ms,
                watering_frequency_days = excluded.watering_frequency_days,
                notes = excluded.notes,
                updated_at = (strftime('%s', 'now') * 1000);",
            params![
                plant.id().to_string(),
                plant.name().as_str(),
                plant.species().as_str(),
                plant.last_watered().epoch_ms(),
                i64::from(plant.watering_frequency()),
                plant.notes().as_str(),
            ],
        )?;

        Ok(plant.clone())
    }

    fn delete_by_id(&self, id: PlantId) -> StoreResult<()> {
        self.connection()
            .execute("DELETE FROM plants WHERE id = ?1;", [id.to_string()])?;
        Ok(())
    }
}

fn parse_plant_row(row: &Row<'_>) -> StoreResult<Plant> {
    let id_text: String = row.get("id")?;
    let id = Uuid::parse_str(&id_text)
        .map_err(|_| StoreError::InvalidData(format!("invalid id `{id_text}` in plants.id")))?;

    let details = PlantDetails {
        name: PlantName::new(row.get::<_, String>("name")?).map_err(invalid_column(id, "name"))?,
        species: PlantSpecies::new(row.get::<_, String>("species")?)
            .map_err(invalid_column(id, "species"))?,
        last_watered: LastWateredDate::restore(row.get("last_watered_ms")?),
        watering_frequency: WateringFrequencyInDays::new(row.get("watering_frequency_days")?)
            .map_err(invalid_column(id, "watering_frequency_days"))?,
        notes: Notes::new(row.get::<_, String>("notes")?).map_err(invalid_column(id, "notes"))?,
    };

    Ok(Plant::with_id(id, details))
}

fn invalid_column(
    id: PlantId,
    column: &'static str,
) -> impl Fn(DomainValidationError) -> StoreError {
    move |err| StoreError::InvalidData(format!("plant {id}: plants.{column}: {err}"))
}
