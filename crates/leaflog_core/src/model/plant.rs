//! Plant aggregate.
//!
//! # Responsibility
//! - Compose the five value objects under one stable identity.
//! - Expose the only state transitions a plant supports.
//!
//! # Invariants
//! - `id` is assigned once and never changes.
//! - Fields are replaced as whole validated values, never mutated in place.
//! - `update_details` is all-or-nothing: every new value is validated before
//!   any field is assigned.
//!
//! # See also
//! - `crate::model::values`

use crate::model::values::{
    parse_whole_number, DomainValidationError, LastWateredDate,
    MalformedNumberError, Notes, PlantName, PlantSpecies, WateringFrequencyInDays,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable identifier for every plant.
pub type PlantId = Uuid;

const MILLIS_PER_DAY: i64 = 24 * 60 * 60 * 1000;

/// Unvalidated plant fields as supplied by a caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlantInput {
    pub name: String,
    pub species: String,
    pub watering_frequency_days: i64,
    #[serde(default)]
    pub notes: Option<String>,
    /// Unix epoch milliseconds; `None` for "never watered".
    #[serde(default)]
    pub last_watered: Option<i64>,
}

/// Text-only form of [`PlantInput`], as typed into a console or a file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlantDraft {
    pub name: String,
    pub species: String,
    pub watering_frequency: String,
    pub notes: String,
    pub last_watered: Option<i64>,
}

impl PlantDraft {
    /// Converts numeric text fields, leaving domain rules to [`PlantDetails`].
    pub fn parse(self) -> Result<PlantInput, MalformedNumberError> {
        let watering_frequency_days = parse_whole_number(self.watering_frequency.trim())?;
        Ok(PlantInput {
            name: self.name,
            species: self.species,
            watering_frequency_days,
            notes: Some(self.notes),
            last_watered: self.last_watered,
        })
    }
}

/// Fully validated set of mutable plant fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlantDetails {
    pub name: PlantName,
    pub species: PlantSpecies,
    pub last_watered: LastWateredDate,
    pub watering_frequency: WateringFrequencyInDays,
    pub notes: Notes,
}

impl PlantDetails {
    /// Validates every raw field, failing on the first violated rule.
    pub fn from_input(input: &PlantInput) -> Result<Self, DomainValidationError> {
        Ok(Self {
            name: PlantName::new(input.name.as_str())?,
            species: PlantSpecies::new(input.species.as_str())?,
            last_watered: LastWateredDate::new(input.last_watered)?,
            watering_frequency: WateringFrequencyInDays::new(input.watering_frequency_days)?,
            notes: Notes::from_optional(input.notes.clone())?,
        })
    }
}

/// Watering schedule projection at a given instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct WateringStatus {
    /// Whole days since the last watering; `None` when never watered.
    pub days_since_watered: Option<i64>,
    /// Days until the next watering; zero or negative when due.
    pub due_in_days: i64,
    pub is_due: bool,
}

/// A tracked plant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Plant {
    id: PlantId,
    name: PlantName,
    species: PlantSpecies,
    last_watered: LastWateredDate,
    watering_frequency_days: WateringFrequencyInDays,
    #[serde(default)]
    notes: Notes,
}

impl Plant {
    /// Creates a plant with a freshly generated id.
    pub fn new(details: PlantDetails) -> Self {
        Self::with_id(Uuid::new_v4(), details)
    }

    /// Creates a plant with a caller-provided id.
    ///
    /// Used by the service layer when id generation is injected, and by
    /// storage when rehydrating rows.
    pub fn with_id(id: PlantId, details: PlantDetails) -> Self {
        Self {
            id,
            name: details.name,
            species: details.species,
            last_watered: details.last_watered,
            watering_frequency_days: details.watering_frequency,
            notes: details.notes,
        }
    }

    /// Validates raw input and creates a plant with a fresh id.
    pub fn from_input(input: &PlantInput) -> Result<Self, DomainValidationError> {
        PlantDetails::from_input(input).map(Self::new)
    }

    pub fn id(&self) -> PlantId {
        self.id
    }

    pub fn name(&self) -> &PlantName {
        &self.name
    }

    pub fn species(&self) -> &PlantSpecies {
        &self.species
    }

    pub fn last_watered(&self) -> LastWateredDate {
        self.last_watered
    }

    pub fn watering_frequency(&self) -> WateringFrequencyInDays {
        self.watering_frequency_days
    }

    pub fn notes(&self) -> &Notes {
        &self.notes
    }

    /// Stamps the current time as the last watering.
    pub fn mark_as_watered(&mut self) {
        self.last_watered = LastWateredDate::now();
    }

    /// Replaces all mutable fields from raw input.
    ///
    /// Leaves the plant untouched when any field fails validation.
    pub fn update_details(&mut self, input: &PlantInput) -> Result<(), DomainValidationError> {
        let details = PlantDetails::from_input(input)?;
        self.replace_details(details);
        Ok(())
    }

    /// Replaces all mutable fields with already-validated values.
    pub fn replace_details(&mut self, details: PlantDetails) {
        self.name = details.name;
        self.species = details.species;
        self.last_watered = details.last_watered;
        self.watering_frequency_days = details.watering_frequency;
        self.notes = details.notes;
    }

    /// Replaces only the watering interval.
    pub fn update_watering_frequency(&mut self, days: i64) -> Result<(), DomainValidationError> {
        self.watering_frequency_days = WateringFrequencyInDays::new(days)?;
        Ok(())
    }

    /// Computes the watering schedule relative to `now_ms`.
    ///
    /// A timestamp later than `now_ms` (clock skew) counts as zero days ago.
    /// Spans wider than `i64` saturate instead of overflowing.
    pub fn watering_status(&self, now_ms: i64) -> WateringStatus {
        let frequency = i64::from(self.watering_frequency_days.days());
        match self.last_watered.epoch_ms() {
            Some(last) => {
                let days = now_ms.saturating_sub(last).max(0) / MILLIS_PER_DAY;
                WateringStatus {
                    days_since_watered: Some(days),
                    due_in_days: frequency - days,
                    is_due: days >= frequency,
                }
            }
            None => WateringStatus {
                days_since_watered: None,
                due_in_days: 0,
                is_due: true,
            },
        }
    }
}
