//! Self-validating value objects for plant attributes.
//!
//! # Responsibility
//! - Wrap each plant attribute in a type that can only hold valid data.
//! - Produce stable, human-readable messages naming the violated rule.
//!
//! # Invariants
//! - Constructors are the only way to obtain an instance.
//! - Instances are immutable; an update means building a new value.
//! - Deserialization goes through the same constructors as Rust callers.
//!
//! # See also
//! - `crate::model::plant`

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::num::ParseIntError;
use std::time::{SystemTime, UNIX_EPOCH};

/// Returns current wall-clock time as Unix epoch milliseconds.
///
/// Clocks set before 1970 are reported as `0` rather than failing.
pub fn now_epoch_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| i64::try_from(elapsed.as_millis()).unwrap_or(i64::MAX))
        .unwrap_or(0)
}

/// Violation of a value-object invariant.
///
/// Always recoverable by the caller: fix the input and retry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DomainValidationError {
    /// Plant name is empty.
    EmptyPlantName,
    /// Plant name reached the exclusive maximum length.
    PlantNameTooLong { length: usize },
    /// Plant species is empty.
    EmptyPlantSpecies,
    /// Notes exceed the inclusive maximum length.
    NotesTooLong { length: usize },
    /// Watering frequency is negative.
    FrequencyBelowMinimum { value: i64 },
    /// Watering frequency exceeds one year.
    FrequencyAboveMaximum { value: i64 },
    /// Last watered timestamp lies after the current time.
    LastWateredInFuture { value: i64, now: i64 },
}

impl Display for DomainValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyPlantName => write!(f, "PlantName must not be null"),
            Self::PlantNameTooLong { .. } => write!(
                f,
                "PlantName must be less than {} characters",
                PlantName::MAX_LENGTH
            ),
            Self::EmptyPlantSpecies => write!(f, "PlantSpecies must not be null or empty"),
            Self::NotesTooLong { .. } => {
                write!(f, "Notes must be less than {} characters.", Notes::MAX_LENGTH)
            }
            Self::FrequencyBelowMinimum { .. } => write!(
                f,
                "Watering Frequency must be greater than or equal to {}",
                WateringFrequencyInDays::MIN_DAYS
            ),
            Self::FrequencyAboveMaximum { .. } => write!(
                f,
                "Watering Frequency must be less than or equal to {}",
                WateringFrequencyInDays::MAX_DAYS
            ),
            Self::LastWateredInFuture { .. } => {
                write!(f, "Last watered dates can't be in the future")
            }
        }
    }
}

impl Error for DomainValidationError {}

/// Raw numeric text that could not be parsed as an integer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MalformedNumberError {
    raw: String,
    source: ParseIntError,
}

impl MalformedNumberError {
    /// Returns the offending raw text.
    pub fn raw(&self) -> &str {
        &self.raw
    }
}

impl Display for MalformedNumberError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "For input string: \"{}\" ({})", self.raw, self.source)
    }
}

impl Error for MalformedNumberError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        Some(&self.source)
    }
}

/// Parses decimal integer text, keeping the raw input for diagnostics.
///
/// Accepts the 32-bit signed range only; anything wider is malformed rather
/// than out of range.
pub fn parse_whole_number(raw: &str) -> Result<i64, MalformedNumberError> {
    raw.parse::<i32>()
        .map(i64::from)
        .map_err(|source| MalformedNumberError {
            raw: raw.to_string(),
            source,
        })
}

/// Display name of a plant. `1 <= chars < 64`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PlantName(String);

impl PlantName {
    /// Exclusive upper bound on name length, in characters.
    pub const MAX_LENGTH: usize = 64;

    pub fn new(value: impl Into<String>) -> Result<Self, DomainValidationError> {
        let value = value.into();
        if value.is_empty() {
            return Err(DomainValidationError::EmptyPlantName);
        }

        let length = value.chars().count();
        if length >= Self::MAX_LENGTH {
            return Err(DomainValidationError::PlantNameTooLong { length });
        }

        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Botanical or common species label. Must not be empty.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PlantSpecies(String);

impl PlantSpecies {
    pub fn new(value: impl Into<String>) -> Result<Self, DomainValidationError> {
        let value = value.into();
        if value.is_empty() {
            return Err(DomainValidationError::EmptyPlantSpecies);
        }
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Free-form care notes. Empty is the "no notes" state.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Notes(String);

impl Notes {
    /// Inclusive upper bound on notes length, in characters.
    pub const MAX_LENGTH: usize = 500;

    pub fn new(value: impl Into<String>) -> Result<Self, DomainValidationError> {
        let value = value.into();
        let length = value.chars().count();
        if length > Self::MAX_LENGTH {
            return Err(DomainValidationError::NotesTooLong { length });
        }
        Ok(Self(value))
    }

    /// Builds notes from optional input; `None` means no notes.
    pub fn from_optional(value: Option<String>) -> Result<Self, DomainValidationError> {
        match value {
            Some(value) => Self::new(value),
            None => Ok(Self::default()),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Days between waterings, `0..=365`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub struct WateringFrequencyInDays(u16);

impl WateringFrequencyInDays {
    pub const MIN_DAYS: i64 = 0;
    pub const MAX_DAYS: i64 = 365;

    pub fn new(value: i64) -> Result<Self, DomainValidationError> {
        if value < Self::MIN_DAYS {
            return Err(DomainValidationError::FrequencyBelowMinimum { value });
        }
        if value > Self::MAX_DAYS {
            return Err(DomainValidationError::FrequencyAboveMaximum { value });
        }
        // Bounds above keep the value inside u16.
        Ok(Self(value as u16))
    }

    pub fn days(self) -> u16 {
        self.0
    }
}

/// Moment a plant was last watered, in Unix epoch milliseconds.
///
/// `None` means the plant has never been watered. A present value is never
/// later than the wall clock at construction time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "Option<i64>", into = "Option<i64>")]
pub struct LastWateredDate(Option<i64>);

impl LastWateredDate {
    /// Validates against the current wall clock.
    pub fn new(value: Option<i64>) -> Result<Self, DomainValidationError> {
        Self::new_at(value, now_epoch_ms())
    }

    /// Validates against an explicit reference time.
    pub fn new_at(value: Option<i64>, now: i64) -> Result<Self, DomainValidationError> {
        match value {
            Some(value) if value > now => {
                Err(DomainValidationError::LastWateredInFuture { value, now })
            }
            _ => Ok(Self(value)),
        }
    }

    /// Stamps the current wall-clock time.
    pub fn now() -> Self {
        Self(Some(now_epoch_ms()))
    }

    pub fn never() -> Self {
        Self(None)
    }

    /// Rehydrates a persisted timestamp without the "not in the future" check.
    ///
    /// Stored rows must stay readable when the host clock moves backwards.
    pub(crate) fn restore(value: Option<i64>) -> Self {
        Self(value)
    }

    pub fn epoch_ms(self) -> Option<i64> {
        self.0
    }
}

macro_rules! string_value_conversions {
    ($($name:ident),+ $(,)?) => {
        $(
            impl TryFrom<String> for $name {
                type Error = DomainValidationError;

                fn try_from(value: String) -> Result<Self, Self::Error> {
                    Self::new(value)
                }
            }

            impl From<$name> for String {
                fn from(value: $name) -> Self {
                    value.0
                }
            }

            impl Display for $name {
                fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
                    f.write_str(&self.0)
                }
            }
        )+
    };
}

string_value_conversions!(PlantName, PlantSpecies, Notes);

impl TryFrom<i64> for WateringFrequencyInDays {
    type Error = DomainValidationError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<WateringFrequencyInDays> for i64 {
    fn from(value: WateringFrequencyInDays) -> Self {
        i64::from(value.0)
    }
}

impl TryFrom<Option<i64>> for LastWateredDate {
    type Error = DomainValidationError;

    fn try_from(value: Option<i64>) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<LastWateredDate> for Option<i64> {
    fn from(value: LastWateredDate) -> Self {
        value.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plant_name_bounds() {
        assert!(PlantName::new("a".repeat(63)).is_ok());
        assert_eq!(
            PlantName::new("a".repeat(64)).unwrap_err(),
            DomainValidationError::PlantNameTooLong { length: 64 }
        );
        assert_eq!(
            PlantName::new("").unwrap_err(),
            DomainValidationError::EmptyPlantName
        );
    }

    #[test]
    fn plant_name_counts_characters_not_bytes() {
        let name = "é".repeat(63);
        assert!(name.len() > 64);
        assert!(PlantName::new(name).is_ok());
    }

    #[test]
    fn frequency_bounds_are_inclusive() {
        assert_eq!(WateringFrequencyInDays::new(0).unwrap().days(), 0);
        assert_eq!(WateringFrequencyInDays::new(365).unwrap().days(), 365);
        assert_eq!(
            WateringFrequencyInDays::new(-1).unwrap_err().to_string(),
            "Watering Frequency must be greater than or equal to 0"
        );
        assert_eq!(
            WateringFrequencyInDays::new(366).unwrap_err().to_string(),
            "Watering Frequency must be less than or equal to 365"
        );
    }

    #[test]
    fn notes_allow_empty_and_cap_length() {
        assert!(Notes::new("").unwrap().is_empty());
        assert!(Notes::from_optional(None).unwrap().is_empty());
        assert!(Notes::new("n".repeat(500)).is_ok());
        assert_eq!(
            Notes::new("n".repeat(501)).unwrap_err().to_string(),
            "Notes must be less than 500 characters."
        );
    }

    #[test]
    fn last_watered_rejects_future_relative_to_reference() {
        assert!(LastWateredDate::new_at(Some(1_000), 1_000).is_ok());
        assert!(LastWateredDate::new_at(None, 1_000).is_ok());
        assert_eq!(
            LastWateredDate::new_at(Some(1_001), 1_000).unwrap_err(),
            DomainValidationError::LastWateredInFuture {
                value: 1_001,
                now: 1_000
            }
        );
    }

    #[test]
    fn parse_whole_number_keeps_raw_text() {
        assert_eq!(parse_whole_number("14").unwrap(), 14);
        let err = parse_whole_number("NotANumber").unwrap_err();
        assert_eq!(err.raw(), "NotANumber");
        assert!(err.to_string().contains("\"NotANumber\""));
    }

    #[test]
    fn parse_whole_number_rejects_values_beyond_32_bits() {
        assert_eq!(parse_whole_number("-2147483648").unwrap(), i64::from(i32::MIN));
        let err = parse_whole_number("99999999999").unwrap_err();
        assert_eq!(err.raw(), "99999999999");
    }
}
