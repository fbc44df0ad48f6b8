//! Bulk import driver.
//!
//! # Responsibility
//! - Feed each line through the record grammar and value-object validation.
//! - Persist valid records through the plant service.
//! - Convert per-line failures into report entries.
//!
//! # Invariants
//! - Per-line validation and parse failures never escape as `Err`.
//! - Stream failures are reported once, before any record is persisted.
//! - Store failures abort the batch; plants saved so far stay saved.

use crate::import::record::{parse_record_line, RawPlantRecord};
use crate::model::plant::{Plant, PlantDetails};
use crate::model::values::{
    parse_whole_number, DomainValidationError, LastWateredDate, MalformedNumberError, Notes,
    PlantName, PlantSpecies, WateringFrequencyInDays,
};
use crate::service::plant_service::{IdGenerator, PlantService, PlantServiceError};
use crate::store::plant_store::PlantStore;
use log::{error, info};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use std::time::Instant;

/// Why a single line was rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineFailure {
    Validation(DomainValidationError),
    MalformedNumber(MalformedNumberError),
}

impl Display for LineFailure {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::MalformedNumber(err) => write!(f, "{err}"),
        }
    }
}

impl From<DomainValidationError> for LineFailure {
    fn from(value: DomainValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<MalformedNumberError> for LineFailure {
    fn from(value: MalformedNumberError) -> Self {
        Self::MalformedNumber(value)
    }
}

/// A rejected import line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportLineError {
    /// 1-based position in the source, blank lines included.
    pub line_number: usize,
    /// The line exactly as read.
    pub line: String,
    pub failure: LineFailure,
}

impl Display for ImportLineError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "Error in line: \"{}\" — {}", self.line, self.failure)
    }
}

/// Outcome of one import batch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportReport {
    /// Persisted plants in line order.
    pub created: Vec<Plant>,
    /// Rejected lines in line order.
    pub errors: Vec<ImportLineError>,
}

impl ImportReport {
    /// Rendered error messages in line order.
    pub fn error_messages(&self) -> Vec<String> {
        self.errors.iter().map(ToString::to_string).collect()
    }

    /// True when at least one line was rejected.
    pub fn is_partial(&self) -> bool {
        !self.errors.is_empty()
    }
}

/// Failure of the import operation as a whole.
#[derive(Debug)]
pub enum ImportError {
    /// Source file could not be opened.
    Open { path: PathBuf, source: std::io::Error },
    /// Source could not be read.
    Stream(std::io::Error),
    /// Saving a valid record failed; earlier records remain saved.
    Persistence {
        line_number: usize,
        source: PlantServiceError,
    },
}

impl Display for ImportError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Open { path, source } => {
                write!(f, "failed to open `{}`: {source}", path.display())
            }
            Self::Stream(err) => write!(f, "failed to read import source: {err}"),
            Self::Persistence {
                line_number,
                source,
            } => write!(f, "failed to save plant from line {line_number}: {source}"),
        }
    }
}

impl Error for ImportError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Open { source, .. } => Some(source),
            Self::Stream(err) => Some(err),
            Self::Persistence { source, .. } => Some(source),
        }
    }
}

/// Runs import batches against a plant service.
pub struct BulkImporter<'svc, S: PlantStore, G: IdGenerator> {
    service: &'svc PlantService<S, G>,
}

impl<'svc, S: PlantStore, G: IdGenerator> BulkImporter<'svc, S, G> {
    pub fn new(service: &'svc PlantService<S, G>) -> Self {
        Self { service }
    }

    /// Imports already-read lines.
    ///
    /// Only a store failure returns `Err`; everything else lands in the report.
    pub fn import_lines<I, L>(&self, lines: I) -> Result<ImportReport, ImportError>
    where
        I: IntoIterator<Item = L>,
        L: AsRef<str>,
    {
        let started_at = Instant::now();
        let mut report = ImportReport::default();
        let mut line_count = 0;

        for (index, line) in lines.into_iter().enumerate() {
            let line = line.as_ref();
            let line_number = index + 1;
            line_count = line_number;

            let Some(record) = parse_record_line(line) else {
                continue;
            };

            let details = match record_details(&record) {
                Ok(details) => details,
                Err(failure) => {
                    report.errors.push(ImportLineError {
                        line_number,
                        line: line.to_string(),
                        failure,
                    });
                    continue;
                }
            };

            match self.service.insert_new(details) {
                Ok(plant) => report.created.push(plant),
                Err(source) => {
                    error!(
                        "event=plant_import module=import status=error line={line_number} created={} error={source}",
                        report.created.len()
                    );
                    return Err(ImportError::Persistence {
                        line_number,
                        source,
                    });
                }
            }
        }

        info!(
            "event=plant_import module=import status=ok lines={line_count} created={} failed={} duration_ms={}",
            report.created.len(),
            report.errors.len(),
            started_at.elapsed().as_millis()
        );
        Ok(report)
    }

    /// Reads every line up front, then imports them.
    pub fn import_reader<R: BufRead>(&self, reader: R) -> Result<ImportReport, ImportError> {
        let lines = reader
            .lines()
            .collect::<Result<Vec<_>, _>>()
            .map_err(|err| {
                error!("event=plant_import module=import status=error error_code=stream_read_failed error={err}");
                ImportError::Stream(err)
            })?;
        self.import_lines(lines)
    }

    /// Opens and imports a text file.
    pub fn import_file(&self, path: impl AsRef<Path>) -> Result<ImportReport, ImportError> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| {
            error!("event=plant_import module=import status=error error_code=stream_open_failed error={source}");
            ImportError::Open {
                path: path.to_path_buf(),
                source,
            }
        })?;
        self.import_reader(BufReader::new(file))
    }
}

/// Validates one record. Imported plants are stamped as watered now.
fn record_details(record: &RawPlantRecord) -> Result<PlantDetails, LineFailure> {
    let name = PlantName::new(record.name.as_str())?;
    let species = PlantSpecies::new(record.species.as_str())?;
    let last_watered = LastWateredDate::now();
    let frequency = parse_whole_number(&record.watering_frequency)?;

    Ok(PlantDetails {
        name,
        species,
        last_watered,
        watering_frequency: WateringFrequencyInDays::new(frequency)?,
        notes: Notes::new(record.notes.as_str())?,
    })
}
