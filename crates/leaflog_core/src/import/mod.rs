//! Line-oriented bulk import of plant records.
//!
//! # Responsibility
//! - Split free-text records into raw fields (`record`).
//! - Validate and persist each record independently, collecting a dual
//!   created/errors report (`pipeline`).
//!
//! # Invariants
//! - One bad line never aborts the batch.
//! - Result order equals line-encounter order.
//! - Already-saved plants are never rolled back.
//!
//! # Record grammar
//! `name - species - wateringFrequencyDays - notes[- ignored]`, one record per
//! line, fields trimmed, blank lines skipped.

pub mod pipeline;
pub mod record;
