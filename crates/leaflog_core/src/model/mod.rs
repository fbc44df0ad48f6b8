//! Plant domain model.
//!
//! # Responsibility
//! - Define the value objects that carry every plant business rule.
//! - Define the `Plant` aggregate built exclusively from those values.
//!
//! # Invariants
//! - Every plant is identified by a stable `PlantId`.
//! - A `Plant` can never hold an invalid field; validation happens before
//!   assembly.

pub mod plant;
pub mod values;
