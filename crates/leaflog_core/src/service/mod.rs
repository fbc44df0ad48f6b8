//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate store calls into use-case level APIs.
//! - Keep HTTP and console adapters decoupled from storage details.

pub mod plant_service;
