//! REST adapter for LeafLog.
//!
//! # Responsibility
//! - Expose plant use-cases from `leaflog_core` over JSON/HTTP.
//! - Map typed core errors to status codes.
//!
//! # Invariants
//! - No business rule lives here; every decision is delegated to
//!   `PlantService`.

pub mod error;
pub mod routes;
pub mod server;

pub use error::AppError;
pub use routes::{build_router, cors_layer, SharedService, BULK_FILE_FIELD};
pub use server::{run_serve, ServeOptions};
