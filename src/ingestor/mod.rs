//! Ingestion pipeline
//!
//! `IngestionService` walks the enabled sources, `IngestionRunTracker` runs one
//! source and keeps the audit trail, and `DraftWriter` dedups or drafts each
//! accepted candidate.

pub mod run_tracker;
pub mod service;
pub mod writer;

pub use run_tracker::{IngestionRunTracker, ItemOutcome};
pub use service::IngestionService;
pub use writer::{DraftWriter, WriteOutcome};
