//! SeaORM entity definitions
//!
//! Enum-valued columns hold the lowercase names from `crate::models`; list
//! valued columns are JSON arrays.

pub mod prelude;

pub mod ingestion_runs;
pub mod ingestion_sources;
pub mod postings;
pub mod raw_opportunities;
