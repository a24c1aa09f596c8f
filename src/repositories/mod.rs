//! Store interfaces for the ingestion and verification pipelines
//!
//! Every component receives its store explicitly. `InMemoryStore` backs tests
//! and dry runs; `crate::database::SeaOrmStore` backs deployments.

pub mod memory;
pub mod traits;

pub use memory::InMemoryStore;
pub use traits::*;
