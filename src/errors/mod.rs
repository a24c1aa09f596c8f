//! Centralized error handling for the ingestion and link verification pipelines
//!
//! # Error Categories
//!
//! - **Database Errors**: SeaORM operations, migrations, connection issues
//! - **Repository Errors**: store level failures, independent of the backend
//! - **Source Errors**: fetching or decoding an external feed
//! - **Processing Errors**: failures while scoring or writing a single candidate
//! - **Configuration Errors**: missing or invalid tunables
//!
//! # Usage
//!
//! ```rust
//! use fresher_intake::errors::{AppError, AppResult};
//!
//! fn example_function() -> AppResult<String> {
//!     Err(AppError::configuration("default owner is not set"))
//! }
//! ```

pub mod types;

pub use types::*;

/// Convenience type alias for Results using AppError
pub type AppResult<T> = Result<T, AppError>;

/// Convenience type alias for Repository Results
pub type RepositoryResult<T> = Result<T, RepositoryError>;

/// Convenience type alias for Source Results
pub type SourceResult<T> = Result<T, SourceError>;
