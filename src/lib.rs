pub mod classifier;
pub mod config;
pub mod database;
pub mod entities;
pub mod errors;
pub mod ingestor;
pub mod job_scheduling;
pub mod models;
pub mod notifications;
pub mod repositories;
pub mod sources;
pub mod utils;
pub mod verification;
