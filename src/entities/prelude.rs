pub use super::ingestion_runs::Entity as IngestionRuns;
pub use super::ingestion_sources::Entity as IngestionSources;
pub use super::postings::Entity as Postings;
pub use super::raw_opportunities::Entity as RawOpportunities;
