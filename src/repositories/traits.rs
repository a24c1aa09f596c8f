//! Repository trait definitions
//!
//! One trait per aggregate, plus the `PipelineStore` umbrella that the
//! services are generic over.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::errors::RepositoryResult;
use crate::models::{
    IngestionRun, IngestionRunCompletion, IngestionSource, IngestionSourceCreateRequest,
    LinkHealthUpdate, Posting, PostingCreateRequest, RawOpportunity, RawOpportunityCreateRequest,
};

/// Operator-managed source configuration
#[async_trait]
pub trait SourceRepository: Send + Sync {
    async fn create_source(
        &self,
        request: IngestionSourceCreateRequest,
    ) -> RepositoryResult<IngestionSource>;

    async fn find_source(&self, id: Uuid) -> RepositoryResult<Option<IngestionSource>>;

    /// All sources ordered by name
    async fn list_sources(&self) -> RepositoryResult<Vec<IngestionSource>>;

    /// Enabled sources ordered by name
    async fn list_enabled_sources(&self) -> RepositoryResult<Vec<IngestionSource>>;

    /// Record an ingestion attempt.
    ///
    /// `last_run_at` is always set to `attempted_at`; `last_success_at` only
    /// when `fetch_succeeded` is true.
    async fn mark_source_attempt(
        &self,
        id: Uuid,
        attempted_at: DateTime<Utc>,
        fetch_succeeded: bool,
    ) -> RepositoryResult<()>;
}

#[async_trait]
pub trait PostingRepository: Send + Sync {
    async fn create_posting(&self, request: PostingCreateRequest) -> RepositoryResult<Posting>;

    async fn find_posting(&self, id: Uuid) -> RepositoryResult<Option<Posting>>;

    /// Non-deleted posting whose apply link equals `apply_link` exactly
    async fn find_active_by_apply_link(&self, apply_link: &str)
        -> RepositoryResult<Option<Posting>>;

    /// Postings due for a link probe, oldest verification first.
    ///
    /// Published, not deleted, with an apply link, not `BROKEN`, and either
    /// never verified, verified before `stale_before`, or `RETRYING`.
    async fn list_verification_candidates(
        &self,
        stale_before: DateTime<Utc>,
        limit: u64,
    ) -> RepositoryResult<Vec<Posting>>;

    async fn apply_link_health(
        &self,
        id: Uuid,
        update: &LinkHealthUpdate,
    ) -> RepositoryResult<Posting>;

    async fn soft_delete_posting(&self, id: Uuid, deleted_at: DateTime<Utc>)
        -> RepositoryResult<()>;
}

#[async_trait]
pub trait IngestionRunRepository: Send + Sync {
    /// Insert a run in `RUNNING` state with zeroed counters
    async fn create_run(
        &self,
        source_id: Uuid,
        started_at: DateTime<Utc>,
    ) -> RepositoryResult<IngestionRun>;

    /// Write the terminal status, counters and error summary
    async fn complete_run(
        &self,
        run_id: Uuid,
        completion: IngestionRunCompletion,
    ) -> RepositoryResult<IngestionRun>;

    async fn find_run(&self, run_id: Uuid) -> RepositoryResult<Option<IngestionRun>>;

    /// Most recent runs of a source, newest first
    async fn list_runs_for_source(
        &self,
        source_id: Uuid,
        limit: u64,
    ) -> RepositoryResult<Vec<IngestionRun>>;
}

/// Insert-only audit trail
#[async_trait]
pub trait RawOpportunityRepository: Send + Sync {
    async fn insert_raw_opportunity(
        &self,
        request: RawOpportunityCreateRequest,
    ) -> RepositoryResult<RawOpportunity>;

    /// Audit rows of a run, oldest first
    async fn list_raw_opportunities_for_run(
        &self,
        run_id: Uuid,
    ) -> RepositoryResult<Vec<RawOpportunity>>;
}

/// Everything the pipelines need from durable storage
pub trait PipelineStore:
    SourceRepository + PostingRepository + IngestionRunRepository + RawOpportunityRepository
{
}

impl<T> PipelineStore for T where
    T: SourceRepository + PostingRepository + IngestionRunRepository + RawOpportunityRepository
{
}
