//! In-memory `PipelineStore` for tests and dry runs

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::errors::{RepositoryError, RepositoryResult};
use crate::models::{
    IngestionRun, IngestionRunCompletion, IngestionSource, IngestionSourceCreateRequest,
    LinkHealth, LinkHealthUpdate, Posting, PostingCreateRequest, RawOpportunity,
    RawOpportunityCreateRequest, RunStatus,
};

use super::traits::{
    IngestionRunRepository, PostingRepository, RawOpportunityRepository, SourceRepository,
};

#[derive(Debug, Default)]
struct StoreState {
    sources: HashMap<Uuid, IngestionSource>,
    postings: HashMap<Uuid, Posting>,
    runs: HashMap<Uuid, IngestionRun>,
    raw_opportunities: Vec<RawOpportunity>,
}

/// Process-local store guarded by a single `RwLock`
#[derive(Debug, Default)]
pub struct InMemoryStore {
    state: RwLock<StoreState>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every posting, ordered by creation time
    pub async fn all_postings(&self) -> Vec<Posting> {
        let state = self.state.read().await;
        let mut postings: Vec<Posting> = state.postings.values().cloned().collect();
        postings.sort_by_key(|p| p.created_at);
        postings
    }

    /// Every audit row across all runs
    pub async fn all_raw_opportunities(&self) -> Vec<RawOpportunity> {
        self.state.read().await.raw_opportunities.clone()
    }
}

#[async_trait]
impl SourceRepository for InMemoryStore {
    async fn create_source(
        &self,
        request: IngestionSourceCreateRequest,
    ) -> RepositoryResult<IngestionSource> {
        let now = Utc::now();
        let source = IngestionSource {
            id: Uuid::new_v4(),
            name: request.name,
            endpoint: request.endpoint,
            source_type: request.source_type,
            default_posting_type: request.default_posting_type,
            run_frequency_minutes: request.run_frequency_minutes,
            enabled: request.enabled,
            last_run_at: None,
            last_success_at: None,
            created_at: now,
            updated_at: now,
        };

        self.state
            .write()
            .await
            .sources
            .insert(source.id, source.clone());
        Ok(source)
    }

    async fn find_source(&self, id: Uuid) -> RepositoryResult<Option<IngestionSource>> {
        Ok(self.state.read().await.sources.get(&id).cloned())
    }

    async fn list_sources(&self) -> RepositoryResult<Vec<IngestionSource>> {
        let state = self.state.read().await;
        let mut sources: Vec<IngestionSource> = state.sources.values().cloned().collect();
        sources.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(sources)
    }

    async fn list_enabled_sources(&self) -> RepositoryResult<Vec<IngestionSource>> {
        let mut sources = self.list_sources().await?;
        sources.retain(|source| source.enabled);
        Ok(sources)
    }

    async fn mark_source_attempt(
        &self,
        id: Uuid,
        attempted_at: DateTime<Utc>,
        fetch_succeeded: bool,
    ) -> RepositoryResult<()> {
        let mut state = self.state.write().await;
        let source = state
            .sources
            .get_mut(&id)
            .ok_or_else(|| RepositoryError::not_found("ingestion_sources", "id", id))?;

        source.last_run_at = Some(attempted_at);
        if fetch_succeeded {
            source.last_success_at = Some(attempted_at);
        }
        source.updated_at = Utc::now();
        Ok(())
    }
}

#[async_trait]
impl PostingRepository for InMemoryStore {
    async fn create_posting(&self, request: PostingCreateRequest) -> RepositoryResult<Posting> {
        let mut state = self.state.write().await;
        if state.postings.values().any(|p| p.slug == request.slug) {
            return Err(RepositoryError::ConstraintViolation {
                constraint: "postings_slug_unique".to_string(),
                message: format!("slug '{}' already exists", request.slug),
            });
        }

        let now = Utc::now();
        let posting = Posting {
            id: Uuid::new_v4(),
            slug: request.slug,
            posting_type: request.posting_type,
            status: request.status,
            title: request.title,
            company: request.company,
            description: request.description,
            apply_link: request.apply_link,
            locations: request.locations,
            work_mode: request.work_mode,
            experience_min: request.experience_min,
            experience_max: request.experience_max,
            allowed_passout_years: request.allowed_passout_years,
            required_skills: request.required_skills,
            allowed_education_levels: request.allowed_education_levels,
            provenance_note: request.provenance_note,
            created_by: request.created_by,
            link_health: LinkHealth::Healthy,
            verification_failures: 0,
            last_verified_at: None,
            deleted_at: None,
            created_at: now,
            updated_at: now,
        };

        state.postings.insert(posting.id, posting.clone());
        Ok(posting)
    }

    async fn find_posting(&self, id: Uuid) -> RepositoryResult<Option<Posting>> {
        Ok(self.state.read().await.postings.get(&id).cloned())
    }

    async fn find_active_by_apply_link(
        &self,
        apply_link: &str,
    ) -> RepositoryResult<Option<Posting>> {
        let state = self.state.read().await;
        Ok(state
            .postings
            .values()
            .filter(|p| !p.is_deleted())
            .find(|p| p.apply_link.as_deref() == Some(apply_link))
            .cloned())
    }

    async fn list_verification_candidates(
        &self,
        stale_before: DateTime<Utc>,
        limit: u64,
    ) -> RepositoryResult<Vec<Posting>> {
        let state = self.state.read().await;
        let mut candidates: Vec<Posting> = state
            .postings
            .values()
            .filter(|p| p.needs_verification(stale_before))
            .cloned()
            .collect();

        // Never-verified first, then oldest verification
        candidates.sort_by_key(|p| (p.last_verified_at.is_some(), p.last_verified_at, p.created_at));
        candidates.truncate(usize::try_from(limit).unwrap_or(usize::MAX));
        Ok(candidates)
    }

    async fn apply_link_health(
        &self,
        id: Uuid,
        update: &LinkHealthUpdate,
    ) -> RepositoryResult<Posting> {
        let mut state = self.state.write().await;
        let posting = state
            .postings
            .get_mut(&id)
            .ok_or_else(|| RepositoryError::not_found("postings", "id", id))?;

        posting.link_health = update.link_health;
        posting.verification_failures = update.verification_failures;
        posting.last_verified_at = Some(update.last_verified_at);
        if let Some(status) = update.status {
            posting.status = status;
        }
        posting.updated_at = Utc::now();
        Ok(posting.clone())
    }

    async fn soft_delete_posting(&self, id: Uuid, deleted_at: DateTime<Utc>) -> RepositoryResult<()> {
        let mut state = self.state.write().await;
        let posting = state
            .postings
            .get_mut(&id)
            .ok_or_else(|| RepositoryError::not_found("postings", "id", id))?;
        posting.deleted_at = Some(deleted_at);
        posting.updated_at = Utc::now();
        Ok(())
    }
}

#[async_trait]
impl IngestionRunRepository for InMemoryStore {
    async fn create_run(
        &self,
        source_id: Uuid,
        started_at: DateTime<Utc>,
    ) -> RepositoryResult<IngestionRun> {
        let run = IngestionRun {
            id: Uuid::new_v4(),
            source_id,
            status: RunStatus::Running,
            started_at,
            finished_at: None,
            fetched_count: 0,
            draft_created_count: 0,
            deduped_count: 0,
            rejected_count: 0,
            error_count: 0,
            error_summary: None,
        };
        self.state.write().await.runs.insert(run.id, run.clone());
        Ok(run)
    }

    async fn complete_run(
        &self,
        run_id: Uuid,
        completion: IngestionRunCompletion,
    ) -> RepositoryResult<IngestionRun> {
        let mut state = self.state.write().await;
        let run = state
            .runs
            .get_mut(&run_id)
            .ok_or_else(|| RepositoryError::not_found("ingestion_runs", "id", run_id))?;
        if run.status.is_terminal() {
            return Err(RepositoryError::ConstraintViolation {
                constraint: "ingestion_runs_single_completion".to_string(),
                message: format!("run {run_id} already finished as {}", run.status),
            });
        }

        run.status = completion.status;
        run.finished_at = Some(completion.finished_at);
        run.fetched_count = completion.counters.fetched;
        run.draft_created_count = completion.counters.draft_created;
        run.deduped_count = completion.counters.deduped;
        run.rejected_count = completion.counters.rejected;
        run.error_count = completion.counters.errored;
        run.error_summary = completion.error_summary;
        Ok(run.clone())
    }

    async fn find_run(&self, run_id: Uuid) -> RepositoryResult<Option<IngestionRun>> {
        Ok(self.state.read().await.runs.get(&run_id).cloned())
    }

    async fn list_runs_for_source(
        &self,
        source_id: Uuid,
        limit: u64,
    ) -> RepositoryResult<Vec<IngestionRun>> {
        let state = self.state.read().await;
        let mut runs: Vec<IngestionRun> = state
            .runs
            .values()
            .filter(|run| run.source_id == source_id)
            .cloned()
            .collect();
        runs.sort_by(|a, b| b.started_at.cmp(&a.started_at));
        runs.truncate(usize::try_from(limit).unwrap_or(usize::MAX));
        Ok(runs)
    }
}

#[async_trait]
impl RawOpportunityRepository for InMemoryStore {
    async fn insert_raw_opportunity(
        &self,
        request: RawOpportunityCreateRequest,
    ) -> RepositoryResult<RawOpportunity> {
        let record = RawOpportunity {
            id: Uuid::new_v4(),
            source_id: request.source_id,
            run_id: request.run_id,
            source_external_id: request.source_external_id,
            status: request.status,
            raw_payload: request.raw_payload,
            title: request.title,
            company: request.company,
            apply_link: request.apply_link,
            suggested_type: request.suggested_type,
            fresher_score: request.fresher_score,
            reason_flags: request.reason_flags,
            mapped_posting_id: request.mapped_posting_id,
            error_message: request.error_message,
            created_at: Utc::now(),
        };
        self.state
            .write()
            .await
            .raw_opportunities
            .push(record.clone());
        Ok(record)
    }

    async fn list_raw_opportunities_for_run(
        &self,
        run_id: Uuid,
    ) -> RepositoryResult<Vec<RawOpportunity>> {
        let state = self.state.read().await;
        Ok(state
            .raw_opportunities
            .iter()
            .filter(|record| record.run_id == run_id)
            .cloned()
            .collect())
    }
}
