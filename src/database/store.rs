//! SeaORM implementation of the pipeline store
//!
//! One struct implements every repository trait over a shared connection.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::sea_query::NullOrdering;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, Order,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set,
};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::str::FromStr;
use std::sync::Arc;
use uuid::Uuid;

use crate::entities::{
    ingestion_runs, ingestion_sources, postings,
    prelude::{IngestionRuns, IngestionSources, Postings, RawOpportunities},
    raw_opportunities,
};
use crate::errors::{RepositoryError, RepositoryResult};
use crate::models::{
    IngestionRun, IngestionRunCompletion, IngestionSource, IngestionSourceCreateRequest,
    LinkHealth, LinkHealthUpdate, Posting, PostingCreateRequest, PostingStatus, RawOpportunity,
    RawOpportunityCreateRequest, RunStatus,
};
use crate::repositories::{
    IngestionRunRepository, PostingRepository, RawOpportunityRepository, SourceRepository,
};

#[derive(Clone)]
pub struct SeaOrmStore {
    connection: Arc<DatabaseConnection>,
}

impl SeaOrmStore {
    pub fn new(connection: Arc<DatabaseConnection>) -> Self {
        Self { connection }
    }

    pub fn get_connection(&self) -> &Arc<DatabaseConnection> {
        &self.connection
    }
}

fn parse_enum<T: FromStr>(field: &str, value: &str) -> RepositoryResult<T> {
    value
        .parse()
        .map_err(|_| RepositoryError::invalid_value(field, value))
}

fn from_json<T: DeserializeOwned>(value: serde_json::Value) -> RepositoryResult<T> {
    Ok(serde_json::from_value(value)?)
}

fn to_json<T: Serialize>(value: &T) -> RepositoryResult<serde_json::Value> {
    Ok(serde_json::to_value(value)?)
}

fn source_to_domain(m: ingestion_sources::Model) -> RepositoryResult<IngestionSource> {
    Ok(IngestionSource {
        id: m.id,
        source_type: parse_enum("source_type", &m.source_type)?,
        default_posting_type: parse_enum("default_posting_type", &m.default_posting_type)?,
        name: m.name,
        endpoint: m.endpoint,
        run_frequency_minutes: m.run_frequency_minutes,
        enabled: m.enabled,
        last_run_at: m.last_run_at,
        last_success_at: m.last_success_at,
        created_at: m.created_at,
        updated_at: m.updated_at,
    })
}

fn posting_to_domain(m: postings::Model) -> RepositoryResult<Posting> {
    Ok(Posting {
        id: m.id,
        slug: m.slug,
        posting_type: parse_enum("posting_type", &m.posting_type)?,
        status: parse_enum("status", &m.status)?,
        title: m.title,
        company: m.company,
        description: m.description,
        apply_link: m.apply_link,
        locations: from_json(m.locations)?,
        work_mode: m
            .work_mode
            .as_deref()
            .map(|mode| parse_enum("work_mode", mode))
            .transpose()?,
        experience_min: m.experience_min,
        experience_max: m.experience_max,
        allowed_passout_years: from_json(m.allowed_passout_years)?,
        required_skills: from_json(m.required_skills)?,
        allowed_education_levels: from_json(m.allowed_education_levels)?,
        provenance_note: m.provenance_note,
        created_by: m.created_by,
        link_health: parse_enum("link_health", &m.link_health)?,
        verification_failures: m.verification_failures,
        last_verified_at: m.last_verified_at,
        deleted_at: m.deleted_at,
        created_at: m.created_at,
        updated_at: m.updated_at,
    })
}

fn run_to_domain(m: ingestion_runs::Model) -> RepositoryResult<IngestionRun> {
    Ok(IngestionRun {
        id: m.id,
        source_id: m.source_id,
        status: parse_enum("status", &m.status)?,
        started_at: m.started_at,
        finished_at: m.finished_at,
        fetched_count: m.fetched_count,
        draft_created_count: m.draft_created_count,
        deduped_count: m.deduped_count,
        rejected_count: m.rejected_count,
        error_count: m.error_count,
        error_summary: m.error_summary,
    })
}

fn raw_opportunity_to_domain(m: raw_opportunities::Model) -> RepositoryResult<RawOpportunity> {
    Ok(RawOpportunity {
        id: m.id,
        source_id: m.source_id,
        run_id: m.run_id,
        source_external_id: m.source_external_id,
        status: parse_enum("status", &m.status)?,
        raw_payload: m.raw_payload,
        title: m.title,
        company: m.company,
        apply_link: m.apply_link,
        suggested_type: parse_enum("suggested_type", &m.suggested_type)?,
        fresher_score: m.fresher_score,
        reason_flags: from_json(m.reason_flags)?,
        mapped_posting_id: m.mapped_posting_id,
        error_message: m.error_message,
        created_at: m.created_at,
    })
}

#[async_trait]
impl SourceRepository for SeaOrmStore {
    async fn create_source(
        &self,
        request: IngestionSourceCreateRequest,
    ) -> RepositoryResult<IngestionSource> {
        let now = Utc::now();
        let active_model = ingestion_sources::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(request.name),
            endpoint: Set(request.endpoint),
            source_type: Set(request.source_type.as_str().to_string()),
            default_posting_type: Set(request.default_posting_type.as_str().to_string()),
            run_frequency_minutes: Set(request.run_frequency_minutes),
            enabled: Set(request.enabled),
            last_run_at: Set(None),
            last_success_at: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let model = active_model.insert(&*self.connection).await?;
        source_to_domain(model)
    }

    async fn find_source(&self, id: Uuid) -> RepositoryResult<Option<IngestionSource>> {
        IngestionSources::find_by_id(id)
            .one(&*self.connection)
            .await?
            .map(source_to_domain)
            .transpose()
    }

    async fn list_sources(&self) -> RepositoryResult<Vec<IngestionSource>> {
        IngestionSources::find()
            .order_by_asc(ingestion_sources::Column::Name)
            .all(&*self.connection)
            .await?
            .into_iter()
            .map(source_to_domain)
            .collect()
    }

    async fn list_enabled_sources(&self) -> RepositoryResult<Vec<IngestionSource>> {
        IngestionSources::find()
            .filter(ingestion_sources::Column::Enabled.eq(true))
            .order_by_asc(ingestion_sources::Column::Name)
            .all(&*self.connection)
            .await?
            .into_iter()
            .map(source_to_domain)
            .collect()
    }

    async fn mark_source_attempt(
        &self,
        id: Uuid,
        attempted_at: DateTime<Utc>,
        fetch_succeeded: bool,
    ) -> RepositoryResult<()> {
        let model = IngestionSources::find_by_id(id)
            .one(&*self.connection)
            .await?
            .ok_or_else(|| RepositoryError::not_found("ingestion_sources", "id", id))?;

        let mut active_model: ingestion_sources::ActiveModel = model.into();
        active_model.last_run_at = Set(Some(attempted_at));
        if fetch_succeeded {
            active_model.last_success_at = Set(Some(attempted_at));
        }
        active_model.updated_at = Set(Utc::now());
        active_model.update(&*self.connection).await?;
        Ok(())
    }
}

#[async_trait]
impl PostingRepository for SeaOrmStore {
    async fn create_posting(&self, request: PostingCreateRequest) -> RepositoryResult<Posting> {
        let slug_taken = Postings::find()
            .filter(postings::Column::Slug.eq(request.slug.as_str()))
            .count(&*self.connection)
            .await?
            > 0;
        if slug_taken {
            return Err(RepositoryError::ConstraintViolation {
                constraint: "postings_slug_unique".to_string(),
                message: format!("slug '{}' already exists", request.slug),
            });
        }

        let now = Utc::now();
        let active_model = postings::ActiveModel {
            id: Set(Uuid::new_v4()),
            slug: Set(request.slug),
            posting_type: Set(request.posting_type.as_str().to_string()),
            status: Set(request.status.as_str().to_string()),
            title: Set(request.title),
            company: Set(request.company),
            description: Set(request.description),
            apply_link: Set(request.apply_link),
            locations: Set(to_json(&request.locations)?),
            work_mode: Set(request.work_mode.map(|mode| mode.as_str().to_string())),
            experience_min: Set(request.experience_min),
            experience_max: Set(request.experience_max),
            allowed_passout_years: Set(to_json(&request.allowed_passout_years)?),
            required_skills: Set(to_json(&request.required_skills)?),
            allowed_education_levels: Set(to_json(&request.allowed_education_levels)?),
            provenance_note: Set(request.provenance_note),
            created_by: Set(request.created_by),
            link_health: Set(LinkHealth::Healthy.as_str().to_string()),
            verification_failures: Set(0),
            last_verified_at: Set(None),
            deleted_at: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let model = active_model.insert(&*self.connection).await?;
        posting_to_domain(model)
    }

    async fn find_posting(&self, id: Uuid) -> RepositoryResult<Option<Posting>> {
        Postings::find_by_id(id)
            .one(&*self.connection)
            .await?
            .map(posting_to_domain)
            .transpose()
    }

    async fn find_active_by_apply_link(
        &self,
        apply_link: &str,
    ) -> RepositoryResult<Option<Posting>> {
        Postings::find()
            .filter(postings::Column::ApplyLink.eq(apply_link))
            .filter(postings::Column::DeletedAt.is_null())
            .order_by_asc(postings::Column::CreatedAt)
            .one(&*self.connection)
            .await?
            .map(posting_to_domain)
            .transpose()
    }

    async fn list_verification_candidates(
        &self,
        stale_before: DateTime<Utc>,
        limit: u64,
    ) -> RepositoryResult<Vec<Posting>> {
        let due = Condition::any()
            .add(postings::Column::LastVerifiedAt.is_null())
            .add(postings::Column::LastVerifiedAt.lt(stale_before))
            .add(postings::Column::LinkHealth.eq(LinkHealth::Retrying.as_str()));

        Postings::find()
            .filter(postings::Column::Status.eq(PostingStatus::Published.as_str()))
            .filter(postings::Column::DeletedAt.is_null())
            .filter(postings::Column::ApplyLink.is_not_null())
            .filter(postings::Column::LinkHealth.ne(LinkHealth::Broken.as_str()))
            .filter(due)
            .order_by_with_nulls(
                postings::Column::LastVerifiedAt,
                Order::Asc,
                NullOrdering::First,
            )
            .order_by_asc(postings::Column::CreatedAt)
            .limit(limit)
            .all(&*self.connection)
            .await?
            .into_iter()
            .map(posting_to_domain)
            .collect()
    }

    async fn apply_link_health(
        &self,
        id: Uuid,
        update: &LinkHealthUpdate,
    ) -> RepositoryResult<Posting> {
        let model = Postings::find_by_id(id)
            .one(&*self.connection)
            .await?
            .ok_or_else(|| RepositoryError::not_found("postings", "id", id))?;

        let mut active_model: postings::ActiveModel = model.into();
        active_model.link_health = Set(update.link_health.as_str().to_string());
        active_model.verification_failures = Set(update.verification_failures);
        active_model.last_verified_at = Set(Some(update.last_verified_at));
        if let Some(status) = update.status {
            active_model.status = Set(status.as_str().to_string());
        }
        active_model.updated_at = Set(Utc::now());

        let model = active_model.update(&*self.connection).await?;
        posting_to_domain(model)
    }

    async fn soft_delete_posting(
        &self,
        id: Uuid,
        deleted_at: DateTime<Utc>,
    ) -> RepositoryResult<()> {
        let model = Postings::find_by_id(id)
            .one(&*self.connection)
            .await?
            .ok_or_else(|| RepositoryError::not_found("postings", "id", id))?;

        let mut active_model: postings::ActiveModel = model.into();
        active_model.deleted_at = Set(Some(deleted_at));
        active_model.updated_at = Set(Utc::now());
        active_model.update(&*self.connection).await?;
        Ok(())
    }
}

#[async_trait]
impl IngestionRunRepository for SeaOrmStore {
    async fn create_run(
        &self,
        source_id: Uuid,
        started_at: DateTime<Utc>,
    ) -> RepositoryResult<IngestionRun> {
        let active_model = ingestion_runs::ActiveModel {
            id: Set(Uuid::new_v4()),
            source_id: Set(source_id),
            status: Set(RunStatus::Running.as_str().to_string()),
            started_at: Set(started_at),
            finished_at: Set(None),
            fetched_count: Set(0),
            draft_created_count: Set(0),
            deduped_count: Set(0),
            rejected_count: Set(0),
            error_count: Set(0),
            error_summary: Set(None),
        };

        let model = active_model.insert(&*self.connection).await?;
        run_to_domain(model)
    }

    async fn complete_run(
        &self,
        run_id: Uuid,
        completion: IngestionRunCompletion,
    ) -> RepositoryResult<IngestionRun> {
        let model = IngestionRuns::find_by_id(run_id)
            .one(&*self.connection)
            .await?
            .ok_or_else(|| RepositoryError::not_found("ingestion_runs", "id", run_id))?;

        let current: RunStatus = parse_enum("status", &model.status)?;
        if current.is_terminal() {
            return Err(RepositoryError::ConstraintViolation {
                constraint: "ingestion_runs_single_completion".to_string(),
                message: format!("run {run_id} already finished as {current}"),
            });
        }

        let counters = completion.counters;
        let mut active_model: ingestion_runs::ActiveModel = model.into();
        active_model.status = Set(completion.status.as_str().to_string());
        active_model.finished_at = Set(Some(completion.finished_at));
        active_model.fetched_count = Set(counters.fetched);
        active_model.draft_created_count = Set(counters.draft_created);
        active_model.deduped_count = Set(counters.deduped);
        active_model.rejected_count = Set(counters.rejected);
        active_model.error_count = Set(counters.errored);
        active_model.error_summary = Set(completion.error_summary);

        let model = active_model.update(&*self.connection).await?;
        run_to_domain(model)
    }

    async fn find_run(&self, run_id: Uuid) -> RepositoryResult<Option<IngestionRun>> {
        IngestionRuns::find_by_id(run_id)
            .one(&*self.connection)
            .await?
            .map(run_to_domain)
            .transpose()
    }

    async fn list_runs_for_source(
        &self,
        source_id: Uuid,
        limit: u64,
    ) -> RepositoryResult<Vec<IngestionRun>> {
        IngestionRuns::find()
            .filter(ingestion_runs::Column::SourceId.eq(source_id))
            .order_by_desc(ingestion_runs::Column::StartedAt)
            .limit(limit)
            .all(&*self.connection)
            .await?
            .into_iter()
            .map(run_to_domain)
            .collect()
    }
}

#[async_trait]
impl RawOpportunityRepository for SeaOrmStore {
    async fn insert_raw_opportunity(
        &self,
        request: RawOpportunityCreateRequest,
    ) -> RepositoryResult<RawOpportunity> {
        let active_model = raw_opportunities::ActiveModel {
            id: Set(Uuid::new_v4()),
            source_id: Set(request.source_id),
            run_id: Set(request.run_id),
            source_external_id: Set(request.source_external_id),
            status: Set(request.status.as_str().to_string()),
            raw_payload: Set(request.raw_payload),
            title: Set(request.title),
            company: Set(request.company),
            apply_link: Set(request.apply_link),
            suggested_type: Set(request.suggested_type.as_str().to_string()),
            fresher_score: Set(request.fresher_score),
            reason_flags: Set(to_json(&request.reason_flags)?),
            mapped_posting_id: Set(request.mapped_posting_id),
            error_message: Set(request.error_message),
            created_at: Set(Utc::now()),
        };

        let model = active_model.insert(&*self.connection).await?;
        raw_opportunity_to_domain(model)
    }

    async fn list_raw_opportunities_for_run(
        &self,
        run_id: Uuid,
    ) -> RepositoryResult<Vec<RawOpportunity>> {
        RawOpportunities::find()
            .filter(raw_opportunities::Column::RunId.eq(run_id))
            .order_by_asc(raw_opportunities::Column::CreatedAt)
            .all(&*self.connection)
            .await?
            .into_iter()
            .map(raw_opportunity_to_domain)
            .collect()
    }
}
