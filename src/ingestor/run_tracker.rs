//! Ingestion run tracker
//!
//! Drives one source through fetch, normalize, score and dedup-or-draft,
//! writing one audit row per candidate and a single terminal run record.
//!
//! Run status moves `RUNNING -> SUCCESS | PARTIAL | FAILED` exactly once.

use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use super::writer::{DraftWriter, WriteOutcome};
use crate::classifier::{self, FresherScore};
use crate::config::IngestionConfig;
use crate::errors::{AppError, AppResult, ProcessingError};
use crate::models::{
    Candidate, IngestionRun, IngestionRunCompletion, IngestionSource, RawOpportunityCreateRequest,
    RawOpportunityStatus, RunCounters, RunStatus, RunSummary,
};
use crate::notifications::{NotificationDispatcher, NotificationEvent};
use crate::repositories::PipelineStore;
use crate::sources::SourceAdapterRegistry;

/// Terminal outcome of one candidate that did not error
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemOutcome {
    DraftCreated { posting_id: Uuid },
    Deduped { existing_posting_id: Uuid },
    Rejected { reason: String },
}

impl ItemOutcome {
    pub fn status(&self) -> RawOpportunityStatus {
        match self {
            ItemOutcome::DraftCreated { .. } => RawOpportunityStatus::DraftCreated,
            ItemOutcome::Deduped { .. } => RawOpportunityStatus::Deduped,
            ItemOutcome::Rejected { .. } => RawOpportunityStatus::Rejected,
        }
    }

    /// Only a freshly created draft is linked from the audit row
    pub fn mapped_posting_id(&self) -> Option<Uuid> {
        match self {
            ItemOutcome::DraftCreated { posting_id } => Some(*posting_id),
            _ => None,
        }
    }
}

impl From<WriteOutcome> for ItemOutcome {
    fn from(outcome: WriteOutcome) -> Self {
        match outcome {
            WriteOutcome::Created { posting_id } => ItemOutcome::DraftCreated { posting_id },
            WriteOutcome::Deduped {
                existing_posting_id,
            } => ItemOutcome::Deduped {
                existing_posting_id,
            },
            WriteOutcome::Rejected { reason } => ItemOutcome::Rejected { reason },
        }
    }
}

pub struct IngestionRunTracker<S: ?Sized> {
    store: Arc<S>,
    registry: Arc<SourceAdapterRegistry>,
    writer: DraftWriter<S>,
    config: IngestionConfig,
    dispatcher: NotificationDispatcher,
}

impl<S: PipelineStore + ?Sized> IngestionRunTracker<S> {
    pub fn new(
        store: Arc<S>,
        registry: Arc<SourceAdapterRegistry>,
        config: IngestionConfig,
        dispatcher: NotificationDispatcher,
    ) -> Self {
        Self {
            writer: DraftWriter::new(store.clone(), config.clone()),
            store,
            registry,
            config,
            dispatcher,
        }
    }

    /// Run one ingestion pass for `source`.
    ///
    /// A fetch failure or a fatal processing error finalizes the run as
    /// `FAILED` and is returned. Per-item errors only make the run `PARTIAL`.
    pub async fn run_source(&self, source: &IngestionSource) -> AppResult<RunSummary> {
        let started_at = Utc::now();
        let run = self.store.create_run(source.id, started_at).await?;
        info!(
            "Starting ingestion run {} for source '{}' ({})",
            run.id, source.name, source.source_type
        );

        let fetched = match self.fetch(source).await {
            Ok(candidates) => candidates,
            Err(e) => {
                error!("Fetching source '{}' failed: {}", source.name, e);
                if let Err(stamp_error) = self
                    .store
                    .mark_source_attempt(source.id, started_at, false)
                    .await
                {
                    warn!(
                        "Failed to record attempt for source '{}': {}",
                        source.name, stamp_error
                    );
                }
                let message = e.to_string();
                self.finish(source, &run, RunCounters::default(), RunStatus::Failed, Some(message))
                    .await?;
                return Err(e);
            }
        };
        if let Err(e) = self
            .store
            .mark_source_attempt(source.id, started_at, true)
            .await
        {
            error!("Failed to record attempt for source '{}': {}", source.name, e);
            let message = format!("failed to record source attempt: {e}");
            self.finish(source, &run, RunCounters::default(), RunStatus::Failed, Some(message))
                .await?;
            return Err(e.into());
        }

        let mut counters = RunCounters {
            fetched: i32::try_from(fetched.len()).unwrap_or(i32::MAX),
            ..Default::default()
        };
        let mut item_errors = Vec::new();

        let batch = self
            .process_batch(source, &run, &fetched, &mut counters, &mut item_errors)
            .await;

        match batch {
            Ok(()) => {
                let status = counters.completed_status();
                let error_summary = if item_errors.is_empty() {
                    None
                } else {
                    Some(item_errors.join("; "))
                };
                let completed = self
                    .finish(source, &run, counters, status, error_summary)
                    .await?;
                Ok(completed.summary())
            }
            Err(e) => {
                error!("Ingestion run {} for '{}' aborted: {}", run.id, source.name, e);
                self.finish(source, &run, counters, RunStatus::Failed, Some(e.to_string()))
                    .await?;
                Err(e)
            }
        }
    }

    async fn fetch(&self, source: &IngestionSource) -> AppResult<Vec<Candidate>> {
        let adapter = self.registry.get(source.source_type)?;
        let candidates = adapter.fetch_candidates(source).await?;
        debug!(
            "Source '{}' produced {} candidates",
            source.name,
            candidates.len()
        );
        Ok(candidates)
    }

    /// Process every candidate, stopping early only on a fatal error or an
    /// audit write failure
    async fn process_batch(
        &self,
        source: &IngestionSource,
        run: &IngestionRun,
        candidates: &[Candidate],
        counters: &mut RunCounters,
        item_errors: &mut Vec<String>,
    ) -> AppResult<()> {
        for candidate in candidates {
            let score = classifier::score(candidate);
            let result = self.process_item(source, candidate, &score).await;

            let (status, mapped_posting_id, error_message) = match &result {
                Ok(outcome) => (outcome.status(), outcome.mapped_posting_id(), None),
                Err(e) => (RawOpportunityStatus::Error, None, Some(e.to_string())),
            };

            self.store
                .insert_raw_opportunity(RawOpportunityCreateRequest {
                    source_id: source.id,
                    run_id: run.id,
                    source_external_id: candidate.external_id.clone(),
                    status,
                    raw_payload: candidate.raw_payload.clone(),
                    title: candidate.title.clone(),
                    company: candidate.company.clone(),
                    apply_link: candidate.apply_link.clone(),
                    suggested_type: candidate.posting_type,
                    fresher_score: score.score,
                    reason_flags: score.flag_names(),
                    mapped_posting_id,
                    error_message,
                })
                .await?;
            counters.record(status);

            if let Err(e) = result {
                if e.is_fatal() {
                    return Err(AppError::Processing(e));
                }
                warn!(
                    "Candidate '{}' from '{}' failed: {}",
                    candidate.title, source.name, e
                );
                item_errors.push(format!("{}: {}", candidate.title, e));
            }
        }

        Ok(())
    }

    async fn process_item(
        &self,
        source: &IngestionSource,
        candidate: &Candidate,
        score: &FresherScore,
    ) -> Result<ItemOutcome, ProcessingError> {
        if score.score >= self.config.high_confidence_score {
            info!(
                score = score.score,
                flags = ?score.flag_names(),
                "High confidence fresher candidate '{}' at {} from '{}'",
                candidate.title,
                candidate.company,
                source.name
            );
        }

        if !score.meets(self.config.min_fresher_score) {
            trace_rejection(candidate, score, self.config.min_fresher_score);
            return Ok(ItemOutcome::Rejected {
                reason: format!(
                    "fresher score {} below minimum {}",
                    score.score, self.config.min_fresher_score
                ),
            });
        }

        let outcome = self
            .writer
            .write_or_skip(candidate, &source.name, score)
            .await?;
        Ok(outcome.into())
    }

    /// Write the terminal run record and announce it
    async fn finish(
        &self,
        source: &IngestionSource,
        run: &IngestionRun,
        counters: RunCounters,
        status: RunStatus,
        error_summary: Option<String>,
    ) -> AppResult<IngestionRun> {
        let error_summary =
            error_summary.map(|summary| truncate_summary(&summary, self.config.error_summary_max_len));

        let completed = self
            .store
            .complete_run(
                run.id,
                IngestionRunCompletion {
                    status,
                    finished_at: Utc::now(),
                    counters,
                    error_summary: error_summary.clone(),
                },
            )
            .await?;

        info!(
            "Ingestion run {} for '{}' finished {}: fetched={} drafts={} deduped={} rejected={} errors={}",
            completed.id,
            source.name,
            completed.status,
            completed.fetched_count,
            completed.draft_created_count,
            completed.deduped_count,
            completed.rejected_count,
            completed.error_count
        );
        if status != RunStatus::Failed && !counters.is_balanced() {
            warn!("Run {} counters do not balance: {:?}", completed.id, counters);
        }

        self.dispatcher.notify(NotificationEvent::RunSummary {
            source_name: source.name.clone(),
            summary: completed.summary(),
            error_summary,
        });

        Ok(completed)
    }
}

fn trace_rejection(candidate: &Candidate, score: &FresherScore, minimum: i32) {
    debug!(
        "Rejected '{}' at {}: score {} < {} ({:?})",
        candidate.title,
        candidate.company,
        score.score,
        minimum,
        score.flag_names()
    );
}

/// Cut `summary` to at most `max_len` characters, marking the cut
pub fn truncate_summary(summary: &str, max_len: usize) -> String {
    if summary.chars().count() <= max_len {
        return summary.to_string();
    }
    if max_len <= 3 {
        return summary.chars().take(max_len).collect();
    }
    let mut truncated: String = summary.chars().take(max_len - 3).collect();
    truncated.push_str("...");
    truncated
}
