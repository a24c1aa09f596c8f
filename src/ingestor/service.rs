//! Ingestion cycle over all enabled sources

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, error, info};
use uuid::Uuid;

use super::run_tracker::IngestionRunTracker;
use crate::config::IngestionConfig;
use crate::errors::{AppError, AppResult};
use crate::models::{CycleSummary, IngestionSource, RunSummary, SourceRunResult};
use crate::notifications::NotificationDispatcher;
use crate::repositories::PipelineStore;
use crate::sources::SourceAdapterRegistry;

pub struct IngestionService<S: ?Sized> {
    store: Arc<S>,
    tracker: IngestionRunTracker<S>,
}

impl<S: PipelineStore + ?Sized> IngestionService<S> {
    pub fn new(
        store: Arc<S>,
        registry: Arc<SourceAdapterRegistry>,
        config: IngestionConfig,
        dispatcher: NotificationDispatcher,
    ) -> Self {
        Self {
            tracker: IngestionRunTracker::new(store.clone(), registry, config, dispatcher),
            store,
        }
    }

    pub async fn run_cycle(&self) -> AppResult<CycleSummary> {
        self.run_cycle_at(Utc::now()).await
    }

    /// Evaluate every enabled source against `now` and run the due ones in
    /// order. A failing source is reported in its result and never stops the
    /// remaining sources.
    pub async fn run_cycle_at(&self, now: DateTime<Utc>) -> AppResult<CycleSummary> {
        let sources = self.store.list_enabled_sources().await?;
        let scanned_sources = sources.len();

        let runnable: Vec<IngestionSource> = sources
            .into_iter()
            .filter(|source| {
                let due = source.is_due(now);
                if !due {
                    debug!(
                        "Skipping source '{}' until {:?}",
                        source.name,
                        source.next_due_at()
                    );
                }
                due
            })
            .collect();

        info!(
            "Ingestion cycle: {} enabled sources, {} due",
            scanned_sources,
            runnable.len()
        );

        let mut results = Vec::with_capacity(runnable.len());
        for source in &runnable {
            let result = match self.tracker.run_source(source).await {
                Ok(summary) => SourceRunResult {
                    source_id: source.id,
                    source_name: source.name.clone(),
                    summary: Some(summary),
                    error: None,
                },
                Err(e) => {
                    error!("Source '{}' failed: {}", source.name, e);
                    SourceRunResult {
                        source_id: source.id,
                        source_name: source.name.clone(),
                        summary: None,
                        error: Some(e.to_string()),
                    }
                }
            };
            results.push(result);
        }

        Ok(CycleSummary {
            scanned_sources,
            runnable_sources: runnable.len(),
            results,
        })
    }

    /// Run a single source immediately, ignoring its re-run interval
    pub async fn run_source_by_id(&self, source_id: Uuid) -> AppResult<RunSummary> {
        let source = self
            .store
            .find_source(source_id)
            .await?
            .ok_or_else(|| AppError::not_found("ingestion_source", source_id))?;

        if !source.enabled {
            return Err(AppError::validation(format!(
                "source '{}' is disabled",
                source.name
            )));
        }

        self.tracker.run_source(&source).await
    }
}
