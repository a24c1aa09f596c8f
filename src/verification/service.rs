//! Link verification pass
//!
//! Probes a bounded batch of published postings one at a time and feeds each
//! result through the quarantine state machine.

use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use tracing::{info, warn};

use super::prober::{LinkProber, ProbeResult};
use super::quarantine::transition;
use super::stats::VerificationStats;
use crate::config::VerificationConfig;
use crate::errors::{AppError, AppResult};
use crate::models::{LinkHealth, VerificationSummary};
use crate::notifications::{NotificationDispatcher, NotificationEvent};
use crate::repositories::PostingRepository;

pub struct LinkVerificationService<S: ?Sized> {
    store: Arc<S>,
    prober: Arc<dyn LinkProber>,
    config: VerificationConfig,
    dispatcher: NotificationDispatcher,
}

impl<S: PostingRepository + ?Sized> LinkVerificationService<S> {
    pub fn new(
        store: Arc<S>,
        prober: Arc<dyn LinkProber>,
        config: VerificationConfig,
        dispatcher: NotificationDispatcher,
    ) -> Self {
        Self {
            store,
            prober,
            config,
            dispatcher,
        }
    }

    /// Run one pass and fold its summary into `stats`
    pub async fn run(&self, stats: &mut VerificationStats) -> AppResult<VerificationSummary> {
        let started = Instant::now();
        let stale_after = chrono::Duration::from_std(self.config.stale_after).map_err(|e| {
            AppError::configuration(format!("verification.stale_after is out of range: {e}"))
        })?;
        let stale_before = Utc::now() - stale_after;

        let postings = self
            .store
            .list_verification_candidates(stale_before, self.config.batch_size)
            .await?;
        info!("Verifying apply links of {} postings", postings.len());

        let mut summary = VerificationSummary::default();
        for posting in postings {
            let Some(apply_link) = posting.apply_link.as_deref() else {
                continue;
            };

            let result = self.prober.probe(apply_link).await;
            let update = transition(&posting, result, self.config.max_failures, Utc::now());

            if let Err(e) = self.store.apply_link_health(posting.id, &update).await {
                warn!("Failed to record link health for posting {}: {}", posting.id, e);
                continue;
            }

            summary.processed += 1;
            match result {
                ProbeResult::Healthy => summary.healthy += 1,
                ProbeResult::SoftFail => summary.soft_failures += 1,
                ProbeResult::HardFail => summary.hard_failures += 1,
            }

            if update.link_health == LinkHealth::Broken {
                summary.archived += 1;
                warn!(
                    "Archived posting {} ('{}' at {}) after {} failed link checks",
                    posting.id, posting.title, posting.company, update.verification_failures
                );
                self.dispatcher.notify(NotificationEvent::LinkArchived {
                    posting_id: posting.id,
                    title: posting.title.clone(),
                    company: posting.company.clone(),
                    apply_link: posting.apply_link.clone(),
                    verification_failures: update.verification_failures,
                });
            }
        }

        summary.duration_seconds = started.elapsed().as_secs_f64();
        stats.record(&summary);

        info!(
            "Link verification processed {}: healthy={} soft={} hard={} archived={} in {:.2}s",
            summary.processed,
            summary.healthy,
            summary.soft_failures,
            summary.hard_failures,
            summary.archived,
            summary.duration_seconds
        );
        self.dispatcher
            .notify(NotificationEvent::VerificationSummary { summary });

        Ok(summary)
    }
}
