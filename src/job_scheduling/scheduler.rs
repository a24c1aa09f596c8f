//! Cron driven scheduler for the ingestion and verification pipelines

use anyhow::{Context, Result};
use chrono::Utc;
use cron::Schedule;
use std::str::FromStr;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tokio::time::{sleep, Duration};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use super::guard::PipelineGuard;
use crate::config::SchedulerConfig;
use crate::ingestor::IngestionService;
use crate::repositories::PipelineStore;
use crate::verification::{LinkVerificationService, VerificationStats};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pipeline {
    Ingestion,
    Verification,
}

impl Pipeline {
    fn as_str(&self) -> &'static str {
        match self {
            Pipeline::Ingestion => "ingestion",
            Pipeline::Verification => "verification",
        }
    }
}

pub struct SchedulerService<S: ?Sized> {
    ingestion: Arc<IngestionService<S>>,
    verification: Arc<LinkVerificationService<S>>,
    ingestion_guard: PipelineGuard<()>,
    verification_guard: PipelineGuard<VerificationStats>,
    config: SchedulerConfig,
}

impl<S: PipelineStore + ?Sized + 'static> SchedulerService<S> {
    pub fn new(
        ingestion: Arc<IngestionService<S>>,
        verification: Arc<LinkVerificationService<S>>,
        config: SchedulerConfig,
    ) -> Self {
        Self {
            ingestion,
            verification,
            ingestion_guard: PipelineGuard::new("ingestion", ()),
            verification_guard: PipelineGuard::new("verification", VerificationStats::new()),
            config,
        }
    }

    pub fn ingestion_guard(&self) -> &PipelineGuard<()> {
        &self.ingestion_guard
    }

    pub fn verification_guard(&self) -> &PipelineGuard<VerificationStats> {
        &self.verification_guard
    }

    /// Run both cron loops until `cancellation_token` fires
    pub async fn run(self: Arc<Self>, cancellation_token: CancellationToken) -> Result<()> {
        let ingestion_schedule = parse_schedule(&self.config.ingestion_cron)?;
        let verification_schedule = parse_schedule(&self.config.verification_cron)?;

        info!(
            "Starting scheduler (ingestion '{}', verification '{}')",
            self.config.ingestion_cron, self.config.verification_cron
        );

        if self.config.run_on_startup {
            self.trigger(Pipeline::Ingestion);
            self.trigger(Pipeline::Verification);
        }

        tokio::join!(
            Arc::clone(&self).cron_loop(
                Pipeline::Ingestion,
                ingestion_schedule,
                cancellation_token.clone()
            ),
            Arc::clone(&self).cron_loop(
                Pipeline::Verification,
                verification_schedule,
                cancellation_token.clone()
            ),
        );

        info!("Scheduler stopped");
        Ok(())
    }

    async fn cron_loop(
        self: Arc<Self>,
        pipeline: Pipeline,
        schedule: Schedule,
        cancellation_token: CancellationToken,
    ) {
        loop {
            let Some(next) = schedule.upcoming(Utc).next() else {
                warn!("No upcoming {} run in schedule; loop exiting", pipeline.as_str());
                return;
            };
            let wait = (next - Utc::now()).to_std().unwrap_or(Duration::ZERO);
            debug!(
                "Next {} run at {}",
                pipeline.as_str(),
                next.format("%Y-%m-%d %H:%M:%S UTC")
            );

            tokio::select! {
                _ = sleep(wait) => {
                    self.trigger(pipeline);
                }
                _ = cancellation_token.cancelled() => {
                    info!("{} loop received cancellation signal, shutting down", pipeline.as_str());
                    return;
                }
            }
        }
    }

    /// Start one pipeline invocation in the background.
    ///
    /// Returns `None` without doing anything when the previous invocation of
    /// the same pipeline has not finished.
    pub fn trigger(self: &Arc<Self>, pipeline: Pipeline) -> Option<JoinHandle<()>> {
        match pipeline {
            Pipeline::Ingestion => {
                let Some(permit) = self.ingestion_guard.try_acquire() else {
                    warn!(
                        "Previous {} run still running; skipping this tick",
                        self.ingestion_guard.name()
                    );
                    return None;
                };
                let ingestion = Arc::clone(&self.ingestion);
                Some(tokio::spawn(async move {
                    let _permit = permit;
                    match ingestion.run_cycle().await {
                        Ok(summary) => info!(
                            "Ingestion cycle done: {} scanned, {} run, {} failed",
                            summary.scanned_sources,
                            summary.runnable_sources,
                            summary.results.iter().filter(|r| r.error.is_some()).count()
                        ),
                        Err(e) => error!("Ingestion cycle failed: {}", e),
                    }
                }))
            }
            Pipeline::Verification => {
                let Some(mut stats) = self.verification_guard.try_acquire() else {
                    warn!(
                        "Previous {} run still running; skipping this tick",
                        self.verification_guard.name()
                    );
                    return None;
                };
                let verification = Arc::clone(&self.verification);
                Some(tokio::spawn(async move {
                    if let Err(e) = verification.run(&mut stats).await {
                        error!("Link verification failed: {}", e);
                    } else {
                        debug!("Lifetime verification runs: {}", stats.runs);
                    }
                }))
            }
        }
    }
}

fn parse_schedule(expression: &str) -> Result<Schedule> {
    Schedule::from_str(expression)
        .with_context(|| format!("Invalid cron expression '{expression}'"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{IngestionConfig, VerificationConfig};
    use crate::notifications::NotificationDispatcher;
    use crate::repositories::InMemoryStore;
    use crate::sources::SourceAdapterRegistry;
    use crate::verification::{LinkProber, ProbeResult};
    use async_trait::async_trait;

    struct AlwaysHealthy;

    #[async_trait]
    impl LinkProber for AlwaysHealthy {
        async fn probe(&self, _url: &str) -> ProbeResult {
            ProbeResult::Healthy
        }
    }

    fn scheduler() -> Arc<SchedulerService<InMemoryStore>> {
        let store = Arc::new(InMemoryStore::new());
        let ingestion = IngestionService::new(
            store.clone(),
            Arc::new(SourceAdapterRegistry::new()),
            IngestionConfig::default(),
            NotificationDispatcher::empty(),
        );
        let verification = LinkVerificationService::new(
            store,
            Arc::new(AlwaysHealthy),
            VerificationConfig::default(),
            NotificationDispatcher::empty(),
        );
        Arc::new(SchedulerService::new(
            Arc::new(ingestion),
            Arc::new(verification),
            SchedulerConfig::default(),
        ))
    }

    #[tokio::test]
    #[tracing_test::traced_test]
    async fn tick_is_skipped_while_previous_run_holds_the_guard() {
        let scheduler = scheduler();

        let held = scheduler.ingestion_guard().try_acquire().unwrap();
        assert!(scheduler.trigger(Pipeline::Ingestion).is_none());
        assert!(logs_contain("Previous ingestion run still running"));
        drop(held);

        let stats = scheduler.verification_guard().try_acquire().unwrap();
        assert!(scheduler.trigger(Pipeline::Verification).is_none());
        assert!(logs_contain("Previous verification run still running"));
        drop(stats);

        let handle = scheduler.trigger(Pipeline::Ingestion).unwrap();
        handle.await.unwrap();
    }

    #[tokio::test]
    async fn verification_stats_survive_between_passes() {
        let scheduler = scheduler();

        for _ in 0..2 {
            scheduler.trigger(Pipeline::Verification).unwrap().await.unwrap();
        }

        let stats = scheduler.verification_guard().try_acquire().unwrap();
        assert_eq!(stats.runs, 2);
    }

    #[tokio::test]
    async fn run_stops_on_cancellation() {
        let scheduler = scheduler();
        let token = CancellationToken::new();
        token.cancel();

        scheduler.run(token).await.unwrap();
    }

    #[test]
    fn invalid_cron_is_rejected() {
        assert!(parse_schedule("0 */30 * * * *").is_ok());
        assert!(parse_schedule("every half hour").is_err());
    }
}
