//! Notifier trait and the events the pipelines emit

use serde::Serialize;
use uuid::Uuid;

use crate::models::{RunSummary, VerificationSummary};

#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Endpoint rejected notification with status {status}")]
    Rejected { status: u16 },

    #[error("Configuration error: {0}")]
    Config(String),
}

/// Operator-facing events. Delivery is best effort.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum NotificationEvent {
    /// A posting was quarantined after repeated hard failures
    LinkArchived {
        posting_id: Uuid,
        title: String,
        company: String,
        apply_link: Option<String>,
        verification_failures: i32,
    },
    /// One source's ingestion run finished
    RunSummary {
        source_name: String,
        summary: RunSummary,
        error_summary: Option<String>,
    },
    /// One verification pass finished
    VerificationSummary { summary: VerificationSummary },
}

impl NotificationEvent {
    pub fn kind(&self) -> &'static str {
        match self {
            NotificationEvent::LinkArchived { .. } => "link_archived",
            NotificationEvent::RunSummary { .. } => "run_summary",
            NotificationEvent::VerificationSummary { .. } => "verification_summary",
        }
    }

    /// One-line human summary
    pub fn subject(&self) -> String {
        match self {
            NotificationEvent::LinkArchived {
                title,
                company,
                verification_failures,
                ..
            } => format!(
                "Archived '{title}' at {company} after {verification_failures} failed link checks"
            ),
            NotificationEvent::RunSummary {
                source_name,
                summary,
                ..
            } => format!(
                "Ingestion of '{}' finished {}: {} fetched, {} drafts, {} deduped, {} rejected, {} errors",
                source_name,
                summary.status,
                summary.fetched_count,
                summary.draft_created_count,
                summary.deduped_count,
                summary.rejected_count,
                summary.error_count
            ),
            NotificationEvent::VerificationSummary { summary } => format!(
                "Link verification processed {}: {} healthy, {} soft failures, {} hard failures, {} archived",
                summary.processed,
                summary.healthy,
                summary.soft_failures,
                summary.hard_failures,
                summary.archived
            ),
        }
    }
}

/// A delivery channel
#[async_trait::async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, event: &NotificationEvent) -> Result<(), NotifyError>;

    /// Human-readable name for this channel (e.g. "webhook", "log")
    fn channel_name(&self) -> &str;
}

/// Result of delivering one event to one channel
#[derive(Debug, Clone)]
pub struct DispatchResult {
    pub channel: String,
    pub success: bool,
    pub error: Option<String>,
    pub duration_ms: u64,
}
