//! Process-lifetime verification statistics
//!
//! Owned by whoever drives the verification pass; nothing here is persisted.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::models::VerificationSummary;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VerificationStats {
    pub runs: u64,
    pub processed: u64,
    pub healthy: u64,
    pub soft_failures: u64,
    pub hard_failures: u64,
    pub archived: u64,
    pub total_duration_seconds: f64,
    pub last_run: Option<VerificationSummary>,
    pub last_run_at: Option<DateTime<Utc>>,
}

impl VerificationStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one finished pass into the lifetime totals
    pub fn record(&mut self, summary: &VerificationSummary) {
        self.runs += 1;
        self.processed += u64::from(summary.processed);
        self.healthy += u64::from(summary.healthy);
        self.soft_failures += u64::from(summary.soft_failures);
        self.hard_failures += u64::from(summary.hard_failures);
        self.archived += u64::from(summary.archived);
        self.total_duration_seconds += summary.duration_seconds;
        self.last_run = Some(*summary);
        self.last_run_at = Some(Utc::now());
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_accumulates_and_reset_clears() {
        let mut stats = VerificationStats::new();
        let first = VerificationSummary {
            processed: 3,
            healthy: 1,
            soft_failures: 1,
            hard_failures: 1,
            archived: 0,
            duration_seconds: 1.5,
        };
        let second = VerificationSummary {
            processed: 2,
            hard_failures: 2,
            archived: 1,
            duration_seconds: 0.5,
            ..Default::default()
        };

        stats.record(&first);
        stats.record(&second);
        assert_eq!(stats.runs, 2);
        assert_eq!(stats.processed, 5);
        assert_eq!(stats.hard_failures, 3);
        assert_eq!(stats.archived, 1);
        assert_eq!(stats.total_duration_seconds, 2.0);
        assert_eq!(stats.last_run, Some(second));

        stats.reset();
        assert_eq!(stats, VerificationStats::default());
    }
}
