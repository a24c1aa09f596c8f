//! Ingestion run model implementations

use crate::models::{IngestionRun, RawOpportunityStatus, RunCounters, RunStatus, RunSummary};

impl RunCounters {
    /// Count one processed item under its terminal status
    pub fn record(&mut self, status: RawOpportunityStatus) {
        match status {
            RawOpportunityStatus::DraftCreated => self.draft_created += 1,
            RawOpportunityStatus::Deduped => self.deduped += 1,
            RawOpportunityStatus::Rejected => self.rejected += 1,
            RawOpportunityStatus::Error => self.errored += 1,
        }
    }

    pub fn processed(&self) -> i32 {
        self.draft_created + self.deduped + self.rejected + self.errored
    }

    /// `draftCreated + deduped + rejected + errored == fetched`
    pub fn is_balanced(&self) -> bool {
        self.processed() == self.fetched
    }

    /// Status of a batch that ran to completion
    pub fn completed_status(&self) -> RunStatus {
        if self.errored == 0 {
            RunStatus::Success
        } else {
            RunStatus::Partial
        }
    }
}

impl RunStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, RunStatus::Running)
    }
}

impl IngestionRun {
    pub fn counters(&self) -> RunCounters {
        RunCounters {
            fetched: self.fetched_count,
            draft_created: self.draft_created_count,
            deduped: self.deduped_count,
            rejected: self.rejected_count,
            errored: self.error_count,
        }
    }

    pub fn summary(&self) -> RunSummary {
        RunSummary {
            source_id: self.source_id,
            run_id: self.id,
            status: self.status,
            fetched_count: self.fetched_count,
            draft_created_count: self.draft_created_count,
            deduped_count: self.deduped_count,
            rejected_count: self.rejected_count,
            error_count: self.error_count,
        }
    }
}
