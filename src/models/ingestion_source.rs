//! Ingestion source model implementations

use chrono::{DateTime, Duration, Utc};

use crate::models::IngestionSource;

impl IngestionSource {
    /// Whether the source may run in a cycle evaluated at `now`.
    ///
    /// A source that never ran is always due. Otherwise the minimum re-run
    /// interval is measured from the last attempt, whatever its outcome.
    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        match self.last_run_at {
            None => true,
            Some(last_run_at) => {
                now.signed_duration_since(last_run_at) >= self.run_frequency()
            }
        }
    }

    /// Earliest time the source becomes runnable again
    pub fn next_due_at(&self) -> Option<DateTime<Utc>> {
        self.last_run_at.map(|last| last + self.run_frequency())
    }

    fn run_frequency(&self) -> Duration {
        Duration::minutes(self.run_frequency_minutes.max(0))
    }
}
