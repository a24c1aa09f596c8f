//! Posting model implementations

use chrono::{DateTime, Utc};

use crate::models::{LinkHealth, Posting, PostingStatus};

impl Posting {
    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }

    /// Whether the link verifier should probe this posting now.
    ///
    /// Published, not deleted, carrying an apply link, not quarantined, and
    /// either never verified, verified before `stale_before`, or retrying.
    pub fn needs_verification(&self, stale_before: DateTime<Utc>) -> bool {
        if self.status != PostingStatus::Published
            || self.is_deleted()
            || self.apply_link.is_none()
            || self.link_health == LinkHealth::Broken
        {
            return false;
        }

        self.link_health == LinkHealth::Retrying
            || self
                .last_verified_at
                .map_or(true, |verified| verified < stale_before)
    }
}
