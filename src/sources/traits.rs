//! Source adapter trait definitions

use async_trait::async_trait;
use serde_json::Value;

use crate::errors::SourceResult;
use crate::models::{Candidate, IngestionSource, SourceType};

/// Turns one source type's feed into canonical candidates.
///
/// `fetch` owns the transport and fails the whole run when the feed cannot be
/// retrieved or decoded. `normalize` is pure and never fails: entries that
/// cannot be mapped are dropped individually.
#[async_trait]
pub trait SourceAdapter: Send + Sync {
    /// The source type this adapter handles
    fn source_type(&self) -> SourceType;

    /// Retrieve the raw JSON payload for `source`
    async fn fetch(&self, source: &IngestionSource) -> SourceResult<Value>;

    /// Map a fetched payload onto candidates
    fn normalize(&self, source: &IngestionSource, payload: &Value) -> Vec<Candidate>;

    async fn fetch_candidates(&self, source: &IngestionSource) -> SourceResult<Vec<Candidate>> {
        let payload = self.fetch(source).await?;
        Ok(self.normalize(source, &payload))
    }
}
