//! Source adapter registry
//!
//! Adapters are selected by the source's configured type tag, never by
//! sniffing the payload shape.

use reqwest::Client;
use std::collections::HashMap;
use std::sync::Arc;

use super::custom::CustomBoardAdapter;
use super::json_feed::JsonFeedAdapter;
use super::traits::SourceAdapter;
use super::workday::WorkdayAdapter;
use crate::errors::{SourceError, SourceResult};
use crate::models::SourceType;

#[derive(Clone, Default)]
pub struct SourceAdapterRegistry {
    adapters: HashMap<SourceType, Arc<dyn SourceAdapter>>,
}

impl SourceAdapterRegistry {
    /// Empty registry; see `with_defaults` for the built-in adapters
    pub fn new() -> Self {
        Self::default()
    }

    /// One adapter per supported source type, sharing `client`
    pub fn with_defaults(client: Client) -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(JsonFeedAdapter::new(client.clone())));
        registry.register(Arc::new(WorkdayAdapter::new(client.clone())));
        registry.register(Arc::new(CustomBoardAdapter::new(client)));
        registry
    }

    /// Register or replace the adapter for its source type
    pub fn register(&mut self, adapter: Arc<dyn SourceAdapter>) {
        self.adapters.insert(adapter.source_type(), adapter);
    }

    pub fn get(&self, source_type: SourceType) -> SourceResult<Arc<dyn SourceAdapter>> {
        self.adapters
            .get(&source_type)
            .cloned()
            .ok_or_else(|| SourceError::InvalidConfig {
                field: "source_type".to_string(),
                message: format!("no adapter registered for {source_type}"),
            })
    }

    pub fn supported_types(&self) -> Vec<SourceType> {
        SourceType::ALL
            .iter()
            .copied()
            .filter(|source_type| self.adapters.contains_key(source_type))
            .collect()
    }
}

impl std::fmt::Debug for SourceAdapterRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SourceAdapterRegistry")
            .field("supported_types", &self.supported_types())
            .finish()
    }
}
