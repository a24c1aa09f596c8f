//! Workday-style ATS search endpoints
//!
//! The search API is a `POST` with a facet body. Listings carry relative
//! `externalPath`s that resolve against the public career site rather than the
//! `/wday/cxs/...` API path.

use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Map, Value};
use tracing::{debug, warn};

use super::fetch::JsonFetcher;
use super::normalize::{
    field, infer_posting_type, infer_work_mode, list_field, parse_experience_text, text_field,
};
use super::traits::SourceAdapter;
use crate::errors::SourceResult;
use crate::models::{Candidate, IngestionSource, SourceType};
use crate::utils::{strip_html, UrlUtils};

const LIST_KEYS: &[&str] = &["jobPostings", "requisitions", "jobRequisitions"];
pub const SEARCH_PAGE_SIZE: u32 = 20;

pub struct WorkdayAdapter {
    fetcher: JsonFetcher,
}

impl WorkdayAdapter {
    pub fn new(client: Client) -> Self {
        Self {
            fetcher: JsonFetcher::new(client),
        }
    }

    pub fn search_body() -> Value {
        json!({
            "appliedFacets": {},
            "limit": SEARCH_PAGE_SIZE,
            "offset": 0,
            "searchText": ""
        })
    }

    fn entries(payload: &Value) -> Option<&Vec<Value>> {
        match payload {
            Value::Array(entries) => Some(entries),
            Value::Object(object) => field(object, LIST_KEYS).and_then(Value::as_array),
            _ => None,
        }
    }

    fn description(entry: &Map<String, Value>) -> String {
        let mut lines = Vec::new();
        if let Some(text) = text_field(entry, &["jobDescription", "description"]) {
            lines.push(strip_html(&text));
        }
        lines.extend(list_field(entry, &["bulletFields"]));
        if let Some(posted_on) = text_field(entry, &["postedOn"]) {
            lines.push(format!("Posted: {posted_on}"));
        }
        lines.retain(|line| !line.is_empty());
        lines.join("\n")
    }

    fn map_entry(source: &IngestionSource, entry: &Map<String, Value>) -> Option<Candidate> {
        let title = text_field(entry, &["title", "jobTitle"])?;
        let company = text_field(entry, &["company", "hiringOrganization", "companyName"])
            .or_else(|| Some(source.name.trim().to_string()).filter(|name| !name.is_empty()))?;

        let posting_type = infer_posting_type(
            text_field(entry, &["jobType", "workerSubType"]).as_deref(),
            &title,
            source.default_posting_type,
        );
        let mut candidate = Candidate::new(posting_type, title, company);
        candidate.description = Self::description(entry);

        candidate.apply_link = text_field(entry, &["externalUrl", "externalPath"])
            .and_then(|link| UrlUtils::resolve_workday_link(&source.endpoint, &link));
        candidate.locations = list_field(entry, &["locationsText", "locations", "location"]);
        candidate.work_mode = infer_work_mode(
            text_field(entry, &["remoteType", "workplaceType"]).as_deref(),
            &candidate.searchable_text(),
        );

        // Workday listings rarely state experience; use the description when they do
        let (min, max) = parse_experience_mentions(&candidate.description);
        candidate.experience_min = min;
        candidate.experience_max = max;

        candidate.external_id = text_field(entry, &["jobReqId", "id"])
            .or_else(|| text_field(entry, &["externalPath"]));
        candidate.raw_payload = Value::Object(entry.clone());
        Some(candidate)
    }
}

/// Only lines that talk about experience are parsed, so dates and IDs in
/// bullet fields are not mistaken for years of experience
fn parse_experience_mentions(description: &str) -> (Option<i32>, Option<i32>) {
    description
        .lines()
        .find(|line| line.to_lowercase().contains("experience"))
        .map(parse_experience_text)
        .unwrap_or((None, None))
}

#[async_trait]
impl SourceAdapter for WorkdayAdapter {
    fn source_type(&self) -> SourceType {
        SourceType::Workday
    }

    async fn fetch(&self, source: &IngestionSource) -> SourceResult<Value> {
        self.fetcher
            .post(SourceType::Workday, &source.endpoint, &Self::search_body())
            .await
    }

    fn normalize(&self, source: &IngestionSource, payload: &Value) -> Vec<Candidate> {
        let Some(entries) = Self::entries(payload) else {
            warn!("Workday response for '{}' has no job postings", source.name);
            return Vec::new();
        };

        entries
            .iter()
            .filter_map(|entry| {
                let mapped = entry
                    .as_object()
                    .and_then(|object| Self::map_entry(source, object));
                if mapped.is_none() {
                    debug!("Dropping Workday entry without a title from '{}'", source.name);
                }
                mapped
            })
            .collect()
    }
}
