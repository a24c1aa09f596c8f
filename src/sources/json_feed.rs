//! Generic list-of-objects JSON feed

use async_trait::async_trait;
use reqwest::Client;
use serde_json::{Map, Value};
use tracing::{debug, warn};

use super::fetch::JsonFetcher;
use super::normalize::{
    field, infer_posting_type, infer_work_mode, int_field, list_field, parse_experience_value,
    passout_years, text_field,
};
use super::traits::SourceAdapter;
use crate::errors::SourceResult;
use crate::models::{Candidate, IngestionSource, SourceType, WorkMode};
use crate::utils::{strip_html, UrlUtils};

const LIST_KEYS: &[&str] = &["jobs", "data", "results", "items", "postings", "opportunities"];

const TITLE: &[&str] = &["title", "jobTitle", "position", "role", "name"];
const COMPANY: &[&str] = &["company", "companyName", "organization", "employer"];
const DESCRIPTION: &[&str] = &["description", "summary", "details", "jobDescription"];
const APPLY_LINK: &[&str] = &["applyLink", "applyUrl", "url", "link", "jobUrl"];
const LOCATIONS: &[&str] = &["locations", "location", "city"];
const WORK_MODE: &[&str] = &["workMode", "workplaceType"];
const EXPERIENCE_MIN: &[&str] = &["experienceMin", "minExperience"];
const EXPERIENCE_MAX: &[&str] = &["experienceMax", "maxExperience"];
const EXPERIENCE: &[&str] = &["experience"];
const PASSOUT_YEARS: &[&str] = &["passoutYears", "batch", "graduationYears"];
const SKILLS: &[&str] = &["skills", "tags"];
const POSTING_TYPE: &[&str] = &["type", "postingType", "jobType"];
const EXTERNAL_ID: &[&str] = &["id", "jobId", "externalId"];

pub struct JsonFeedAdapter {
    fetcher: JsonFetcher,
}

impl JsonFeedAdapter {
    pub fn new(client: Client) -> Self {
        Self {
            fetcher: JsonFetcher::new(client),
        }
    }

    /// Top-level array, or the first array under a well-known key
    fn entries(payload: &Value) -> Option<&Vec<Value>> {
        match payload {
            Value::Array(entries) => Some(entries),
            Value::Object(object) => field(object, LIST_KEYS).and_then(Value::as_array),
            _ => None,
        }
    }

    fn map_entry(source: &IngestionSource, entry: &Map<String, Value>) -> Option<Candidate> {
        let title = text_field(entry, TITLE)?;
        let company = text_field(entry, COMPANY)?;

        let posting_type = infer_posting_type(
            text_field(entry, POSTING_TYPE).as_deref(),
            &title,
            source.default_posting_type,
        );
        let mut candidate = Candidate::new(posting_type, title, company);

        candidate.description = text_field(entry, DESCRIPTION)
            .map(|raw| strip_html(&raw))
            .unwrap_or_default();
        candidate.apply_link = text_field(entry, APPLY_LINK)
            .and_then(|link| UrlUtils::resolve_against_site(&source.endpoint, &link));
        candidate.locations = list_field(entry, LOCATIONS);

        let remote_flag = field(entry, &["remote"])
            .and_then(Value::as_bool)
            .filter(|remote| *remote)
            .map(|_| WorkMode::Remote);
        candidate.work_mode = remote_flag.or_else(|| {
            infer_work_mode(
                text_field(entry, WORK_MODE).as_deref(),
                &candidate.searchable_text(),
            )
        });

        let (text_min, text_max) = field(entry, EXPERIENCE)
            .map(parse_experience_value)
            .unwrap_or((None, None));
        candidate.experience_min = int_field(entry, EXPERIENCE_MIN).or(text_min);
        candidate.experience_max = int_field(entry, EXPERIENCE_MAX).or(text_max);

        candidate.passout_years = field(entry, PASSOUT_YEARS)
            .map(passout_years)
            .unwrap_or_default();
        candidate.skills = list_field(entry, SKILLS);
        candidate.external_id = text_field(entry, EXTERNAL_ID);
        candidate.raw_payload = Value::Object(entry.clone());

        Some(candidate)
    }
}

#[async_trait]
impl SourceAdapter for JsonFeedAdapter {
    fn source_type(&self) -> SourceType {
        SourceType::JsonFeed
    }

    async fn fetch(&self, source: &IngestionSource) -> SourceResult<Value> {
        self.fetcher.get(SourceType::JsonFeed, &source.endpoint).await
    }

    fn normalize(&self, source: &IngestionSource, payload: &Value) -> Vec<Candidate> {
        let Some(entries) = Self::entries(payload) else {
            warn!("Feed for source '{}' contains no job list", source.name);
            return Vec::new();
        };

        entries
            .iter()
            .enumerate()
            .filter_map(|(index, entry)| {
                let mapped = entry
                    .as_object()
                    .and_then(|object| Self::map_entry(source, object));
                if mapped.is_none() {
                    debug!(
                        "Dropping entry {} from '{}': missing title or company",
                        index, source.name
                    );
                }
                mapped
            })
            .collect()
    }
}
