//! Job-board schema with nested `designation` / `organization` objects

use async_trait::async_trait;
use reqwest::Client;
use serde_json::{Map, Value};
use tracing::{debug, warn};

use super::fetch::JsonFetcher;
use super::normalize::{
    as_text, field, infer_posting_type, infer_work_mode, list_field, parse_experience_value,
    passout_years, text_field,
};
use super::traits::SourceAdapter;
use crate::errors::SourceResult;
use crate::models::{Candidate, IngestionSource, SourceType};
use crate::utils::{strip_html, UrlUtils};

const LIST_KEYS: &[&str] = &["jobs", "data"];

pub struct CustomBoardAdapter {
    fetcher: JsonFetcher,
}

impl CustomBoardAdapter {
    pub fn new(client: Client) -> Self {
        Self {
            fetcher: JsonFetcher::new(client),
        }
    }

    fn entries(payload: &Value) -> Option<&Vec<Value>> {
        match payload {
            Value::Array(entries) => Some(entries),
            Value::Object(object) => field(object, LIST_KEYS).and_then(|list| match list {
                Value::Array(entries) => Some(entries),
                // {"data": {"jobs": [...]}}
                Value::Object(inner) => field(inner, LIST_KEYS).and_then(Value::as_array),
                _ => None,
            }),
            _ => None,
        }
    }

    /// `{min, max, currency}` or a preformatted string
    fn salary_line(entry: &Map<String, Value>) -> Option<String> {
        let salary = field(entry, &["salary", "stipend", "ctc"])?;
        let text = match salary {
            Value::Object(object) => {
                let min = field(object, &["min", "minimum"]).and_then(as_text);
                let max = field(object, &["max", "maximum"]).and_then(as_text);
                let range = match (min, max) {
                    (Some(min), Some(max)) if min == max => min,
                    (Some(min), Some(max)) => format!("{min} - {max}"),
                    (Some(only), None) | (None, Some(only)) => only,
                    (None, None) => return None,
                };
                match text_field(object, &["currency"]) {
                    Some(currency) => format!("{range} {currency}"),
                    None => range,
                }
            }
            other => as_text(other)?,
        };
        Some(format!("Salary: {text}"))
    }

    fn description(entry: &Map<String, Value>) -> String {
        let mut lines = Vec::new();
        if let Some(text) = text_field(entry, &["description", "jobDescription", "details"]) {
            lines.push(strip_html(&text));
        }
        if let Some(salary) = Self::salary_line(entry) {
            lines.push(salary);
        }
        if let Some(employment_type) = text_field(entry, &["employmentType"]) {
            lines.push(format!("Employment type: {employment_type}"));
        }
        if let Some(apply_by) = text_field(entry, &["applyBy", "lastDate", "deadline"]) {
            lines.push(format!("Apply by: {apply_by}"));
        }
        lines.retain(|line| !line.is_empty());
        lines.join("\n")
    }

    fn map_entry(source: &IngestionSource, entry: &Map<String, Value>) -> Option<Candidate> {
        let title = text_field(entry, &["designation", "title"])?;
        let company = text_field(entry, &["organization", "company"])?;

        let posting_type = infer_posting_type(
            text_field(entry, &["type", "jobType", "opportunityType"]).as_deref(),
            &title,
            source.default_posting_type,
        );
        let mut candidate = Candidate::new(posting_type, title, company);
        candidate.description = Self::description(entry);
        candidate.apply_link = text_field(entry, &["applyLink", "applyUrl", "url", "redirectUrl"])
            .and_then(|link| UrlUtils::resolve_against_site(&source.endpoint, &link));
        candidate.locations = list_field(entry, &["locations", "location", "city"]);
        candidate.work_mode = infer_work_mode(
            text_field(entry, &["workMode", "jobMode"]).as_deref(),
            &candidate.searchable_text(),
        );

        let (min, max) = field(entry, &["experience"])
            .map(parse_experience_value)
            .unwrap_or((None, None));
        candidate.experience_min = min;
        candidate.experience_max = max;

        candidate.passout_years = field(entry, &["passoutYears", "batch", "eligibleBatches"])
            .map(passout_years)
            .unwrap_or_default();
        candidate.skills = list_field(entry, &["skills"]);
        candidate.external_id = text_field(entry, &["id", "jobId", "slug"]);
        candidate.raw_payload = Value::Object(entry.clone());
        Some(candidate)
    }
}

#[async_trait]
impl SourceAdapter for CustomBoardAdapter {
    fn source_type(&self) -> SourceType {
        SourceType::Custom
    }

    async fn fetch(&self, source: &IngestionSource) -> SourceResult<Value> {
        self.fetcher.get(SourceType::Custom, &source.endpoint).await
    }

    fn normalize(&self, source: &IngestionSource, payload: &Value) -> Vec<Candidate> {
        let Some(entries) = Self::entries(payload) else {
            warn!("Board payload for '{}' has no jobs list", source.name);
            return Vec::new();
        };

        entries
            .iter()
            .filter_map(|entry| {
                let mapped = entry
                    .as_object()
                    .and_then(|object| Self::map_entry(source, object));
                if mapped.is_none() {
                    debug!(
                        "Dropping board entry without designation or organization from '{}'",
                        source.name
                    );
                }
                mapped
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{PostingType, WorkMode};
    use chrono::Utc;
    use serde_json::json;
    use uuid::Uuid;

    fn source() -> IngestionSource {
        IngestionSource {
            id: Uuid::new_v4(),
            name: "Campus Board".to_string(),
            endpoint: "https://campus.example.in/api/v2/jobs".to_string(),
            source_type: SourceType::Custom,
            default_posting_type: PostingType::Job,
            run_frequency_minutes: 30,
            enabled: true,
            last_run_at: None,
            last_success_at: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn folds_metadata_into_description() {
        let payload = json!({"data": {"jobs": [{
            "id": "b-77",
            "designation": {"name": "Associate Software Engineer"},
            "organization": {"name": "Beta Systems", "logo": "x.png"},
            "description": "<ul><li>Build APIs</li></ul>",
            "salary": {"min": 400000, "max": 600000, "currency": "INR"},
            "employmentType": "Full Time",
            "applyBy": "2025-01-31",
            "experience": "Fresher",
            "locations": [{"name": "Chennai"}, {"name": "Remote"}],
            "batch": [2024, 2025],
            "skills": [{"name": "Java"}, "Spring"],
            "applyLink": "https://beta.example.com/careers/77"
        }]}});

        let candidates = CustomBoardAdapter::new(Client::new()).normalize(&source(), &payload);
        assert_eq!(candidates.len(), 1);

        let candidate = &candidates[0];
        assert_eq!(candidate.title, "Associate Software Engineer");
        assert_eq!(candidate.company, "Beta Systems");
        assert_eq!(
            candidate.description,
            "Build APIs\nSalary: 400000 - 600000 INR\nEmployment type: Full Time\nApply by: 2025-01-31"
        );
        assert_eq!((candidate.experience_min, candidate.experience_max), (Some(0), Some(0)));
        assert_eq!(candidate.locations, vec!["Chennai", "Remote"]);
        assert_eq!(candidate.passout_years, vec![2024, 2025]);
        assert_eq!(candidate.skills, vec!["Java", "Spring"]);
        assert_eq!(candidate.external_id.as_deref(), Some("b-77"));
    }

    #[test]
    fn handles_string_fields_ranges_and_missing_experience() {
        let payload = json!({"jobs": [
            {
                "designation": "Data Analyst",
                "organization": "Gamma",
                "salary": "3-5 LPA",
                "experience": "0-5 years",
                "workMode": "WFH",
                "city": "Hyderabad"
            },
            {
                "designation": "QA Intern",
                "organization": {"name": "Delta"},
                "type": "internship"
            },
            {"designation": {"name": "Orphan role"}}
        ]});

        let candidates = CustomBoardAdapter::new(Client::new()).normalize(&source(), &payload);
        assert_eq!(candidates.len(), 2);

        assert_eq!(candidates[0].description, "Salary: 3-5 LPA");
        assert_eq!((candidates[0].experience_min, candidates[0].experience_max), (Some(0), Some(5)));
        assert_eq!(candidates[0].work_mode, Some(WorkMode::Remote));
        assert_eq!(candidates[0].locations, vec!["Hyderabad"]);

        assert_eq!(candidates[1].posting_type, PostingType::Internship);
        assert_eq!((candidates[1].experience_min, candidates[1].experience_max), (None, None));
        assert_eq!(candidates[1].apply_link, None);
    }
}
