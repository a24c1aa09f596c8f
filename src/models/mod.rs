use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub mod candidate;
pub mod ingestion_run;
pub mod ingestion_source;
pub mod posting;

/// Configuration for one external feed. Written by operators, read-only to the pipeline.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct IngestionSource {
    pub id: Uuid,
    pub name: String,
    pub endpoint: String,
    pub source_type: SourceType,
    pub default_posting_type: PostingType,
    pub run_frequency_minutes: i64,
    pub enabled: bool,
    pub last_run_at: Option<DateTime<Utc>>,
    pub last_success_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SourceType {
    /// Generic list-of-objects JSON feed with loosely named fields
    JsonFeed,
    /// Workday-style ATS search endpoint
    Workday,
    /// Job-board schema with nested designation/organization objects
    Custom,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PostingType {
    Job,
    Internship,
    WalkIn,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WorkMode {
    Remote,
    Hybrid,
    Onsite,
}

/// Normalized, in-memory representation of one external posting.
///
/// Never persisted directly; lives for one ingestion pass.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    pub posting_type: PostingType,
    pub title: String,
    pub company: String,
    pub description: String,
    pub apply_link: Option<String>,
    pub locations: Vec<String>,
    pub work_mode: Option<WorkMode>,
    pub experience_min: Option<i32>,
    pub experience_max: Option<i32>,
    pub passout_years: Vec<i32>,
    pub skills: Vec<String>,
    pub external_id: Option<String>,
    pub raw_payload: serde_json::Value,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PostingStatus {
    Draft,
    Published,
    Archived,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LinkHealth {
    Healthy,
    Retrying,
    /// Terminal until an operator reactivates the posting
    Broken,
}

/// The externally visible job/internship/walk-in record ("Opportunity").
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Posting {
    pub id: Uuid,
    pub slug: String,
    pub posting_type: PostingType,
    pub status: PostingStatus,
    pub title: String,
    pub company: String,
    pub description: String,
    pub apply_link: Option<String>,
    pub locations: Vec<String>,
    pub work_mode: Option<WorkMode>,
    pub experience_min: Option<i32>,
    pub experience_max: Option<i32>,
    pub allowed_passout_years: Vec<i32>,
    pub required_skills: Vec<String>,
    pub allowed_education_levels: Vec<String>,
    pub provenance_note: Option<String>,
    pub created_by: String,
    pub link_health: LinkHealth,
    pub verification_failures: i32,
    pub last_verified_at: Option<DateTime<Utc>>,
    pub deleted_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields for a posting created by the pipeline (always a draft) or seeded by an operator.
#[derive(Debug, Clone)]
pub struct PostingCreateRequest {
    pub slug: String,
    pub posting_type: PostingType,
    pub status: PostingStatus,
    pub title: String,
    pub company: String,
    pub description: String,
    pub apply_link: Option<String>,
    pub locations: Vec<String>,
    pub work_mode: Option<WorkMode>,
    pub experience_min: Option<i32>,
    pub experience_max: Option<i32>,
    pub allowed_passout_years: Vec<i32>,
    pub required_skills: Vec<String>,
    pub allowed_education_levels: Vec<String>,
    pub provenance_note: Option<String>,
    pub created_by: String,
}

/// A single record update produced by the quarantine state machine.
#[derive(Debug, Clone, PartialEq)]
pub struct LinkHealthUpdate {
    pub link_health: LinkHealth,
    pub verification_failures: i32,
    pub last_verified_at: DateTime<Utc>,
    /// Set when the posting must leave candidate-facing feeds
    pub status: Option<PostingStatus>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IngestionSourceCreateRequest {
    pub name: String,
    pub endpoint: String,
    pub source_type: SourceType,
    pub default_posting_type: PostingType,
    pub run_frequency_minutes: i64,
    pub enabled: bool,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RunStatus {
    Running,
    Success,
    Partial,
    Failed,
}

/// One invocation of a source's ingestion pass.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct IngestionRun {
    pub id: Uuid,
    pub source_id: Uuid,
    pub status: RunStatus,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    pub fetched_count: i32,
    pub draft_created_count: i32,
    pub deduped_count: i32,
    pub rejected_count: i32,
    pub error_count: i32,
    pub error_summary: Option<String>,
}

/// Terminal state written once for a run.
#[derive(Debug, Clone, PartialEq)]
pub struct IngestionRunCompletion {
    pub status: RunStatus,
    pub finished_at: DateTime<Utc>,
    pub counters: RunCounters,
    pub error_summary: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RunCounters {
    pub fetched: i32,
    pub draft_created: i32,
    pub deduped: i32,
    pub rejected: i32,
    pub errored: i32,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RawOpportunityStatus {
    DraftCreated,
    Deduped,
    Rejected,
    Error,
}

/// Write-once audit record: one per processed candidate per run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RawOpportunity {
    pub id: Uuid,
    pub source_id: Uuid,
    pub run_id: Uuid,
    pub source_external_id: Option<String>,
    pub status: RawOpportunityStatus,
    pub raw_payload: serde_json::Value,
    pub title: String,
    pub company: String,
    pub apply_link: Option<String>,
    pub suggested_type: PostingType,
    pub fresher_score: i32,
    pub reason_flags: Vec<String>,
    pub mapped_posting_id: Option<Uuid>,
    pub error_message: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct RawOpportunityCreateRequest {
    pub source_id: Uuid,
    pub run_id: Uuid,
    pub source_external_id: Option<String>,
    pub status: RawOpportunityStatus,
    pub raw_payload: serde_json::Value,
    pub title: String,
    pub company: String,
    pub apply_link: Option<String>,
    pub suggested_type: PostingType,
    pub fresher_score: i32,
    pub reason_flags: Vec<String>,
    pub mapped_posting_id: Option<Uuid>,
    pub error_message: Option<String>,
}

/// Per-source run summary returned to the caller.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RunSummary {
    pub source_id: Uuid,
    pub run_id: Uuid,
    pub status: RunStatus,
    pub fetched_count: i32,
    pub draft_created_count: i32,
    pub deduped_count: i32,
    pub rejected_count: i32,
    pub error_count: i32,
}

/// Outcome for one source inside a cycle; a failed source never hides the others.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SourceRunResult {
    pub source_id: Uuid,
    pub source_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<RunSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CycleSummary {
    pub scanned_sources: usize,
    pub runnable_sources: usize,
    pub results: Vec<SourceRunResult>,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct VerificationSummary {
    pub processed: u32,
    pub healthy: u32,
    pub soft_failures: u32,
    pub hard_failures: u32,
    pub archived: u32,
    pub duration_seconds: f64,
}

/// Storage/display names for the string-backed enums above.
///
/// `as_str` is the lowercase form written to the database; `FromStr` accepts any
/// casing and treats `-` and `_` alike so both `JSON_FEED` and `json-feed` parse.
macro_rules! impl_str_enum {
    ($ty:ident { $($variant:ident => $name:literal),+ $(,)? }) => {
        impl $ty {
            pub const ALL: &'static [$ty] = &[$($ty::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $($ty::$variant => $name),+
                }
            }
        }

        impl std::fmt::Display for $ty {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $ty {
            type Err = anyhow::Error;

            fn from_str(s: &str) -> anyhow::Result<Self> {
                let normalized = s.trim().to_lowercase().replace('-', "_");
                match normalized.as_str() {
                    $($name => Ok($ty::$variant),)+
                    _ => Err(anyhow::anyhow!("Invalid {}: {}", stringify!($ty), s)),
                }
            }
        }
    };
}

impl_str_enum!(SourceType {
    JsonFeed => "json_feed",
    Workday => "workday",
    Custom => "custom",
});

impl_str_enum!(PostingType {
    Job => "job",
    Internship => "internship",
    WalkIn => "walk_in",
});

impl_str_enum!(WorkMode {
    Remote => "remote",
    Hybrid => "hybrid",
    Onsite => "onsite",
});

impl_str_enum!(PostingStatus {
    Draft => "draft",
    Published => "published",
    Archived => "archived",
});

impl_str_enum!(LinkHealth {
    Healthy => "healthy",
    Retrying => "retrying",
    Broken => "broken",
});

impl_str_enum!(RunStatus {
    Running => "running",
    Success => "success",
    Partial => "partial",
    Failed => "failed",
});

impl_str_enum!(RawOpportunityStatus {
    DraftCreated => "draft_created",
    Deduped => "deduped",
    Rejected => "rejected",
    Error => "error",
});

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn enums_round_trip_through_storage_names() {
        for source_type in SourceType::ALL {
            assert_eq!(SourceType::from_str(source_type.as_str()).unwrap(), *source_type);
        }
        for status in RawOpportunityStatus::ALL {
            assert_eq!(RawOpportunityStatus::from_str(status.as_str()).unwrap(), *status);
        }
    }

    #[test]
    fn enum_parsing_accepts_wire_spelling() {
        assert_eq!(SourceType::from_str("JSON_FEED").unwrap(), SourceType::JsonFeed);
        assert_eq!(PostingType::from_str("walk-in").unwrap(), PostingType::WalkIn);
        assert_eq!(LinkHealth::from_str("BROKEN").unwrap(), LinkHealth::Broken);
        assert!(SourceType::from_str("greenhouse").is_err());
    }

    #[test]
    fn serde_uses_screaming_case_on_the_wire() {
        let json = serde_json::to_string(&RawOpportunityStatus::DraftCreated).unwrap();
        assert_eq!(json, "\"DRAFT_CREATED\"");
        let parsed: SourceType = serde_json::from_str("\"WORKDAY\"").unwrap();
        assert_eq!(parsed, SourceType::Workday);
    }
}
