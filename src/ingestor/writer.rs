//! Dedup & draft writer
//!
//! Decides whether a scored candidate becomes a new draft posting, and
//! persists it when it does.

use std::sync::Arc;

use tracing::{debug, info};
use uuid::Uuid;

use crate::classifier::FresherScore;
use crate::config::IngestionConfig;
use crate::errors::ProcessingError;
use crate::models::{Candidate, PostingCreateRequest, PostingStatus};
use crate::repositories::PostingRepository;
use crate::utils::generate_posting_slug;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteOutcome {
    Created { posting_id: Uuid },
    /// A non-deleted posting already carries the same apply link
    Deduped { existing_posting_id: Uuid },
    Rejected { reason: String },
}

pub struct DraftWriter<S: ?Sized> {
    store: Arc<S>,
    config: IngestionConfig,
}

impl<S: PostingRepository + ?Sized> DraftWriter<S> {
    pub fn new(store: Arc<S>, config: IngestionConfig) -> Self {
        Self { store, config }
    }

    /// Dedup the candidate against the corpus or create a draft for it.
    ///
    /// Fails with `ProcessingError::Configuration` when a draft is needed but
    /// no ingestion owner is configured.
    pub async fn write_or_skip(
        &self,
        candidate: &Candidate,
        source_name: &str,
        score: &FresherScore,
    ) -> Result<WriteOutcome, ProcessingError> {
        if candidate.title.trim().is_empty() || candidate.company.trim().is_empty() {
            return Err(ProcessingError::InvalidCandidate {
                message: "candidate is missing a title or company".to_string(),
            });
        }

        let apply_link = candidate
            .apply_link
            .as_deref()
            .map(str::trim)
            .filter(|link| !link.is_empty());

        match apply_link {
            None if !candidate.may_omit_apply_link() => {
                return Ok(WriteOutcome::Rejected {
                    reason: "missing apply link".to_string(),
                });
            }
            Some(link) => {
                if let Some(existing) = self.store.find_active_by_apply_link(link).await? {
                    debug!(
                        "Deduped '{}' from '{}' against posting {}",
                        candidate.title, source_name, existing.id
                    );
                    return Ok(WriteOutcome::Deduped {
                        existing_posting_id: existing.id,
                    });
                }
            }
            None => {}
        }

        let owner = self.config.owner_id().ok_or_else(|| {
            ProcessingError::configuration(
                "no default ingestion owner is configured; set ingestion.default_owner_id",
            )
        })?;

        let request = self.draft_request(candidate, apply_link, source_name, score, owner);
        let posting = self.store.create_posting(request).await?;
        info!(
            "Created draft {} ('{}' at {}) from '{}'",
            posting.slug, posting.title, posting.company, source_name
        );

        Ok(WriteOutcome::Created {
            posting_id: posting.id,
        })
    }

    fn draft_request(
        &self,
        candidate: &Candidate,
        apply_link: Option<&str>,
        source_name: &str,
        score: &FresherScore,
        owner: &str,
    ) -> PostingCreateRequest {
        let locations = if candidate.locations.is_empty() {
            vec![self.config.placeholder_location.clone()]
        } else {
            candidate.locations.clone()
        };

        let flags = if score.flags.is_empty() {
            "none".to_string()
        } else {
            score.flag_names().join(", ")
        };

        PostingCreateRequest {
            slug: generate_posting_slug(&candidate.title, &candidate.company),
            posting_type: candidate.posting_type,
            status: PostingStatus::Draft,
            title: candidate.title.clone(),
            company: candidate.company.clone(),
            description: candidate.description.clone(),
            apply_link: apply_link.map(str::to_string),
            locations,
            work_mode: candidate.work_mode,
            experience_min: candidate.experience_min,
            experience_max: candidate.experience_max,
            allowed_passout_years: candidate.passout_years.clone(),
            required_skills: candidate.skills.clone(),
            allowed_education_levels: self.config.default_education_levels.clone(),
            provenance_note: Some(format!(
                "Auto-ingested from {} (fresher score {}; flags: {})",
                source_name, score.score, flags
            )),
            created_by: owner.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier;
    use crate::models::PostingType;
    use crate::repositories::InMemoryStore;

    fn config(owner: Option<&str>) -> IngestionConfig {
        IngestionConfig {
            default_owner_id: owner.map(str::to_string),
            ..Default::default()
        }
    }

    fn candidate(link: Option<&str>, posting_type: PostingType) -> Candidate {
        let mut candidate = Candidate::new(posting_type, "Graduate Trainee", "Acme");
        candidate.apply_link = link.map(str::to_string);
        candidate
    }

    #[tokio::test]
    async fn creates_draft_with_defaults_and_provenance() {
        let store = Arc::new(InMemoryStore::new());
        let writer = DraftWriter::new(store.clone(), config(Some("ops@intake")));
        let candidate = candidate(Some("https://x.com/job/1"), PostingType::Job);
        let score = classifier::score(&candidate);

        let outcome = writer.write_or_skip(&candidate, "Board", &score).await.unwrap();
        let WriteOutcome::Created { posting_id } = outcome else {
            panic!("expected a draft, got {outcome:?}");
        };

        let posting = store.find_posting(posting_id).await.unwrap().unwrap();
        assert_eq!(posting.status, PostingStatus::Draft);
        assert_eq!(posting.locations, vec!["India"]);
        assert_eq!(posting.allowed_education_levels, vec!["UG", "PG", "DIPLOMA"]);
        assert_eq!(posting.created_by, "ops@intake");
        let note = posting.provenance_note.unwrap();
        assert!(note.contains("Board"));
        assert!(note.contains("fresher score 20"));
        assert!(posting.slug.starts_with("graduate-trainee-acme-"));
    }

    #[tokio::test]
    async fn second_write_of_same_link_is_deduped() {
        let store = Arc::new(InMemoryStore::new());
        let writer = DraftWriter::new(store.clone(), config(Some("ops")));
        let candidate = candidate(Some("https://x.com/job/1"), PostingType::Job);
        let score = classifier::score(&candidate);

        let first = writer.write_or_skip(&candidate, "Board", &score).await.unwrap();
        let second = writer.write_or_skip(&candidate, "Board", &score).await.unwrap();

        let WriteOutcome::Created { posting_id } = first else {
            panic!("expected a draft");
        };
        assert_eq!(second, WriteOutcome::Deduped { existing_posting_id: posting_id });
        assert_eq!(store.all_postings().await.len(), 1);
    }

    #[tokio::test]
    async fn missing_link_is_rejected_unless_walk_in() {
        let store = Arc::new(InMemoryStore::new());
        let writer = DraftWriter::new(store.clone(), config(Some("ops")));

        let job = candidate(None, PostingType::Job);
        let outcome = writer
            .write_or_skip(&job, "Board", &classifier::score(&job))
            .await
            .unwrap();
        assert!(matches!(outcome, WriteOutcome::Rejected { .. }));

        let blank = candidate(Some("   "), PostingType::Internship);
        let outcome = writer
            .write_or_skip(&blank, "Board", &classifier::score(&blank))
            .await
            .unwrap();
        assert!(matches!(outcome, WriteOutcome::Rejected { .. }));

        let walk_in = candidate(None, PostingType::WalkIn);
        let outcome = writer
            .write_or_skip(&walk_in, "Board", &classifier::score(&walk_in))
            .await
            .unwrap();
        assert!(matches!(outcome, WriteOutcome::Created { .. }));
    }

    #[tokio::test]
    async fn missing_owner_is_a_configuration_error() {
        let store = Arc::new(InMemoryStore::new());
        let writer = DraftWriter::new(store.clone(), config(None));
        let candidate = candidate(Some("https://x.com/job/2"), PostingType::Job);

        let err = writer
            .write_or_skip(&candidate, "Board", &classifier::score(&candidate))
            .await
            .unwrap_err();
        assert!(err.is_fatal());
        assert!(store.all_postings().await.is_empty());
    }

    #[tokio::test]
    async fn blank_company_is_an_item_error() {
        let store = Arc::new(InMemoryStore::new());
        let writer = DraftWriter::new(store.clone(), config(Some("ops")));
        let candidate = Candidate::new(PostingType::Job, "Graduate Trainee", "  ");

        let err = writer
            .write_or_skip(&candidate, "Board", &classifier::score(&candidate))
            .await
            .unwrap_err();
        assert!(matches!(err, ProcessingError::InvalidCandidate { .. }));
        assert!(!err.is_fatal());
    }
}
