//! Quarantine state machine
//!
//! `HEALTHY` and `RETRYING` move freely; `BROKEN` is terminal and also
//! archives the posting. Only hard failures count toward the budget and only a
//! healthy probe resets it.

use chrono::{DateTime, Utc};

use super::prober::ProbeResult;
use crate::models::{LinkHealth, LinkHealthUpdate, Posting, PostingStatus};

/// The record update for `posting` after a probe returned `result`
pub fn transition(
    posting: &Posting,
    result: ProbeResult,
    max_failures: i32,
    now: DateTime<Utc>,
) -> LinkHealthUpdate {
    match result {
        ProbeResult::Healthy => LinkHealthUpdate {
            link_health: LinkHealth::Healthy,
            verification_failures: 0,
            last_verified_at: now,
            status: None,
        },
        ProbeResult::SoftFail => LinkHealthUpdate {
            link_health: LinkHealth::Retrying,
            verification_failures: posting.verification_failures,
            last_verified_at: now,
            status: None,
        },
        ProbeResult::HardFail => {
            let failures = posting.verification_failures.saturating_add(1);
            if failures >= max_failures {
                LinkHealthUpdate {
                    link_health: LinkHealth::Broken,
                    verification_failures: failures,
                    last_verified_at: now,
                    status: Some(PostingStatus::Archived),
                }
            } else {
                LinkHealthUpdate {
                    link_health: LinkHealth::Retrying,
                    verification_failures: failures,
                    last_verified_at: now,
                    status: None,
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{PostingType, WorkMode};
    use proptest::prelude::*;
    use uuid::Uuid;

    fn posting() -> Posting {
        let now = Utc::now();
        Posting {
            id: Uuid::new_v4(),
            slug: "graduate-trainee-acme-1a2b3c4d".to_string(),
            posting_type: PostingType::Job,
            status: PostingStatus::Published,
            title: "Graduate Trainee".to_string(),
            company: "Acme".to_string(),
            description: String::new(),
            apply_link: Some("https://x.com/job/1".to_string()),
            locations: vec!["Pune".to_string()],
            work_mode: Some(WorkMode::Onsite),
            experience_min: Some(0),
            experience_max: Some(0),
            allowed_passout_years: Vec::new(),
            required_skills: Vec::new(),
            allowed_education_levels: vec!["UG".to_string()],
            provenance_note: None,
            created_by: "ops".to_string(),
            link_health: LinkHealth::Healthy,
            verification_failures: 0,
            last_verified_at: None,
            deleted_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    fn apply(posting: &mut Posting, update: &LinkHealthUpdate) {
        posting.link_health = update.link_health;
        posting.verification_failures = update.verification_failures;
        posting.last_verified_at = Some(update.last_verified_at);
        if let Some(status) = update.status {
            posting.status = status;
        }
    }

    #[test]
    fn three_hard_failures_quarantine_the_posting() {
        let mut p = posting();
        let now = Utc::now();

        for expected in [1, 2] {
            let update = transition(&p, ProbeResult::HardFail, 3, now);
            assert_eq!(update.link_health, LinkHealth::Retrying);
            assert_eq!(update.verification_failures, expected);
            assert_eq!(update.status, None);
            apply(&mut p, &update);
        }

        let update = transition(&p, ProbeResult::HardFail, 3, now);
        assert_eq!(update.link_health, LinkHealth::Broken);
        assert_eq!(update.verification_failures, 3);
        assert_eq!(update.status, Some(PostingStatus::Archived));
    }

    #[test]
    fn soft_failure_keeps_counter_and_healthy_resets_it() {
        let mut p = posting();
        p.verification_failures = 2;
        p.link_health = LinkHealth::Retrying;
        let now = Utc::now();

        let soft = transition(&p, ProbeResult::SoftFail, 3, now);
        assert_eq!(soft.link_health, LinkHealth::Retrying);
        assert_eq!(soft.verification_failures, 2);
        assert_eq!(soft.last_verified_at, now);

        let healthy = transition(&p, ProbeResult::Healthy, 3, now);
        assert_eq!(healthy.link_health, LinkHealth::Healthy);
        assert_eq!(healthy.verification_failures, 0);
    }

    fn probe_result() -> impl Strategy<Value = ProbeResult> {
        prop_oneof![
            Just(ProbeResult::Healthy),
            Just(ProbeResult::SoftFail),
            Just(ProbeResult::HardFail),
        ]
    }

    proptest! {
        #[test]
        fn failures_only_drop_to_zero_on_healthy(results in prop::collection::vec(probe_result(), 1..40)) {
            let mut p = posting();
            let now = Utc::now();

            for result in results {
                if p.link_health == LinkHealth::Broken {
                    break;
                }
                let before = p.verification_failures;
                let update = transition(&p, result, 3, now);

                if update.verification_failures < before {
                    prop_assert_eq!(result, ProbeResult::Healthy);
                    prop_assert_eq!(update.verification_failures, 0);
                }
                if result == ProbeResult::SoftFail {
                    prop_assert_eq!(update.verification_failures, before);
                    prop_assert_ne!(update.link_health, LinkHealth::Broken);
                }
                apply(&mut p, &update);
            }
        }

        #[test]
        fn soft_failures_never_quarantine(count in 1usize..200) {
            let mut p = posting();
            let now = Utc::now();
            for _ in 0..count {
                let update = transition(&p, ProbeResult::SoftFail, 3, now);
                apply(&mut p, &update);
            }
            prop_assert_eq!(p.verification_failures, 0);
            prop_assert_eq!(p.link_health, LinkHealth::Retrying);
            prop_assert_eq!(p.status, PostingStatus::Published);
        }
    }
}
