//! Fresher-score classifier
//!
//! A pure, additive keyword and experience heuristic. Every rule that fires
//! contributes a weight and a named flag; the score itself is unbounded.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

use crate::models::{Candidate, PostingType};

pub const EXPERIENCE_MAX_WEIGHT: i32 = 35;
pub const EXPERIENCE_MIN_WEIGHT: i32 = -35;
pub const FRESHER_KEYWORD_WEIGHT: i32 = 20;
pub const PASSOUT_YEAR_WEIGHT: i32 = 15;
pub const SENIOR_KEYWORD_WEIGHT: i32 = -40;
pub const INTERNSHIP_WEIGHT: i32 = 10;

static FRESHER_KEYWORDS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(?:freshers?|entry[\s-]?level|graduates?|trainees?|interns?(?:hips?)?|campus|off[\s-]?campus)\b",
    )
    .expect("fresher keyword regex is valid")
});

static SENIOR_KEYWORDS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:senior|lead|manager|architect|principal)s?\b")
        .expect("senior keyword regex is valid")
});

/// Explains which rule contributed to a score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReasonFlag {
    ExperienceMaxLe1,
    ExperienceMinGe2,
    FresherKeyword,
    PassoutYearConstraint,
    SeniorKeyword,
    InternshipType,
}

impl ReasonFlag {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReasonFlag::ExperienceMaxLe1 => "EXPERIENCE_MAX_LE_1",
            ReasonFlag::ExperienceMinGe2 => "EXPERIENCE_MIN_GE_2",
            ReasonFlag::FresherKeyword => "FRESHER_KEYWORD",
            ReasonFlag::PassoutYearConstraint => "PASSOUT_YEAR_CONSTRAINT",
            ReasonFlag::SeniorKeyword => "SENIOR_KEYWORD",
            ReasonFlag::InternshipType => "INTERNSHIP_TYPE",
        }
    }

    pub fn weight(&self) -> i32 {
        match self {
            ReasonFlag::ExperienceMaxLe1 => EXPERIENCE_MAX_WEIGHT,
            ReasonFlag::ExperienceMinGe2 => EXPERIENCE_MIN_WEIGHT,
            ReasonFlag::FresherKeyword => FRESHER_KEYWORD_WEIGHT,
            ReasonFlag::PassoutYearConstraint => PASSOUT_YEAR_WEIGHT,
            ReasonFlag::SeniorKeyword => SENIOR_KEYWORD_WEIGHT,
            ReasonFlag::InternshipType => INTERNSHIP_WEIGHT,
        }
    }
}

impl std::fmt::Display for ReasonFlag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FresherScore {
    pub score: i32,
    pub flags: Vec<ReasonFlag>,
}

impl FresherScore {
    /// Flag names as written to the audit trail
    pub fn flag_names(&self) -> Vec<String> {
        self.flags.iter().map(|flag| flag.as_str().to_string()).collect()
    }

    pub fn meets(&self, threshold: i32) -> bool {
        self.score >= threshold
    }
}

/// Score a candidate. Identical input always yields identical output.
pub fn score(candidate: &Candidate) -> FresherScore {
    let text = candidate.searchable_text();
    let mut flags = Vec::new();

    if candidate.experience_max.is_some_and(|max| max <= 1) {
        flags.push(ReasonFlag::ExperienceMaxLe1);
    }
    if candidate.experience_min.is_some_and(|min| min >= 2) {
        flags.push(ReasonFlag::ExperienceMinGe2);
    }
    if FRESHER_KEYWORDS.is_match(&text) {
        flags.push(ReasonFlag::FresherKeyword);
    }
    if !candidate.passout_years.is_empty() {
        flags.push(ReasonFlag::PassoutYearConstraint);
    }
    if SENIOR_KEYWORDS.is_match(&text) {
        flags.push(ReasonFlag::SeniorKeyword);
    }
    if candidate.posting_type == PostingType::Internship {
        flags.push(ReasonFlag::InternshipType);
    }

    FresherScore {
        score: flags.iter().map(ReasonFlag::weight).sum(),
        flags,
    }
}
