//! Candidate model implementations

use crate::models::{Candidate, PostingType};

impl Candidate {
    /// Start a candidate with the two required fields; everything else empty.
    pub fn new<T: Into<String>, C: Into<String>>(
        posting_type: PostingType,
        title: T,
        company: C,
    ) -> Self {
        Self {
            posting_type,
            title: title.into(),
            company: company.into(),
            description: String::new(),
            apply_link: None,
            locations: Vec::new(),
            work_mode: None,
            experience_min: None,
            experience_max: None,
            passout_years: Vec::new(),
            skills: Vec::new(),
            external_id: None,
            raw_payload: serde_json::Value::Null,
        }
    }

    /// Title and description joined for keyword heuristics
    pub fn searchable_text(&self) -> String {
        format!("{}\n{}", self.title, self.description)
    }

    /// Walk-ins are event based and may legitimately lack an apply link
    pub fn may_omit_apply_link(&self) -> bool {
        self.posting_type == PostingType::WalkIn
    }
}
