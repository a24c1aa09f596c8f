//! Field lookup and value normalisation shared by the source adapters
//!
//! Feeds name the same concept many ways (`jobTitle`, `job_title`, `title`),
//! so lookups compare keys case-insensitively with `_` and `-` ignored.

use regex::Regex;
use serde_json::{Map, Value};
use std::sync::LazyLock;

use crate::models::{PostingType, WorkMode};

static RANGE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(?:^|\D)(\d{1,2})\s*(?:-|–|to)\s*(\d{1,2})(?:\D|$)").expect("range regex is valid")
});
static AT_LEAST: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?:^|\D)(\d{1,2})\s*\+").expect("at-least regex is valid"));
static SINGLE_NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?:^|\D)(\d{1,2})(?:\D|$)").expect("number regex is valid"));
static ENTRY_LEVEL_LABEL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:fresher|freshers|entry[\s-]?level|intern|internship|no experience)\b")
        .expect("entry level regex is valid")
});
static YEAR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b((?:19|20)\d{2})\b").expect("year regex is valid"));
static REMOTE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:remote|work from home|wfh)\b").expect("remote regex is valid")
});
static HYBRID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bhybrid\b").expect("hybrid regex is valid"));
static ONSITE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:on[\s-]?site|in[\s-]office|work from office|wfo)\b")
        .expect("onsite regex is valid")
});
static INTERNSHIP: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bintern").expect("internship regex is valid"));
static WALK_IN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bwalk[\s-]?ins?\b").expect("walk-in regex is valid"));

fn normalize_key(key: &str) -> String {
    key.chars()
        .filter(|c| *c != '_' && *c != '-')
        .flat_map(char::to_lowercase)
        .collect()
}

/// First non-null value stored under any of `synonyms`, in synonym order
pub fn field<'a>(object: &'a Map<String, Value>, synonyms: &[&str]) -> Option<&'a Value> {
    synonyms.iter().find_map(|synonym| {
        let wanted = normalize_key(synonym);
        object
            .iter()
            .find(|(key, value)| normalize_key(key) == wanted && !value.is_null())
            .map(|(_, value)| value)
    })
}

/// Scalar rendered as trimmed text; empty strings count as missing
pub fn as_text(value: &Value) -> Option<String> {
    let text = match value {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Object(object) => return field(object, &["name", "title", "label", "value"]).and_then(as_text),
        _ => return None,
    };
    (!text.is_empty()).then_some(text)
}

pub fn text_field(object: &Map<String, Value>, synonyms: &[&str]) -> Option<String> {
    synonyms
        .iter()
        .find_map(|synonym| field(object, &[synonym]).and_then(as_text))
}

pub fn as_int(value: &Value) -> Option<i32> {
    match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f.floor() as i64))
            .and_then(|n| i32::try_from(n).ok()),
        Value::String(s) => s.trim().parse::<i32>().ok(),
        _ => None,
    }
}

pub fn int_field(object: &Map<String, Value>, synonyms: &[&str]) -> Option<i32> {
    field(object, synonyms).and_then(as_int)
}

/// Split a delimited string or flatten an array into trimmed, unique entries.
///
/// Array items may be strings or objects carrying a `name`/`city`.
pub fn text_list(value: &Value) -> Vec<String> {
    let mut items: Vec<String> = match value {
        Value::String(s) => s
            .split([',', ';', '|', '/'])
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .map(str::to_string)
            .collect(),
        Value::Array(values) => values
            .iter()
            .filter_map(|item| match item {
                Value::Object(object) => text_field(object, &["name", "city", "title", "label"]),
                other => as_text(other),
            })
            .collect(),
        Value::Object(object) => text_field(object, &["name", "city", "title"])
            .into_iter()
            .collect(),
        _ => Vec::new(),
    };

    let mut seen = std::collections::HashSet::new();
    items.retain(|item| seen.insert(item.to_lowercase()));
    items
}

pub fn list_field(object: &Map<String, Value>, synonyms: &[&str]) -> Vec<String> {
    field(object, synonyms).map(text_list).unwrap_or_default()
}

/// Experience bounds from free text.
///
/// `"0-5 years"` is `(0, 5)`, `"1+ years"` is `(1, None)`, `"2 yrs"` is
/// `(2, 2)`, and entry-level labels such as `"fresher"` are `(0, 0)`.
pub fn parse_experience_text(text: &str) -> (Option<i32>, Option<i32>) {
    if let Some(caps) = RANGE.captures(text) {
        let low = caps[1].parse::<i32>().ok();
        let high = caps[2].parse::<i32>().ok();
        return match (low, high) {
            (Some(low), Some(high)) if low > high => (Some(high), Some(low)),
            bounds => bounds,
        };
    }
    if let Some(caps) = AT_LEAST.captures(text) {
        return (caps[1].parse::<i32>().ok(), None);
    }
    if ENTRY_LEVEL_LABEL.is_match(text) {
        return (Some(0), Some(0));
    }
    if let Some(caps) = SINGLE_NUMBER.captures(text) {
        let years = caps[1].parse::<i32>().ok();
        return (years, years);
    }
    (None, None)
}

/// Experience bounds from a string, a bare number or a `{min, max}` object
pub fn parse_experience_value(value: &Value) -> (Option<i32>, Option<i32>) {
    match value {
        Value::String(text) => parse_experience_text(text),
        Value::Number(_) => {
            let years = as_int(value);
            (years, years)
        }
        Value::Object(object) => (
            int_field(object, &["min", "minimum", "from"]),
            int_field(object, &["max", "maximum", "to"]),
        ),
        _ => (None, None),
    }
}

/// Graduation years mentioned anywhere in a string, number or array
pub fn passout_years(value: &Value) -> Vec<i32> {
    let mut years: Vec<i32> = match value {
        Value::Array(values) => values.iter().flat_map(passout_years).collect(),
        Value::Number(_) => as_int(value).into_iter().collect(),
        Value::String(text) => YEAR
            .captures_iter(text)
            .filter_map(|caps| caps[1].parse::<i32>().ok())
            .collect(),
        _ => Vec::new(),
    };
    years.retain(|year| (1950..=2100).contains(year));
    years.sort_unstable();
    years.dedup();
    years
}

/// Work mode from an explicit value first, otherwise by keyword search
pub fn infer_work_mode(explicit: Option<&str>, text: &str) -> Option<WorkMode> {
    explicit
        .and_then(work_mode_from_keywords)
        .or_else(|| work_mode_from_keywords(text))
}

fn work_mode_from_keywords(text: &str) -> Option<WorkMode> {
    // Hybrid first: "hybrid (2 days remote)" is hybrid, not remote
    if HYBRID.is_match(text) {
        Some(WorkMode::Hybrid)
    } else if REMOTE.is_match(text) {
        Some(WorkMode::Remote)
    } else if ONSITE.is_match(text) {
        Some(WorkMode::Onsite)
    } else {
        None
    }
}

/// Explicit type field first, then title keywords, then the source default
pub fn infer_posting_type(explicit: Option<&str>, title: &str, default: PostingType) -> PostingType {
    if let Some(explicit) = explicit {
        return posting_type_from_keywords(explicit).unwrap_or(PostingType::Job);
    }
    posting_type_from_keywords(title).unwrap_or(default)
}

fn posting_type_from_keywords(text: &str) -> Option<PostingType> {
    if WALK_IN.is_match(text) {
        Some(PostingType::WalkIn)
    } else if INTERNSHIP.is_match(text) {
        Some(PostingType::Internship)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    #[test]
    fn field_lookup_ignores_case_and_separators() {
        let entry = json!({"Job_Title": "Analyst", "company-name": "Acme", "url": null, "link": "https://x.com"});
        let object = entry.as_object().unwrap();

        assert_eq!(text_field(object, &["title", "jobTitle"]).as_deref(), Some("Analyst"));
        assert_eq!(text_field(object, &["company", "companyName"]).as_deref(), Some("Acme"));
        assert_eq!(text_field(object, &["url", "link"]).as_deref(), Some("https://x.com"));
        assert_eq!(text_field(object, &["missing"]), None);
    }

    #[test]
    fn text_lists_accept_strings_arrays_and_objects() {
        assert_eq!(text_list(&json!("Pune, Bengaluru; Remote")), vec!["Pune", "Bengaluru", "Remote"]);
        assert_eq!(
            text_list(&json!([{"name": "Pune"}, "Delhi", {"city": "pune"}])),
            vec!["Pune", "Delhi"]
        );
        assert!(text_list(&json!(null)).is_empty());
    }

    #[rstest]
    #[case("0-5 years", (Some(0), Some(5)))]
    #[case("0 to 2 yrs", (Some(0), Some(2)))]
    #[case("3 – 1 years", (Some(1), Some(3)))]
    #[case("1+ years", (Some(1), None))]
    #[case("2 yrs", (Some(2), Some(2)))]
    #[case("Fresher", (Some(0), Some(0)))]
    #[case("Entry-level", (Some(0), Some(0)))]
    #[case("not specified", (None, None))]
    fn experience_text(#[case] text: &str, #[case] expected: (Option<i32>, Option<i32>)) {
        assert_eq!(parse_experience_text(text), expected);
    }

    #[test]
    fn experience_values_of_other_shapes() {
        assert_eq!(parse_experience_value(&json!({"min": 1, "max": "3"})), (Some(1), Some(3)));
        assert_eq!(parse_experience_value(&json!(4)), (Some(4), Some(4)));
        assert_eq!(parse_experience_value(&json!(null)), (None, None));
    }

    #[test]
    fn passout_years_are_extracted_and_deduplicated() {
        assert_eq!(passout_years(&json!("2024, 2025 & 2024 batch")), vec![2024, 2025]);
        assert_eq!(passout_years(&json!([2026, "2025"])), vec![2025, 2026]);
        assert!(passout_years(&json!("any")).is_empty());
    }

    #[test]
    fn work_mode_prefers_explicit_field() {
        assert_eq!(infer_work_mode(Some("On-site"), "remote friendly team"), Some(WorkMode::Onsite));
        assert_eq!(infer_work_mode(None, "Work from home available"), Some(WorkMode::Remote));
        assert_eq!(infer_work_mode(Some("flexible"), "Hybrid, 3 days in office"), Some(WorkMode::Hybrid));
        assert_eq!(infer_work_mode(None, "Backend developer"), None);
    }

    #[test]
    fn posting_type_falls_back_through_title_to_default() {
        assert_eq!(infer_posting_type(Some("Internship"), "Engineer", PostingType::Job), PostingType::Internship);
        assert_eq!(infer_posting_type(Some("Full Time"), "Intern", PostingType::Internship), PostingType::Job);
        assert_eq!(infer_posting_type(None, "Walk-in drive for freshers", PostingType::Job), PostingType::WalkIn);
        assert_eq!(infer_posting_type(None, "Backend developer", PostingType::Internship), PostingType::Internship);
    }
}
