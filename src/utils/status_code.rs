//! HTTP Status Code Matching Utilities
//!
//! Matches status codes against patterns such as "2xx" or "429".

/// Status patterns that count as a reachable link
pub const REACHABLE_PATTERNS: &[&str] = &["2xx", "3xx"];

/// Check if a status code matches any of the given patterns
pub fn is_status_acceptable<S: AsRef<str>>(status_code: u16, patterns: &[S]) -> bool {
    patterns
        .iter()
        .any(|pattern| matches_pattern(status_code, pattern.as_ref()))
}

/// Check if a status code matches a single pattern
pub fn matches_pattern(status_code: u16, pattern: &str) -> bool {
    let pattern = pattern.trim();
    if let Some(prefix) = pattern.strip_suffix("xx") {
        // Wildcard patterns like "2xx", "4xx"
        if prefix.len() == 1 {
            if let Ok(prefix_digit) = prefix.parse::<u16>() {
                return status_code / 100 == prefix_digit;
            }
        }
        false
    } else {
        pattern
            .parse::<u16>()
            .map(|exact| exact == status_code)
            .unwrap_or(false)
    }
}
