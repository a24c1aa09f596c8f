//! Slug generation for created postings

use uuid::Uuid;

const MAX_SLUG_BASE_LEN: usize = 80;

/// Lowercase ASCII words joined by single dashes
pub fn slugify(input: &str) -> String {
    let mut slug = String::with_capacity(input.len());
    let mut pending_dash = false;

    for ch in input.chars() {
        if ch.is_ascii_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(ch.to_ascii_lowercase());
        } else {
            pending_dash = true;
        }
    }

    if slug.len() > MAX_SLUG_BASE_LEN {
        slug.truncate(MAX_SLUG_BASE_LEN);
        while slug.ends_with('-') {
            slug.pop();
        }
    }
    slug
}

/// `<title>-<company>-<8 hex chars>`, unique per call
pub fn generate_posting_slug(title: &str, company: &str) -> String {
    let suffix = Uuid::new_v4().simple().to_string();
    let base = slugify(&format!("{title} {company}"));
    if base.is_empty() {
        format!("posting-{}", &suffix[..8])
    } else {
        format!("{base}-{}", &suffix[..8])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slugify_collapses_punctuation() {
        assert_eq!(slugify("Graduate Trainee — Fresher Program"), "graduate-trainee-fresher-program");
        assert_eq!(slugify("  C++ / .NET Dev  "), "c-net-dev");
        assert_eq!(slugify("***"), "");
    }

    #[test]
    fn posting_slugs_are_unique_and_readable() {
        let first = generate_posting_slug("Software Engineer", "Acme Corp");
        let second = generate_posting_slug("Software Engineer", "Acme Corp");
        assert!(first.starts_with("software-engineer-acme-corp-"));
        assert_ne!(first, second);
        assert!(generate_posting_slug("", "").starts_with("posting-"));
    }

    #[test]
    fn long_titles_are_truncated() {
        let slug = slugify(&"word ".repeat(40));
        assert!(slug.len() <= MAX_SLUG_BASE_LEN);
        assert!(!slug.ends_with('-'));
    }
}
