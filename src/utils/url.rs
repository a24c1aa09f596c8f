//! URL utilities for link normalisation and ATS path resolution

use url::Url;

/// URL utilities for consistent URL handling
pub struct UrlUtils;

impl UrlUtils {
    /// Whether `candidate` is an absolute http(s) URL
    pub fn is_http_url(candidate: &str) -> bool {
        Url::parse(candidate.trim())
            .map(|url| matches!(url.scheme(), "http" | "https") && url.host_str().is_some())
            .unwrap_or(false)
    }

    /// Scheme and host (with port) of `endpoint`, e.g. `https://acme.example.com`
    pub fn site_root(endpoint: &str) -> Option<Url> {
        let mut url = Url::parse(endpoint.trim()).ok()?;
        url.host_str()?;
        url.set_path("/");
        url.set_query(None);
        url.set_fragment(None);
        Some(url)
    }

    /// Public career-site base for a Workday search endpoint.
    ///
    /// `https://acme.wd5.myworkdayjobs.com/wday/cxs/acme/External/jobs` maps to
    /// `https://acme.wd5.myworkdayjobs.com/External/`. Endpoints without the
    /// `/wday/cxs/<tenant>/<site>` prefix fall back to the site root.
    pub fn workday_public_base(endpoint: &str) -> Option<Url> {
        let root = Self::site_root(endpoint)?;
        let parsed = Url::parse(endpoint.trim()).ok()?;
        let segments: Vec<&str> = parsed
            .path_segments()
            .map(|segments| segments.filter(|s| !s.is_empty()).collect())
            .unwrap_or_default();

        match segments.as_slice() {
            ["wday", "cxs", _tenant, site, ..] => root.join(&format!("{site}/")).ok(),
            _ => Some(root),
        }
    }

    /// Resolve a listing link against a Workday endpoint.
    ///
    /// Absolute URLs are kept; relative paths are joined onto the public base.
    pub fn resolve_workday_link(endpoint: &str, link: &str) -> Option<String> {
        let link = link.trim();
        if link.is_empty() {
            return None;
        }
        if Self::is_http_url(link) {
            return Some(link.to_string());
        }

        let base = Self::workday_public_base(endpoint)?;
        base.join(link.trim_start_matches('/'))
            .ok()
            .map(|url| url.to_string())
    }

    /// Resolve a possibly relative link against the endpoint's site root
    pub fn resolve_against_site(endpoint: &str, link: &str) -> Option<String> {
        let link = link.trim();
        if link.is_empty() {
            return None;
        }
        if Self::is_http_url(link) {
            return Some(link.to_string());
        }
        Self::site_root(endpoint)?
            .join(link)
            .ok()
            .map(|url| url.to_string())
    }
}
