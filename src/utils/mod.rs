//! Shared helpers used by the adapters, the writer and the link prober

pub mod html;
pub mod http_client;
pub mod slug;
pub mod status_code;
pub mod url;

pub use html::strip_html;
pub use http_client::HttpClientFactory;
pub use slug::{generate_posting_slug, slugify};
pub use status_code::{is_status_acceptable, matches_pattern, REACHABLE_PATTERNS};
pub use url::UrlUtils;
