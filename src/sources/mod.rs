//! Source adapters
//!
//! Each `SourceType` has one `SourceAdapter` that fetches its feed and maps
//! entries onto canonical `Candidate`s. The `SourceAdapterRegistry` picks the
//! adapter from the source's configured type.

pub mod custom;
pub mod fetch;
pub mod json_feed;
pub mod normalize;
pub mod registry;
pub mod traits;
pub mod workday;

pub use custom::CustomBoardAdapter;
pub use json_feed::JsonFeedAdapter;
pub use registry::SourceAdapterRegistry;
pub use traits::SourceAdapter;
pub use workday::WorkdayAdapter;
