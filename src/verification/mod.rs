//! Link verification and quarantine
//!
//! A pass takes published postings due for a check, probes their apply links
//! and moves each through `HEALTHY`, `RETRYING` and `BROKEN`.

pub mod prober;
pub mod quarantine;
pub mod service;
pub mod stats;

pub use prober::{HttpLinkProber, LinkProber, ProbeResult};
pub use quarantine::transition;
pub use service::LinkVerificationService;
pub use stats::VerificationStats;
