//! Link health prober
//!
//! HEAD first; a ranged GET only when the HEAD never produced a response.
//! Unreachable links are hard failures.

use async_trait::async_trait;
use reqwest::header::RANGE;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::config::VerificationConfig;
use crate::errors::AppResult;
use crate::utils::{is_status_acceptable, HttpClientFactory, REACHABLE_PATTERNS};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProbeResult {
    Healthy,
    /// Protected or rate limited; the link probably still works
    SoftFail,
    HardFail,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LinkProber: Send + Sync {
    async fn probe(&self, url: &str) -> ProbeResult;
}

pub struct HttpLinkProber {
    client: Client,
    soft_fail_status_codes: Vec<u16>,
}

impl HttpLinkProber {
    /// `client` must carry the probe timeout and must not follow redirects
    pub fn new(client: Client, soft_fail_status_codes: Vec<u16>) -> Self {
        Self {
            client,
            soft_fail_status_codes,
        }
    }

    pub fn from_config(config: &VerificationConfig, factory: &HttpClientFactory) -> AppResult<Self> {
        let client = factory.create_non_redirecting_client(config.probe_timeout)?;
        Ok(Self::new(client, config.soft_fail_status_codes.clone()))
    }

    pub fn classify(&self, status: u16) -> ProbeResult {
        if is_status_acceptable(status, REACHABLE_PATTERNS) {
            ProbeResult::Healthy
        } else if self.soft_fail_status_codes.contains(&status) {
            ProbeResult::SoftFail
        } else {
            ProbeResult::HardFail
        }
    }
}

#[async_trait]
impl LinkProber for HttpLinkProber {
    async fn probe(&self, url: &str) -> ProbeResult {
        let head_error = match self.client.head(url).send().await {
            Ok(response) => {
                let status = response.status().as_u16();
                trace!("HEAD {} -> {}", url, status);
                return self.classify(status);
            }
            Err(e) => e,
        };

        debug!("HEAD {} failed ({}), retrying with ranged GET", url, head_error);
        match self.client.get(url).header(RANGE, "bytes=0-0").send().await {
            Ok(response) => {
                let status = response.status().as_u16();
                trace!("GET {} -> {}", url, status);
                self.classify(status)
            }
            Err(e) => {
                debug!("Ranged GET {} failed: {}", url, e);
                ProbeResult::HardFail
            }
        }
    }
}
