//! HTTP Client Factory
//!
//! Builds `reqwest` clients that share the configured user agent and connect
//! timeout. Feed fetches, link probes and webhooks each pick their own total
//! timeout.

use std::time::Duration;

use reqwest::redirect::Policy;
use reqwest::Client;
use tracing::debug;

use crate::config::HttpConfig;
use crate::errors::{AppError, AppResult};

/// Factory for outbound HTTP clients
#[derive(Debug, Clone)]
pub struct HttpClientFactory {
    user_agent: String,
    connect_timeout: Duration,
}

impl HttpClientFactory {
    pub fn new<S: Into<String>>(user_agent: S, connect_timeout: Duration) -> Self {
        Self {
            user_agent: user_agent.into(),
            connect_timeout,
        }
    }

    pub fn from_config(config: &HttpConfig) -> Self {
        Self::new(config.user_agent.clone(), config.connect_timeout)
    }

    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }

    /// Create a client whose every request is cancelled after `timeout`
    pub fn create_client(&self, timeout: Duration) -> AppResult<Client> {
        self.build_client(timeout, Policy::default())
    }

    /// Like `create_client`, but 3xx responses are returned as-is
    pub fn create_non_redirecting_client(&self, timeout: Duration) -> AppResult<Client> {
        self.build_client(timeout, Policy::none())
    }

    fn build_client(&self, timeout: Duration, redirect: Policy) -> AppResult<Client> {
        debug!(
            "Creating HTTP client (user agent: {}, timeout: {:?}, redirects: {:?})",
            self.user_agent, timeout, redirect
        );
        Client::builder()
            .user_agent(&self.user_agent)
            .connect_timeout(self.connect_timeout.min(timeout))
            .timeout(timeout)
            .redirect(redirect)
            .build()
            .map_err(|e| AppError::internal(format!("Failed to build HTTP client: {e}")))
    }
}

impl Default for HttpClientFactory {
    fn default() -> Self {
        Self::from_config(&HttpConfig::default())
    }
}
