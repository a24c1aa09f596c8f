use anyhow::{Context, Result};
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::time::Duration;

pub mod defaults;
pub mod duration_serde;

use defaults::*;
use duration_serde::duration;

/// Prefix for environment overrides, e.g. `INTAKE_INGESTION__MIN_FRESHER_SCORE=40`
pub const ENV_PREFIX: &str = "INTAKE_";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub http: HttpConfig,
    #[serde(default)]
    pub ingestion: IngestionConfig,
    #[serde(default)]
    pub verification: VerificationConfig,
    #[serde(default)]
    pub scheduler: SchedulerConfig,
    #[serde(default)]
    pub notifications: NotificationConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_database_url")]
    pub url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

/// Outbound HTTP settings shared by feed fetches and link probes
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    /// Every request self-identifies with this agent
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    #[serde(default = "default_connect_timeout", with = "duration")]
    pub connect_timeout: Duration,
    /// Total timeout for one source feed fetch
    #[serde(default = "default_fetch_timeout", with = "duration")]
    pub fetch_timeout: Duration,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestionConfig {
    /// Candidates scoring below this are rejected before reaching the writer
    #[serde(default = "default_min_fresher_score")]
    pub min_fresher_score: i32,
    /// Only used to flag high-confidence candidates in logs
    #[serde(default = "default_high_confidence_score")]
    pub high_confidence_score: i32,
    /// Owner identity stamped on created drafts; drafts cannot be created without it
    #[serde(default)]
    pub default_owner_id: Option<String>,
    #[serde(default = "default_error_summary_max_len")]
    pub error_summary_max_len: usize,
    #[serde(default = "default_education_levels")]
    pub default_education_levels: Vec<String>,
    /// Used when a candidate carries no location at all
    #[serde(default = "default_placeholder_location")]
    pub placeholder_location: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerificationConfig {
    #[serde(default = "default_probe_timeout", with = "duration")]
    pub probe_timeout: Duration,
    #[serde(default = "default_verification_batch_size")]
    pub batch_size: u64,
    /// Postings verified longer ago than this are probed again
    #[serde(default = "default_stale_after", with = "duration")]
    pub stale_after: Duration,
    /// Hard failures needed to quarantine a posting
    #[serde(default = "default_max_failures")]
    pub max_failures: i32,
    /// Protected or rate-limited responses that never count toward quarantine
    #[serde(default = "default_soft_fail_status_codes")]
    pub soft_fail_status_codes: Vec<u16>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchedulerConfig {
    #[serde(default = "default_ingestion_cron")]
    pub ingestion_cron: String,
    #[serde(default = "default_verification_cron")]
    pub verification_cron: String,
    #[serde(default = "default_run_on_startup")]
    pub run_on_startup: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationConfig {
    #[serde(default)]
    pub webhook_url: Option<String>,
    #[serde(default = "default_notification_timeout", with = "duration")]
    pub timeout: Duration,
}

fn default_database_url() -> String {
    DEFAULT_DATABASE_URL.to_string()
}

fn default_max_connections() -> u32 {
    DEFAULT_MAX_CONNECTIONS
}

fn default_user_agent() -> String {
    DEFAULT_USER_AGENT.to_string()
}

fn default_connect_timeout() -> Duration {
    Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS)
}

fn default_fetch_timeout() -> Duration {
    Duration::from_secs(DEFAULT_FETCH_TIMEOUT_SECS)
}

fn default_min_fresher_score() -> i32 {
    DEFAULT_MIN_FRESHER_SCORE
}

fn default_high_confidence_score() -> i32 {
    DEFAULT_HIGH_CONFIDENCE_SCORE
}

fn default_error_summary_max_len() -> usize {
    DEFAULT_ERROR_SUMMARY_MAX_LEN
}

fn default_education_levels() -> Vec<String> {
    DEFAULT_EDUCATION_LEVELS.iter().map(|s| s.to_string()).collect()
}

fn default_placeholder_location() -> String {
    DEFAULT_PLACEHOLDER_LOCATION.to_string()
}

fn default_probe_timeout() -> Duration {
    Duration::from_secs(DEFAULT_PROBE_TIMEOUT_SECS)
}

fn default_verification_batch_size() -> u64 {
    DEFAULT_VERIFICATION_BATCH_SIZE
}

fn default_stale_after() -> Duration {
    Duration::from_secs(DEFAULT_STALE_AFTER_SECS)
}

fn default_max_failures() -> i32 {
    DEFAULT_MAX_VERIFICATION_FAILURES
}

fn default_soft_fail_status_codes() -> Vec<u16> {
    DEFAULT_SOFT_FAIL_STATUS_CODES.to_vec()
}

fn default_ingestion_cron() -> String {
    DEFAULT_INGESTION_CRON.to_string()
}

fn default_verification_cron() -> String {
    DEFAULT_VERIFICATION_CRON.to_string()
}

fn default_run_on_startup() -> bool {
    DEFAULT_RUN_ON_STARTUP
}

fn default_notification_timeout() -> Duration {
    Duration::from_secs(DEFAULT_NOTIFICATION_TIMEOUT_SECS)
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: default_database_url(),
            max_connections: default_max_connections(),
        }
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            user_agent: default_user_agent(),
            connect_timeout: default_connect_timeout(),
            fetch_timeout: default_fetch_timeout(),
        }
    }
}

impl Default for IngestionConfig {
    fn default() -> Self {
        Self {
            min_fresher_score: default_min_fresher_score(),
            high_confidence_score: default_high_confidence_score(),
            default_owner_id: None,
            error_summary_max_len: default_error_summary_max_len(),
            default_education_levels: default_education_levels(),
            placeholder_location: default_placeholder_location(),
        }
    }
}

impl Default for VerificationConfig {
    fn default() -> Self {
        Self {
            probe_timeout: default_probe_timeout(),
            batch_size: default_verification_batch_size(),
            stale_after: default_stale_after(),
            max_failures: default_max_failures(),
            soft_fail_status_codes: default_soft_fail_status_codes(),
        }
    }
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            ingestion_cron: default_ingestion_cron(),
            verification_cron: default_verification_cron(),
            run_on_startup: default_run_on_startup(),
        }
    }
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            webhook_url: None,
            timeout: default_notification_timeout(),
        }
    }
}

impl IngestionConfig {
    /// The configured owner, ignoring blank values
    pub fn owner_id(&self) -> Option<&str> {
        self.default_owner_id
            .as_deref()
            .map(str::trim)
            .filter(|owner| !owner.is_empty())
    }
}

impl Config {
    /// Defaults, then the TOML file if it exists, then `INTAKE_*` environment variables
    pub fn load_from_file(config_file: &str) -> Result<Self> {
        let config: Config = Self::figment(config_file)
            .extract()
            .with_context(|| format!("Failed to load configuration from '{config_file}'"))?;
        config.validate()?;
        Ok(config)
    }

    pub fn figment(config_file: &str) -> Figment {
        Figment::from(Serialized::defaults(Config::default()))
            .merge(Toml::file(config_file))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
    }

    pub fn validate(&self) -> Result<()> {
        let ingestion = &self.ingestion;
        if ingestion.high_confidence_score < ingestion.min_fresher_score {
            anyhow::bail!(
                "ingestion.high_confidence_score ({}) must not be below ingestion.min_fresher_score ({})",
                ingestion.high_confidence_score,
                ingestion.min_fresher_score
            );
        }

        let verification = &self.verification;
        if verification.batch_size == 0 {
            anyhow::bail!("verification.batch_size must be greater than zero");
        }
        if verification.max_failures <= 0 {
            anyhow::bail!("verification.max_failures must be greater than zero");
        }
        if verification.probe_timeout.is_zero() {
            anyhow::bail!("verification.probe_timeout must be greater than zero");
        }

        for (name, expression) in [
            ("scheduler.ingestion_cron", &self.scheduler.ingestion_cron),
            ("scheduler.verification_cron", &self.scheduler.verification_cron),
        ] {
            cron::Schedule::from_str(expression)
                .with_context(|| format!("{name} is not a valid cron expression: '{expression}'"))?;
        }

        Ok(())
    }
}
