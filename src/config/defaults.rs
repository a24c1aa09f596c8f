/// Configuration default values
///
/// This module contains all the default values for configuration options,
/// making them easily changeable in one central location.
// Database defaults
pub const DEFAULT_DATABASE_URL: &str = "sqlite://./fresher-intake.db";
pub const DEFAULT_MAX_CONNECTIONS: u32 = 5;

// Outbound HTTP defaults
pub const DEFAULT_USER_AGENT: &str = concat!(
    "fresher-intake/",
    env!("CARGO_PKG_VERSION"),
    " (+job-ingestion-bot; link-verifier)"
);
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 5;
pub const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 30;

// Ingestion defaults
pub const DEFAULT_MIN_FRESHER_SCORE: i32 = 35;
pub const DEFAULT_HIGH_CONFIDENCE_SCORE: i32 = 55;
pub const DEFAULT_ERROR_SUMMARY_MAX_LEN: usize = 1000;
pub const DEFAULT_EDUCATION_LEVELS: &[&str] = &["UG", "PG", "DIPLOMA"];
pub const DEFAULT_PLACEHOLDER_LOCATION: &str = "India";

// Link verification defaults
pub const DEFAULT_PROBE_TIMEOUT_SECS: u64 = 8;
pub const DEFAULT_VERIFICATION_BATCH_SIZE: u64 = 50;
pub const DEFAULT_STALE_AFTER_SECS: u64 = 12 * 60 * 60;
pub const DEFAULT_MAX_VERIFICATION_FAILURES: i32 = 3;
pub const DEFAULT_SOFT_FAIL_STATUS_CODES: &[u16] = &[401, 403, 429, 503];

// Scheduler defaults (cron with seconds field)
pub const DEFAULT_INGESTION_CRON: &str = "0 */30 * * * *";
pub const DEFAULT_VERIFICATION_CRON: &str = "0 15 * * * *";
pub const DEFAULT_RUN_ON_STARTUP: bool = true;

// Notification defaults
pub const DEFAULT_NOTIFICATION_TIMEOUT_SECS: u64 = 5;
