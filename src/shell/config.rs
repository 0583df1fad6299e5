use crate::modules::discharge::use_cases::fetch_report::handler::RetryPolicy;
use crate::shared::infrastructure::upstream::UpstreamConfig;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid value for {key}: {value:?}")]
    Invalid { key: &'static str, value: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DashboardSettings {
    pub demo_workflow_name: String,
    pub demo_pending_department: String,
    pub refresh_interval: Duration,
}

/// Process configuration. Upstream credentials stay optional: a missing one
/// fails the requests that need it, not the startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub upstream: UpstreamConfig,
    pub otp_config_id: Option<String>,
    pub country_code: String,
    pub bind_addr: String,
    pub display_offset_minutes: i32,
    pub retry: RetryPolicy,
    pub dashboard: DashboardSettings,
}

impl Config {
    /// Reads the process environment after loading `.env`, if present.
    pub fn from_env() -> Result<Self, ConfigError> {
        if let Err(err) = dotenvy::dotenv() {
            tracing::debug!(error = %err, "no .env file loaded");
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
        let text = |key: &str, default: &str| get(key).unwrap_or_else(|| default.to_string());

        Ok(Self {
            upstream: UpstreamConfig {
                base_url: get("BASE_URL"),
                api_key: get("API_KEY"),
            },
            otp_config_id: get("OTP_CONFIG_ID"),
            country_code: text("COUNTRY_CODE", "+91"),
            bind_addr: text("BIND_ADDR", "0.0.0.0:8080"),
            display_offset_minutes: parsed(&get, "DISPLAY_UTC_OFFSET_MINUTES", 330)?,
            retry: RetryPolicy::new(
                parsed(&get, "REPORT_MAX_ATTEMPTS", 3)?,
                Duration::from_millis(parsed(&get, "REPORT_BACKOFF_MS", 1000)?),
            ),
            dashboard: DashboardSettings {
                demo_workflow_name: text("DEMO_WORKFLOW_NAME", "KNH Discharge"),
                demo_pending_department: text("DEMO_PENDING_DEPARTMENT", "House Keeping"),
                refresh_interval: Duration::from_secs(positive(&get, "REFRESH_INTERVAL_SECS", 60)?),
            },
        })
    }
}

fn parsed<T: FromStr>(
    get: &impl Fn(&str) -> Option<String>,
    key: &'static str,
    default: T,
) -> Result<T, ConfigError> {
    match get(key) {
        None => Ok(default),
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { key, value }),
    }
}

fn positive(
    get: &impl Fn(&str) -> Option<String>,
    key: &'static str,
    default: u64,
) -> Result<u64, ConfigError> {
    match parsed(get, key, default)? {
        0 => Err(ConfigError::Invalid {
            key,
            value: get(key).unwrap_or_default(),
        }),
        value => Ok(value),
    }
}
