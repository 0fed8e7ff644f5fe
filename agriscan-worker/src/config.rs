/// Configuration for the alert worker
///
/// # Environment Variables
///
/// - `DATABASE_URL`: SQLite URL (default: sqlite://agriscan_users.db)
/// - `TWILIO_ACCOUNT_SID`: Twilio account (required)
/// - `TWILIO_AUTH_TOKEN`: Twilio auth token (required)
/// - `TWILIO_FROM_NUMBER`: Sending number (required)
/// - `TWILIO_BASE_URL`: Twilio API host (default: https://api.twilio.com)
/// - `ALERT_LOCATION`: Forecast location (default: Nairobi)
/// - `ALERT_HOUR_UTC`: Hour of day to send, 0-23 (default: 6)
/// - `WEATHER_BASE_URL`: Weather service (default: https://wttr.in)

use agriscan_shared::clients::{sms, weather};
use std::env;

/// Complete worker configuration
#[derive(Debug, Clone)]
pub struct WorkerConfig {
    /// SQLite connection URL
    pub database_url: String,

    /// SMS provider credentials
    pub twilio: TwilioConfig,

    /// Schedule and forecast location
    pub alert: AlertConfig,

    /// Weather service base URL
    pub weather_base_url: String,
}

/// Twilio credentials
#[derive(Clone)]
pub struct TwilioConfig {
    pub account_sid: String,
    pub auth_token: String,
    pub from_number: String,
    pub base_url: String,
}

impl std::fmt::Debug for TwilioConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TwilioConfig")
            .field("account_sid", &self.account_sid)
            .field("auth_token", &"[REDACTED]")
            .field("from_number", &self.from_number)
            .field("base_url", &self.base_url)
            .finish()
    }
}

/// When and for where alerts are sent
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlertConfig {
    /// Forecast location passed to the weather service
    pub location: String,

    /// Hour of day (UTC) at which alerts go out
    pub hour_utc: u32,
}

impl Default for AlertConfig {
    fn default() -> Self {
        Self {
            location: "Nairobi".to_string(),
            hour_utc: 6,
        }
    }
}

impl WorkerConfig {
    /// Loads configuration from environment variables
    ///
    /// # Errors
    ///
    /// Returns an error if Twilio credentials are missing or
    /// `ALERT_HOUR_UTC` is not an hour of the day.
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds configuration from an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let required = |key: &str| {
            var(key).ok_or_else(|| anyhow::anyhow!("{} environment variable is required", key))
        };

        let defaults = AlertConfig::default();
        let hour_utc = match var("ALERT_HOUR_UTC") {
            Some(raw) => raw
                .trim()
                .parse::<u32>()
                .map_err(|e| anyhow::anyhow!("ALERT_HOUR_UTC is invalid: {}", e))?,
            None => defaults.hour_utc,
        };

        if hour_utc > 23 {
            anyhow::bail!("ALERT_HOUR_UTC must be between 0 and 23, got {}", hour_utc);
        }

        Ok(Self {
            database_url: var("DATABASE_URL")
                .unwrap_or_else(|| "sqlite://agriscan_users.db".to_string()),
            twilio: TwilioConfig {
                account_sid: required("TWILIO_ACCOUNT_SID")?,
                auth_token: required("TWILIO_AUTH_TOKEN")?,
                from_number: required("TWILIO_FROM_NUMBER")?,
                base_url: var("TWILIO_BASE_URL")
                    .unwrap_or_else(|| sms::DEFAULT_BASE_URL.to_string()),
            },
            alert: AlertConfig {
                location: var("ALERT_LOCATION").unwrap_or(defaults.location),
                hour_utc,
            },
            weather_base_url: var("WEATHER_BASE_URL")
                .unwrap_or_else(|| weather::DEFAULT_BASE_URL.to_string()),
        })
    }
}
