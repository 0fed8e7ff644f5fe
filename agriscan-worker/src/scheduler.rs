//! Daily weather alert scheduler
//!
//! Once a day, at a fixed UTC hour, the scheduler fetches a single weather
//! summary and texts it to every user with a phone number. A failed send to
//! one user is logged and counted; the remaining users are still attempted.

use agriscan_shared::clients::{ExternalServiceError, SmsSender, WeatherSource};
use agriscan_shared::models::user::User;
use chrono::{DateTime, Duration as ChronoDuration, NaiveTime, Utc};
use sqlx::SqlitePool;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;

use crate::config::AlertConfig;

/// A dispatch that could not start at all
#[derive(Error, Debug)]
pub enum AlertError {
    #[error("Weather lookup failed: {0}")]
    Weather(#[from] ExternalServiceError),

    #[error("Failed to list recipients: {0}")]
    Storage(#[from] sqlx::Error),
}

/// Outcome of one dispatch round
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchReport {
    /// Users with a phone number
    pub recipients: usize,

    /// Messages accepted by the SMS provider
    pub sent: usize,

    /// Messages that failed
    pub failed: usize,
}

/// Returns the first instant strictly after `now` at `hour_utc:00:00`
///
/// Hours above 23 are clamped to 23.
pub fn next_run_after(now: DateTime<Utc>, hour_utc: u32) -> DateTime<Utc> {
    let time = NaiveTime::from_hms_opt(hour_utc.min(23), 0, 0).unwrap_or(NaiveTime::MIN);
    let today = now.date_naive().and_time(time).and_utc();

    if today > now {
        today
    } else {
        today + ChronoDuration::days(1)
    }
}

/// Slot that follows the one scheduled at `scheduled`
///
/// Never returns `scheduled` itself, even when the wall clock still reads
/// earlier than it after a round.
pub fn following_run(
    scheduled: DateTime<Utc>,
    now: DateTime<Utc>,
    hour_utc: u32,
) -> DateTime<Utc> {
    next_run_after(scheduled.max(now), hour_utc)
}

/// Message body sent to each user
pub fn compose_alert(summary: &str) -> String {
    format!("AgriScan weather alert: {}", summary.trim())
}

/// Alert scheduler
///
/// Runs until its shutdown token is cancelled.
pub struct AlertScheduler {
    db: SqlitePool,
    weather: Arc<dyn WeatherSource>,
    sms: Arc<dyn SmsSender>,
    config: AlertConfig,
    shutdown_token: CancellationToken,
}

impl AlertScheduler {
    /// Creates a new scheduler
    pub fn new(
        db: SqlitePool,
        weather: Arc<dyn WeatherSource>,
        sms: Arc<dyn SmsSender>,
        config: AlertConfig,
    ) -> Self {
        AlertScheduler {
            db,
            weather,
            sms,
            config,
            shutdown_token: CancellationToken::new(),
        }
    }

    /// Gets shutdown token
    ///
    /// Used to signal graceful shutdown from external handlers.
    pub fn shutdown_token(&self) -> CancellationToken {
        self.shutdown_token.clone()
    }

    /// Sends one round of alerts
    ///
    /// # Errors
    ///
    /// Returns an error only if the weather lookup or the recipient query
    /// fails. Individual SMS failures are reported in the returned
    /// [`DispatchReport`].
    pub async fn dispatch_alerts(&self) -> Result<DispatchReport, AlertError> {
        let summary = self.weather.summary(&self.config.location).await?;
        let message = compose_alert(&summary);

        let users = User::list_with_phone(&self.db).await?;
        let mut report = DispatchReport {
            recipients: users.len(),
            ..DispatchReport::default()
        };

        for user in users {
            let Some(phone) = user.phone.as_deref() else {
                continue;
            };

            match self.sms.send(phone, &message).await {
                Ok(()) => {
                    tracing::debug!(user_id = user.id, "Weather alert sent");
                    report.sent += 1;
                }
                Err(e) => {
                    tracing::warn!(user_id = user.id, error = %e, "Failed to send weather alert");
                    report.failed += 1;
                }
            }
        }

        tracing::info!(
            recipients = report.recipients,
            sent = report.sent,
            failed = report.failed,
            "Weather alert round complete"
        );

        Ok(report)
    }

    /// Runs the daily loop
    ///
    /// Sleeps until the next scheduled hour, dispatches, and repeats. A failed
    /// round is logged and the next day's round still runs.
    pub async fn run(&self) -> anyhow::Result<()> {
        tracing::info!(
            location = %self.config.location,
            hour_utc = self.config.hour_utc,
            "Alert scheduler starting"
        );

        let mut next = next_run_after(Utc::now(), self.config.hour_utc);

        loop {
            let wait = (next - Utc::now()).to_std().unwrap_or(Duration::ZERO);
            tracing::info!(next_run = %next, "Next weather alert scheduled");

            tokio::select! {
                _ = self.shutdown_token.cancelled() => {
                    tracing::info!("Alert scheduler shut down");
                    break;
                }
                _ = sleep(wait) => {
                    if let Err(e) = self.dispatch_alerts().await {
                        tracing::error!(error = %e, "Weather alert round failed");
                    }
                    next = following_run(next, Utc::now(), self.config.hour_utc);
                }
            }
        }

        Ok(())
    }
}
