//! # AgriScan Alert Worker
//!
//! Background process that texts a daily weather summary to every user who
//! registered a phone number.
//!
//! ## Usage
//!
//! ```bash
//! TWILIO_ACCOUNT_SID=... TWILIO_AUTH_TOKEN=... TWILIO_FROM_NUMBER=... \
//!     cargo run -p agriscan-worker
//! ```

use agriscan_shared::{
    clients::{TwilioSmsSender, WttrWeather},
    db::{
        migrations::run_migrations,
        pool::{close_pool, create_pool, DatabaseConfig},
    },
};
use agriscan_worker::{config::WorkerConfig, scheduler::AlertScheduler};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    tracing::info!(
        "AgriScan alert worker v{} starting...",
        env!("CARGO_PKG_VERSION")
    );

    let config = WorkerConfig::from_env()?;
    tracing::debug!(?config, "Loaded worker configuration");

    let pool = create_pool(DatabaseConfig::with_url(&config.database_url)).await?;
    run_migrations(&pool).await?;

    let sms = TwilioSmsSender::new(
        config.twilio.base_url.clone(),
        config.twilio.account_sid.clone(),
        config.twilio.auth_token.clone(),
        config.twilio.from_number.clone(),
    )?;
    let weather = WttrWeather::new(config.weather_base_url.clone())?;

    let scheduler = AlertScheduler::new(
        pool.clone(),
        Arc::new(weather),
        Arc::new(sms),
        config.alert.clone(),
    );

    let shutdown_token = scheduler.shutdown_token();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                tracing::info!("Received Ctrl+C, initiating graceful shutdown");
                shutdown_token.cancel();
            }
            Err(e) => tracing::error!(error = %e, "Failed to listen for Ctrl+C"),
        }
    });

    scheduler.run().await?;

    close_pool(pool).await;
    tracing::info!("Alert worker stopped");
    Ok(())
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "agriscan_worker=debug,agriscan_shared=debug".into());

    let json = std::env::var("LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}
