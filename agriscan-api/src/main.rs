//! # AgriScan Web Server
//!
//! Serves the AgriScan pages: signup/login, leaf image classification and
//! the farming assistant.
//!
//! ## Startup
//!
//! 1. Load configuration from the environment (`.env` optional)
//! 2. Open the SQLite pool and run embedded migrations
//! 3. Load the classifier model and labels
//! 4. Serve until Ctrl-C / SIGTERM
//!
//! Any failure before step 4 exits the process without serving.
//!
//! ## Usage
//!
//! ```bash
//! SESSION_SECRET=$(openssl rand -hex 32) cargo run -p agriscan-api
//! ```

use agriscan_api::{
    app::{build_router, AppState},
    config::Config,
};
use agriscan_shared::{
    classifier::ImageClassifier,
    clients::{ChatClient, DisabledChatClient, OpenAiChatClient},
    db::{
        migrations::run_migrations,
        pool::{create_pool, DatabaseConfig},
    },
};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    tracing::info!(
        "AgriScan web server v{} starting...",
        env!("CARGO_PKG_VERSION")
    );

    let config = Config::from_env()?;

    let pool = create_pool(DatabaseConfig {
        max_connections: config.database.max_connections,
        ..DatabaseConfig::with_url(&config.database.url)
    })
    .await?;
    run_migrations(&pool).await?;

    let classifier = ImageClassifier::load(
        &config.classifier.model_path,
        &config.classifier.labels_path,
        config.classifier.resize_filter,
    )?;

    let chat: Arc<dyn ChatClient> = match &config.chat.api_key {
        Some(key) => Arc::new(OpenAiChatClient::new(
            key.clone(),
            config.chat.base_url.clone(),
            config.chat.model.clone(),
        )?),
        None => {
            tracing::warn!("OPENAI_API_KEY not set, the chat assistant is disabled");
            Arc::new(DisabledChatClient)
        }
    };

    let bind_address = config.bind_address();
    let state = AppState::new(pool.clone(), config, classifier, chat);
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&bind_address).await?;
    tracing::info!("Server listening on http://{}", bind_address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    agriscan_shared::db::pool::close_pool(pool).await;
    tracing::info!("Server stopped");
    Ok(())
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "agriscan_api=debug,agriscan_shared=debug,tower_http=debug".into());

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

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received, draining connections...");
}
