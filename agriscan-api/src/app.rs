/// Application state and router builder
///
/// This module defines the shared application state and provides a function
/// to build the Axum router with all routes and middleware.
///
/// # Example
///
/// ```no_run
/// use agriscan_api::{app::AppState, config::Config};
/// use agriscan_shared::classifier::ImageClassifier;
/// use agriscan_shared::clients::DisabledChatClient;
/// use agriscan_shared::db::pool::{create_pool, DatabaseConfig};
/// use std::sync::Arc;
///
/// # async fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// let pool = create_pool(DatabaseConfig::with_url(&config.database.url)).await?;
/// let classifier = ImageClassifier::load(
///     &config.classifier.model_path,
///     &config.classifier.labels_path,
///     config.classifier.resize_filter,
/// )?;
/// let state = AppState::new(pool, config, classifier, Arc::new(DisabledChatClient));
/// let app = agriscan_api::app::build_router(state);
/// # Ok(())
/// # }
/// ```

use crate::{
    config::Config,
    middleware::{security::SecurityHeadersLayer, session::require_session},
    routes,
};
use agriscan_shared::{
    auth::{credentials::CredentialStore, session::SessionGuard},
    classifier::ImageClassifier,
    clients::ChatClient,
};
use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use sqlx::SqlitePool;
use std::sync::Arc;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

/// Shared application state
///
/// This is cloned for each request handler via Axum's `State` extractor.
/// Everything inside is either a pool handle or an `Arc`, so cloning is cheap.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: SqlitePool,

    /// Application configuration
    pub config: Arc<Config>,

    /// Signup and login
    pub credentials: CredentialStore,

    /// Session issuing and checking
    pub sessions: SessionGuard,

    /// Loaded once at startup, read-only afterwards
    pub classifier: Arc<ImageClassifier>,

    /// Farming assistant backend
    pub chat: Arc<dyn ChatClient>,
}

impl AppState {
    /// Creates new application state
    pub fn new(
        db: SqlitePool,
        config: Config,
        classifier: ImageClassifier,
        chat: Arc<dyn ChatClient>,
    ) -> Self {
        let sessions = SessionGuard::new(config.session.secret.clone(), config.session.ttl_hours);

        Self {
            credentials: CredentialStore::new(db.clone()),
            db,
            config: Arc::new(config),
            sessions,
            classifier: Arc::new(classifier),
            chat,
        }
    }
}

/// Builds the complete Axum router with all routes and middleware
///
/// # Routes
///
/// ```text
/// /
/// ├── GET       /                 # Landing page (public)
/// ├── GET|POST  /signup           # Create account (public)
/// ├── GET|POST  /login            # Sign in (public)
/// ├── GET       /logout           # Sign out (public)
/// ├── GET       /health           # Liveness (public)
/// ├── GET       /health/detail    # Health with database status (public)
/// ├── GET       /dashboard        # session required
/// ├── GET       /scan             # session required
/// ├── POST      /predict          # session required
/// ├── GET|POST  /chatbot          # session required
/// ├── GET       /chat             # session required
/// └── POST      /api/chat         # session required
/// ```
///
/// # Middleware Stack
///
/// 1. Security headers
/// 2. Logging (tower-http TraceLayer)
/// 3. Request body limit
/// 4. Login guard (protected routes only)
pub fn build_router(state: AppState) -> Router {
    let public_routes = Router::new()
        .route("/", get(routes::pages::landing))
        .route(
            "/signup",
            get(routes::auth::signup_page).post(routes::auth::signup),
        )
        .route(
            "/login",
            get(routes::auth::login_page).post(routes::auth::login),
        )
        .route("/logout", get(routes::auth::logout))
        .route("/health", get(routes::health::liveness))
        .route("/health/detail", get(routes::health::health_detail));

    let protected_routes = Router::new()
        .route("/dashboard", get(routes::dashboard::dashboard))
        .route("/scan", get(routes::scan::scan))
        .route("/predict", post(routes::scan::predict))
        .route(
            "/chatbot",
            get(routes::chat::chat_page).post(routes::chat::chat_form),
        )
        .route("/chat", get(routes::chat::chat_page))
        .route("/api/chat", post(routes::chat::chat_api))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            require_session,
        ));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .layer(DefaultBodyLimit::max(state.config.api.max_upload_bytes))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(SecurityHeadersLayer::new(state.config.api.production))
        .with_state(state)
}
