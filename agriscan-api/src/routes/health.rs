/// Health check endpoints
///
/// # Endpoints
///
/// ```text
/// GET /health          -> 200 "OK", touches nothing
/// GET /health/detail   -> 200 JSON with database connectivity
/// ```
///
/// # Detail response
///
/// ```json
/// {
///   "status": "healthy",
///   "version": "0.1.0",
///   "database": "connected",
///   "schema_version": 20250101000000
/// }
/// ```

use crate::app::AppState;
use agriscan_shared::db::{migrations::schema_version, pool::health_check};
use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

/// Liveness check
///
/// Answers even when the database or model is unavailable.
pub async fn liveness() -> &'static str {
    "OK"
}

/// Detailed health response
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    /// `healthy` or `degraded`
    pub status: String,

    /// Application version
    pub version: String,

    /// `connected` or `disconnected`
    pub database: String,

    /// Newest applied migration
    pub schema_version: Option<i64>,
}

/// `GET /health/detail`
pub async fn health_detail(State(state): State<AppState>) -> Json<HealthResponse> {
    let connected = match health_check(&state.db).await {
        Ok(()) => true,
        Err(e) => {
            tracing::warn!(error = %e, "Database health check failed");
            false
        }
    };

    let schema_version = if connected {
        schema_version(&state.db).await.ok().flatten()
    } else {
        None
    };

    Json(HealthResponse {
        status: if connected { "healthy" } else { "degraded" }.to_string(),
        version: agriscan_shared::VERSION.to_string(),
        database: if connected { "connected" } else { "disconnected" }.to_string(),
        schema_version,
    })
}
