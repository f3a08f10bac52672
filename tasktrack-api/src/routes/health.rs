/// Health check endpoint
///
/// Verifies the server is running and the store answers.
///
/// # Endpoint
///
/// ```text
/// GET /health
/// ```
///
/// # Response
///
/// ```json
/// {
///   "status": "healthy",
///   "version": "0.1.0",
///   "storage": "postgres",
///   "database": "connected"
/// }
/// ```
///
/// With in-memory storage `database` is `"not_configured"`. A failing
/// database reports `"disconnected"` and an overall status of `"degraded"`.

use crate::app::{AppState, Storage};
use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use tasktrack_shared::db::pool;

/// Health check response
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Service status
    pub status: String,

    /// Application version
    pub version: String,

    /// Storage engine in use
    pub storage: String,

    /// Database status
    pub database: String,
}

/// Health check handler
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let database = match &state.storage {
        Storage::Memory => "not_configured",
        Storage::Postgres(db) => match pool::health_check(db).await {
            Ok(()) => "connected",
            Err(e) => {
                tracing::warn!(error = %e, "Database health check failed");
                "disconnected"
            }
        },
    };

    Json(HealthResponse {
        status: if database == "disconnected" {
            "degraded".to_string()
        } else {
            "healthy".to_string()
        },
        version: env!("CARGO_PKG_VERSION").to_string(),
        storage: state.storage.name().to_string(),
        database: database.to_string(),
    })
}
