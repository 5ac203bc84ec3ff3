//! Health check endpoint.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;

use crate::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub database: bool,
    /// Embedded migrations not yet applied; `None` when the count failed.
    pub pending_migrations: Option<usize>,
    pub subscribers: usize,
}

/// GET /health: 200 when the database answers and the schema is current,
/// 503 otherwise.
pub async fn check(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let database = state.db.health_check().await;
    let pending_migrations = match state.db.migration_status().await {
        Ok((total, applied)) => Some(total.saturating_sub(applied)),
        Err(e) => {
            tracing::warn!(error = %e, "Migration status unavailable");
            None
        }
    };

    let healthy = database && pending_migrations == Some(0);
    let status = if healthy { StatusCode::OK } else { StatusCode::SERVICE_UNAVAILABLE };

    (
        status,
        Json(HealthResponse {
            status: if healthy { "ok" } else { "degraded" },
            database,
            pending_migrations,
            subscribers: state.hub.subscriber_count(),
        }),
    )
}
