use axum::{extract::State, http::StatusCode, Json};
use tracing::warn;

use crate::api::{state::AppState, types::HealthResponse};

/// GET /health -- liveness/readiness probe
///
/// A missing AI backend is `degraded` (fallbacks still work); a dead database
/// is a 503.
pub async fn health_handler(
    State(state): State<AppState>,
) -> std::result::Result<Json<HealthResponse>, (StatusCode, Json<HealthResponse>)> {
    let db_ok = match state.predictions.store().ping().await {
        Ok(()) => true,
        Err(e) => {
            warn!(error = %e, "health check: database unreachable");
            false
        }
    };
    let ai_ok = state.predictions.ai_available();

    let status = match (db_ok, ai_ok) {
        (true, true) => "ok",
        (true, false) => "degraded",
        (false, _) => "unhealthy",
    };

    let resp = HealthResponse {
        status: status.to_string(),
        db: if db_ok { "connected" } else { "disconnected" }.to_string(),
        ai: if ai_ok { "available" } else { "fallback-only" }.to_string(),
        uptime_secs: state.uptime_seconds(),
        listener: state.listener_stats.snapshot(),
    };

    if db_ok {
        Ok(Json(resp))
    } else {
        Err((StatusCode::SERVICE_UNAVAILABLE, Json(resp)))
    }
}
