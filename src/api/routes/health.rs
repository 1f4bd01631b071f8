//! Health Routes
//!
//! Health check endpoints for monitoring and Kubernetes probes.
//!
//! - GET /health/live - Liveness probe (process is alive)
//! - GET /health/ready - Readiness probe (ready to serve traffic)
//! - GET /health - Full health status

use axum::{extract::State, http::StatusCode, Json};
use std::sync::Arc;

use crate::api::dto::HealthResponse;
use crate::api::state::AppState;

/// GET /health/live
///
/// Kubernetes liveness probe.
/// Returns 200 if the process is alive, no dependency checks.
pub async fn liveness() -> StatusCode {
    StatusCode::OK
}

/// GET /health/ready
///
/// Kubernetes readiness probe.
/// Returns 200 if both stores answer a trivial query.
pub async fn readiness(State(state): State<Arc<AppState>>) -> StatusCode {
    if check_event_log(&state).await && check_insight_store(&state).await {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    }
}

/// GET /health
///
/// Full health status with component details.
pub async fn full_health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let events_ok = check_event_log(&state).await;
    let insights_ok = check_insight_store(&state).await;

    let overall_status = if events_ok && insights_ok {
        "healthy"
    } else if events_ok || insights_ok {
        "degraded"
    } else {
        "unhealthy"
    };

    Json(HealthResponse {
        status: overall_status.to_string(),
        event_log: component_status(events_ok),
        insight_store: component_status(insights_ok),
        uptime_seconds: state.uptime_seconds(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

fn component_status(ok: bool) -> String {
    if ok { "ok" } else { "error" }.to_string()
}

/// Check that the event log answers queries
async fn check_event_log(state: &AppState) -> bool {
    state
        .events
        .lock()
        .await
        .recent_sleep_starts("health-probe", 1)
        .is_ok()
}

/// Check that the insight store answers queries
async fn check_insight_store(state: &AppState) -> bool {
    state.insights.lock().await.unread("health-probe").is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_liveness() {
        let status = liveness().await;
        assert_eq!(status, StatusCode::OK);
    }
}
