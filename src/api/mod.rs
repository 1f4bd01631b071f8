//! Circadia REST API
//!
//! HTTP API layer for Circadia, built with Axum.
//!
//! # Endpoints
//!
//! ## Events
//! - `POST /api/v1/events` - Log a circadian event (runs the rule evaluator)
//! - `GET /api/v1/events` - Day-scoped timeline for one user
//!
//! ## Insights
//! - `GET /api/v1/insights` - Unread insights for one user
//! - `POST /api/v1/insights/:id/read` - Dismiss an insight
//!
//! ## Health
//! - `GET /health/live` - Liveness probe
//! - `GET /health/ready` - Readiness probe
//! - `GET /health` - Full health status
//!
//! ## WebSocket
//! - `GET /ws` - Real-time notification connection
//!
//! # Example
//!
//! ```rust,ignore
//! use circadia::api::{serve, ApiConfig, AppState};
//! use circadia::store::{EventLog, InsightStore};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let data_dir = std::path::Path::new("circadia_data");
//!     let events = EventLog::open(data_dir)?;
//!     let insights = InsightStore::open(data_dir)?;
//!     let config = ApiConfig::default();
//!
//!     let state = AppState::new(events, insights, config.clone());
//!     serve(state, &config).await?;
//!
//!     Ok(())
//! }
//! ```

pub mod dto;
pub mod error;
pub mod routes;
pub mod state;

pub use error::{ApiError, ApiResult};
pub use state::{ApiConfig, AppState};

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::websocket::websocket_handler;

/// Build the API router with all routes and middleware
pub fn build_router(state: AppState) -> Router {
    let max_body_size = state.config.max_body_size;

    let api_routes = Router::new()
        // Event routes
        .route("/events", post(routes::events::log_event))
        .route("/events", get(routes::events::day_events))
        // Insight routes
        .route("/insights", get(routes::insights::unread_insights))
        .route("/insights/:id/read", post(routes::insights::mark_insight_read))
        .layer(DefaultBodyLimit::max(max_body_size))
        // WebSocket route
        .route("/ws", get(websocket_handler));

    let health_routes = Router::new()
        .route("/live", get(routes::health::liveness))
        .route("/ready", get(routes::health::readiness))
        .route("/", get(routes::health::full_health));

    // Create shared state
    let shared_state = Arc::new(state);

    Router::new()
        .nest("/api/v1", api_routes)
        .nest("/health", health_routes)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()) // Configure properly in production
        .with_state(shared_state)
}

/// Start the API server
pub async fn serve(state: AppState, config: &ApiConfig) -> Result<(), ApiError> {
    let router = build_router(state);

    let addr = config.addr();
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("Circadia API listening on {}", addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| ApiError::Internal(format!("Server error: {}", e)))?;

    tracing::info!("Circadia API shut down gracefully");
    Ok(())
}

/// Wait for shutdown signal
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received, starting graceful shutdown");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{EventLog, InsightStore};
    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use tower::util::ServiceExt;

    fn create_test_app() -> Router {
        let events = EventLog::open_in_memory().unwrap();
        let insights = InsightStore::open_in_memory().unwrap();
        let state = AppState::new(events, insights, ApiConfig::default());
        build_router(state)
    }

    async fn body_json(response: axum::response::Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_health_live() {
        let app = create_test_app();

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/health/live")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_health_ready() {
        let app = create_test_app();

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/health/ready")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_log_event_creates_event() {
        let app = create_test_app();

        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/v1/events")
                    .header("Content-Type", "application/json")
                    .body(Body::from(
                        r#"{"user_id": "alice", "event_type": "activity",
                           "timestamp": "2025-01-01T12:00:00"}"#,
                    ))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::CREATED);
        let body = body_json(response).await;
        assert_eq!(body["status"], "ok");
        assert_eq!(body["insight_ids"].as_array().unwrap().len(), 0);
    }

    #[tokio::test]
    async fn test_log_fast_start_produces_long_fast_insight() {
        let app = create_test_app();

        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/v1/events")
                    .header("Content-Type", "application/json")
                    .body(Body::from(
                        r#"{"user_id": "alice", "event_type": "fast_start",
                           "timestamp": "2025-01-01T20:00:00"}"#,
                    ))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::CREATED);
        let body = body_json(response).await;
        assert_eq!(body["insight_ids"].as_array().unwrap().len(), 1);

        // The insight is readable as unread, scheduled 16h after the fast start
        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/v1/insights?user_id=alice")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["count"], 1);
        assert_eq!(body["insights"][0]["insight_type"], "long_fast");
        assert_eq!(body["insights"][0]["scheduled_for"], "2025-01-02T12:00:00");
        assert_eq!(body["insights"][0]["is_read"], false);
    }

    #[tokio::test]
    async fn test_late_breakfast_flow() {
        let app = create_test_app();

        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/v1/events")
                    .header("Content-Type", "application/json")
                    .body(Body::from(
                        r#"{"user_id": "alice", "event_type": "meal",
                           "timestamp": "2025-01-01T10:15:00",
                           "metadata": {"meal_type": "breakfast"}}"#,
                    ))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::CREATED);

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/v1/insights?user_id=alice")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        let body = body_json(response).await;
        assert_eq!(body["count"], 1);
        assert_eq!(body["insights"][0]["insight_type"], "late_breakfast");
        assert_eq!(
            body["insights"][0]["message"],
            "Late breakfast can shift your clock. Try eating before 9 AM."
        );
    }

    #[tokio::test]
    async fn test_early_breakfast_produces_nothing() {
        let app = create_test_app();

        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/v1/events")
                    .header("Content-Type", "application/json")
                    .body(Body::from(
                        r#"{"user_id": "alice", "event_type": "meal",
                           "timestamp": "2025-01-01T08:00:00",
                           "metadata": {"meal_type": "breakfast"}}"#,
                    ))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::CREATED);
        let body = body_json(response).await;
        assert_eq!(body["insight_ids"].as_array().unwrap().len(), 0);
    }

    #[tokio::test]
    async fn test_day_timeline() {
        let app = create_test_app();

        for payload in [
            r#"{"user_id": "alice", "event_type": "sleep_end", "timestamp": "2025-01-01T07:00:00"}"#,
            r#"{"user_id": "alice", "event_type": "activity", "timestamp": "2025-01-01T18:00:00"}"#,
            // Different day, must not appear
            r#"{"user_id": "alice", "event_type": "activity", "timestamp": "2025-01-02T18:00:00"}"#,
        ] {
            let response = app
                .clone()
                .oneshot(
                    Request::builder()
                        .method("POST")
                        .uri("/api/v1/events")
                        .header("Content-Type", "application/json")
                        .body(Body::from(payload))
                        .unwrap(),
                )
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::CREATED);
        }

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/v1/events?user_id=alice&date=2025-01-01")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["count"], 2);
        assert_eq!(body["events"][0]["event_type"], "sleep_end");
        assert_eq!(body["events"][1]["event_type"], "activity");
    }

    #[tokio::test]
    async fn test_mark_insight_read_flow() {
        let app = create_test_app();

        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/v1/events")
                    .header("Content-Type", "application/json")
                    .body(Body::from(
                        r#"{"user_id": "alice", "event_type": "fast_start",
                           "timestamp": "2025-01-01T20:00:00"}"#,
                    ))
                    .unwrap(),
            )
            .await
            .unwrap();
        let body = body_json(response).await;
        let insight_id = body["insight_ids"][0].as_str().unwrap().to_string();

        // Dismiss
        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri(format!("/api/v1/insights/{}/read", insight_id))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NO_CONTENT);

        // Dismissing again is a no-op, not an error
        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri(format!("/api/v1/insights/{}/read", insight_id))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NO_CONTENT);

        // Gone from the unread listing
        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/v1/insights?user_id=alice")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        let body = body_json(response).await;
        assert_eq!(body["count"], 0);
    }

    #[tokio::test]
    async fn test_mark_unknown_insight_read() {
        let app = create_test_app();

        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/v1/insights/00000000-0000-0000-0000-000000000000/read")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_log_event_invalid_json() {
        let app = create_test_app();

        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/v1/events")
                    .header("Content-Type", "application/json")
                    .body(Body::from("not json"))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_log_event_unknown_type_rejected() {
        let app = create_test_app();

        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/v1/events")
                    .header("Content-Type", "application/json")
                    .body(Body::from(
                        r#"{"user_id": "alice", "event_type": "nap"}"#,
                    ))
                    .unwrap(),
            )
            .await
            .unwrap();

        // Unknown event types are rejected at the boundary before the
        // evaluator ever sees them
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }
}
