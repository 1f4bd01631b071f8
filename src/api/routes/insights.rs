//! Insight Routes
//!
//! Endpoints for reading and dismissing generated insights.
//!
//! - GET /api/v1/insights - Unread insights for a user
//! - POST /api/v1/insights/:id/read - Dismiss an insight

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;
use uuid::Uuid;

use crate::api::dto::{InsightDto, InsightsResponse, UnreadInsightsQuery};
use crate::api::error::{ApiError, ApiResult};
use crate::api::state::AppState;

/// GET /api/v1/insights?user_id=...
///
/// Unread insights for a user, ordered by scheduled time.
pub async fn unread_insights(
    State(state): State<Arc<AppState>>,
    Query(query): Query<UnreadInsightsQuery>,
) -> ApiResult<Json<InsightsResponse>> {
    if query.user_id.is_empty() {
        return Err(ApiError::Validation("user_id cannot be empty".to_string()));
    }

    let store = state.insights.lock().await;
    let insights = store.unread(&query.user_id)?;
    drop(store);

    Ok(Json(InsightsResponse {
        count: insights.len(),
        insights: insights.into_iter().map(InsightDto::from).collect(),
    }))
}

/// POST /api/v1/insights/:id/read
///
/// Mark an insight as read. Dismissing an already-read insight is a no-op;
/// an unknown id is surfaced as 404.
pub async fn mark_insight_read(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    let mut store = state.insights.lock().await;
    let existed = store.mark_read(id)?;
    drop(store);

    if existed {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::NotFound(format!("Insight '{}' not found", id)))
    }
}
