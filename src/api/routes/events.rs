//! Event Routes
//!
//! Endpoints for logging circadian events and reading day timelines.
//!
//! - POST /api/v1/events - Log a single event (triggers rule evaluation)
//! - GET /api/v1/events - Day-scoped timeline for one user

use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use chrono::Local;
use std::sync::Arc;
use uuid::Uuid;

use crate::api::dto::{
    DayEventsQuery, DayEventsResponse, EventDto, LogEventRequest, LogEventResponse,
};
use crate::api::error::{ApiError, ApiResult};
use crate::api::state::AppState;
use crate::rules::{evaluate, RuleContext, SLEEP_HISTORY_LIMIT};
use crate::store::types::CircadianEvent;
use crate::websocket::WsEvent;

/// POST /api/v1/events
///
/// Log a single circadian event. The event is appended to the log, the rule
/// evaluator runs against it with the day's events and the recent sleep
/// history, and any resulting insights are stored and pushed to WebSocket
/// subscribers.
pub async fn log_event(
    State(state): State<Arc<AppState>>,
    Json(req): Json<LogEventRequest>,
) -> ApiResult<(StatusCode, Json<LogEventResponse>)> {
    validate_log_request(&req)?;

    let now = Local::now().naive_local();
    let timestamp = req.timestamp.unwrap_or(now);

    let event = CircadianEvent {
        id: Uuid::new_v4(),
        user_id: req.user_id,
        event_type: req.event_type,
        timestamp,
        metadata: req.metadata,
    };

    // Append first so the day query sees the new event, then gather the
    // evaluator's inputs while still holding the log
    let mut log = state.events.lock().await;
    log.append(&event)?;
    let todays_events = log.events_for_day(&event.user_id, event.timestamp.date())?;
    let recent_sleep_starts = log.recent_sleep_starts(&event.user_id, SLEEP_HISTORY_LIMIT)?;
    drop(log);

    let drafts = evaluate(&RuleContext {
        new_event: &event,
        todays_events: &todays_events,
        recent_sleep_starts: &recent_sleep_starts,
        now,
    });

    let mut created = Vec::with_capacity(drafts.len());
    if !drafts.is_empty() {
        let mut insights = state.insights.lock().await;
        for draft in &drafts {
            created.push(insights.append(
                &event.user_id,
                draft.kind,
                &draft.message,
                draft.scheduled_for,
            )?);
        }
    }

    // Notify subscribers once the stores are released
    state.ws_hub.publish(&WsEvent::event_logged(&event)).await;
    for insight in &created {
        state.ws_hub.publish(&WsEvent::insight_created(insight)).await;
    }

    tracing::info!(
        event_id = %event.id,
        user_id = %event.user_id,
        event_type = %event.event_type,
        insights = created.len(),
        "Event logged"
    );

    Ok((
        StatusCode::CREATED,
        Json(LogEventResponse {
            status: "ok".to_string(),
            event_id: event.id,
            insight_ids: created.iter().map(|insight| insight.id).collect(),
        }),
    ))
}

/// GET /api/v1/events?user_id=...&date=YYYY-MM-DD
///
/// All events for one user on one calendar day, ordered by timestamp.
pub async fn day_events(
    State(state): State<Arc<AppState>>,
    Query(query): Query<DayEventsQuery>,
) -> ApiResult<Json<DayEventsResponse>> {
    if query.user_id.is_empty() {
        return Err(ApiError::Validation("user_id cannot be empty".to_string()));
    }

    let log = state.events.lock().await;
    let events = log.events_for_day(&query.user_id, query.date)?;
    drop(log);

    Ok(Json(DayEventsResponse {
        date: query.date,
        count: events.len(),
        events: events.into_iter().map(EventDto::from).collect(),
    }))
}

/// Validate a log-event request
fn validate_log_request(req: &LogEventRequest) -> ApiResult<()> {
    if req.user_id.is_empty() {
        return Err(ApiError::Validation("user_id cannot be empty".to_string()));
    }

    if req.user_id.len() > 100 {
        return Err(ApiError::Validation(
            "user_id exceeds maximum length of 100 characters".to_string(),
        ));
    }

    // Validate timestamp if provided (not too far in the past or future)
    if let Some(ts) = req.timestamp {
        let now = Local::now().naive_local();
        let ten_years = chrono::Duration::days(365 * 10);
        let one_year = chrono::Duration::days(365);

        if ts < now - ten_years {
            return Err(ApiError::Validation(
                "Timestamp is more than 10 years in the past".to_string(),
            ));
        }

        if ts > now + one_year {
            return Err(ApiError::Validation(
                "Timestamp is more than 1 year in the future".to_string(),
            ));
        }
    }

    // Validate metadata
    for (key, value) in &req.metadata {
        if key.is_empty() {
            return Err(ApiError::Validation(
                "Metadata key cannot be empty".to_string(),
            ));
        }
        if key.len() > 50 {
            return Err(ApiError::Validation(
                "Metadata key exceeds maximum length of 50 characters".to_string(),
            ));
        }
        if value.len() > 200 {
            return Err(ApiError::Validation(
                "Metadata value exceeds maximum length of 200 characters".to_string(),
            ));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::types::EventType;
    use std::collections::HashMap;

    #[test]
    fn test_validate_log_request_valid() {
        let req = LogEventRequest {
            user_id: "alice".to_string(),
            event_type: EventType::Meal,
            timestamp: None,
            metadata: HashMap::from([("meal_type".to_string(), "lunch".to_string())]),
        };
        assert!(validate_log_request(&req).is_ok());
    }

    #[test]
    fn test_validate_log_request_empty_user() {
        let req = LogEventRequest {
            user_id: "".to_string(),
            event_type: EventType::Activity,
            timestamp: None,
            metadata: HashMap::new(),
        };
        assert!(validate_log_request(&req).is_err());
    }

    #[test]
    fn test_validate_log_request_oversized_metadata() {
        let req = LogEventRequest {
            user_id: "alice".to_string(),
            event_type: EventType::Meal,
            timestamp: None,
            metadata: HashMap::from([("meal_type".to_string(), "x".repeat(201))]),
        };
        assert!(validate_log_request(&req).is_err());
    }
}
