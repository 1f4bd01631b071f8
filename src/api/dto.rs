//! Data Transfer Objects
//!
//! Request and response types for the API endpoints.
//! These types are serialized/deserialized to/from JSON.

use crate::store::types::{CircadianEvent, CircadianInsight, EventType, InsightKind};
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

// ============================================
// EVENT DTOs
// ============================================

/// Log-event request
#[derive(Debug, Deserialize)]
pub struct LogEventRequest {
    /// Owner of the event
    pub user_id: String,
    /// What happened
    pub event_type: EventType,
    /// When it happened, local wall-clock; defaults to the server's local time
    #[serde(default)]
    pub timestamp: Option<NaiveDateTime>,
    /// Type-dependent metadata (e.g., meal_type, phase)
    #[serde(default)]
    pub metadata: HashMap<String, String>,
}

/// Log-event response
#[derive(Debug, Serialize)]
pub struct LogEventResponse {
    /// Status: "ok"
    pub status: String,
    /// ID of the stored event
    pub event_id: Uuid,
    /// Insights the rule evaluator produced for this event
    pub insight_ids: Vec<Uuid>,
}

/// Query string for the day timeline endpoint
#[derive(Debug, Deserialize)]
pub struct DayEventsQuery {
    pub user_id: String,
    /// Calendar day, YYYY-MM-DD
    pub date: NaiveDate,
}

/// One event in a timeline response
#[derive(Debug, Serialize)]
pub struct EventDto {
    pub id: Uuid,
    pub event_type: EventType,
    pub timestamp: NaiveDateTime,
    #[serde(skip_serializing_if = "HashMap::is_empty")]
    pub metadata: HashMap<String, String>,
}

impl From<CircadianEvent> for EventDto {
    fn from(event: CircadianEvent) -> Self {
        Self {
            id: event.id,
            event_type: event.event_type,
            timestamp: event.timestamp,
            metadata: event.metadata,
        }
    }
}

/// Day timeline response
#[derive(Debug, Serialize)]
pub struct DayEventsResponse {
    pub date: NaiveDate,
    pub count: usize,
    pub events: Vec<EventDto>,
}

// ============================================
// INSIGHT DTOs
// ============================================

/// Query string for the unread-insights endpoint
#[derive(Debug, Deserialize)]
pub struct UnreadInsightsQuery {
    pub user_id: String,
}

/// One insight in a listing response
#[derive(Debug, Serialize)]
pub struct InsightDto {
    pub id: Uuid,
    pub insight_type: InsightKind,
    pub message: String,
    pub scheduled_for: NaiveDateTime,
    pub is_read: bool,
}

impl From<CircadianInsight> for InsightDto {
    fn from(insight: CircadianInsight) -> Self {
        Self {
            id: insight.id,
            insight_type: insight.kind,
            message: insight.message,
            scheduled_for: insight.scheduled_for,
            is_read: insight.is_read,
        }
    }
}

/// Unread insights response
#[derive(Debug, Serialize)]
pub struct InsightsResponse {
    pub count: usize,
    pub insights: Vec<InsightDto>,
}

// ============================================
// HEALTH DTOs
// ============================================

/// Full health status response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub event_log: String,
    pub insight_store: String,
    pub uptime_seconds: u64,
    pub version: String,
}
