//! WebSocket Message Types
//!
//! Defines all message types for WebSocket communication between clients
//! (dashboards, companion apps) and the Circadia server.

use crate::store::types::{CircadianEvent, CircadianInsight};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Messages sent from client to server
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    /// Subscribe to topics for real-time updates
    Subscribe {
        /// Topics to subscribe to (e.g., "insights.alice", "events.*")
        topics: Vec<String>,
    },
    /// Unsubscribe from topics
    Unsubscribe {
        /// Topics to unsubscribe from
        topics: Vec<String>,
    },
    /// Ping for keepalive
    Ping,
}

/// Messages sent from server to client
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    /// A new circadian event was logged
    EventLogged {
        user_id: String,
        event_id: Uuid,
        event_type: String,
        timestamp: NaiveDateTime,
    },
    /// The rule evaluator produced a new insight
    InsightCreated {
        user_id: String,
        insight_id: Uuid,
        insight_type: String,
        message: String,
        scheduled_for: NaiveDateTime,
    },
    /// Subscription confirmed
    Subscribed { topics: Vec<String> },
    /// Unsubscription confirmed
    Unsubscribed { topics: Vec<String> },
    /// Pong response to ping
    Pong,
    /// Error message
    Error { message: String },
    /// Connection established
    Connected { connection_id: String },
}

/// Internal event for broadcasting through the hub
#[derive(Debug, Clone)]
pub struct WsEvent {
    /// Topic this event belongs to (e.g., "insights.alice")
    pub topic: String,
    /// The message to send to subscribers
    pub message: ServerMessage,
}

impl WsEvent {
    /// Create an event-logged notification on the owner's events topic
    pub fn event_logged(event: &CircadianEvent) -> Self {
        Self {
            topic: format!("events.{}", event.user_id),
            message: ServerMessage::EventLogged {
                user_id: event.user_id.clone(),
                event_id: event.id,
                event_type: event.event_type.as_str().to_string(),
                timestamp: event.timestamp,
            },
        }
    }

    /// Create an insight-created notification on the owner's insights topic
    pub fn insight_created(insight: &CircadianInsight) -> Self {
        Self {
            topic: format!("insights.{}", insight.user_id),
            message: ServerMessage::InsightCreated {
                user_id: insight.user_id.clone(),
                insight_id: insight.id,
                insight_type: insight.kind.as_str().to_string(),
                message: insight.message.clone(),
                scheduled_for: insight.scheduled_for,
            },
        }
    }

    /// Create a system event
    pub fn system(message: &str) -> Self {
        Self {
            topic: "system".to_string(),
            message: ServerMessage::Error {
                message: message.to_string(),
            },
        }
    }
}
