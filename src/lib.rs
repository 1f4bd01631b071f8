//! # Circadia
//!
//! Circadian wellness tracking service: an append-only log of timestamped
//! circadian events (fasting, meals, light exposure, sleep, activity), a pure
//! rule evaluator that turns each newly logged event into zero or more
//! insights, and the surrounding HTTP/WebSocket surface the presentation
//! layer consumes.
//!
//! ## Modules
//!
//! - [`store`]: SQLite-backed event log and insight store
//! - [`rules`]: The fixed rule catalog and its pure evaluator
//! - [`api`]: REST API server with Axum
//! - [`websocket`]: Real-time notifications for new events and insights
//! - [`config`]: TOML configuration with environment overrides
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use chrono::NaiveDate;
//! use circadia::rules::{evaluate, RuleContext, SLEEP_HISTORY_LIMIT};
//! use circadia::store::{CircadianEvent, EventLog, EventType, InsightStore};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let data_dir = std::path::Path::new("circadia_data");
//!     let mut events = EventLog::open(data_dir)?;
//!     let mut insights = InsightStore::open(data_dir)?;
//!
//!     // Log a fast start at 20:00
//!     let stamp = NaiveDate::from_ymd_opt(2025, 1, 1)
//!         .and_then(|d| d.and_hms_opt(20, 0, 0))
//!         .unwrap();
//!     let event = CircadianEvent::new("alice", EventType::FastStart, stamp);
//!     events.append(&event)?;
//!
//!     // Run the rule catalog against it
//!     let todays = events.events_for_day("alice", event.timestamp.date())?;
//!     let history = events.recent_sleep_starts("alice", SLEEP_HISTORY_LIMIT)?;
//!     let drafts = evaluate(&RuleContext {
//!         new_event: &event,
//!         todays_events: &todays,
//!         recent_sleep_starts: &history,
//!         now: chrono::Local::now().naive_local(),
//!     });
//!
//!     // Persist whatever fired (here: one long-fast reminder for 12:00 next day)
//!     for draft in drafts {
//!         insights.append("alice", draft.kind, &draft.message, draft.scheduled_for)?;
//!     }
//!
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod config;
pub mod rules;
pub mod store;
pub mod websocket;

// Re-export top-level types for convenience
pub use store::{
    CircadianEvent, CircadianInsight, DayWindow, EventDetails, EventLog, EventType, InsightKind,
    InsightStore, LightPhase, MealType, StoreError, StoreResult,
};

pub use rules::{evaluate, InsightDraft, RuleContext, SLEEP_HISTORY_LIMIT};

pub use api::{build_router, serve, ApiConfig, ApiError, ApiResult, AppState};

pub use websocket::{
    websocket_handler, ClientMessage, ConnectionHub, HubConfig, HubError, ServerMessage, WsEvent,
};

pub use config::{Config, ConfigError, LoggingConfig, NotificationsConfig, StoreConfig};
