//! Persistence boundary for circadian events and insights
//!
//! Two append-only SQLite-backed components:
//! - [`EventLog`]: timestamped circadian events, written once, queried per day
//! - [`InsightStore`]: generated insights, whose only mutation is the
//!   false→true `is_read` transition
//!
//! Both are constructed once at startup and injected into the API state;
//! nothing in this module reaches for ambient global state.

pub mod error;
pub mod event_log;
pub mod insights;
pub mod types;

pub use error::{StoreError, StoreResult};
pub use event_log::EventLog;
pub use insights::InsightStore;
pub use types::{
    CircadianEvent, CircadianInsight, DayWindow, EventDetails, EventType, InsightKind, LightPhase,
    MealType,
};
