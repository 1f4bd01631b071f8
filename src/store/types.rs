//! Core data types for the Circadia store
//!
//! This module defines the fundamental types shared across the service:
//! - `CircadianEvent`: one timestamped user action (fasting, eating, light, sleep)
//! - `EventType` / `EventDetails`: the event taxonomy and its typed metadata view
//! - `CircadianInsight` / `InsightKind`: generated recommendations and the rule catalog
//! - `DayWindow`: the local midnight-to-midnight interval used for day-scoped queries
//!
//! All timestamps are naive wall-clock values in the user's local time. Callers
//! supply them already resolved to that frame; no timezone conversion happens here.

use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

/// The kind of circadian event being logged
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    /// Start of a fasting window
    FastStart,
    /// End of a fasting window
    FastEnd,
    /// A meal (metadata carries the meal type)
    Meal,
    /// Bright light exposure (metadata carries the phase)
    LightExposure,
    /// Going to sleep
    SleepStart,
    /// Waking up
    SleepEnd,
    /// Physical activity
    Activity,
}

impl EventType {
    /// All event types, for iteration
    pub fn all() -> &'static [EventType] {
        &[
            EventType::FastStart,
            EventType::FastEnd,
            EventType::Meal,
            EventType::LightExposure,
            EventType::SleepStart,
            EventType::SleepEnd,
            EventType::Activity,
        ]
    }

    /// Stable string form, used on the wire and in the database
    pub fn as_str(&self) -> &'static str {
        match self {
            EventType::FastStart => "fast_start",
            EventType::FastEnd => "fast_end",
            EventType::Meal => "meal",
            EventType::LightExposure => "light_exposure",
            EventType::SleepStart => "sleep_start",
            EventType::SleepEnd => "sleep_end",
            EventType::Activity => "activity",
        }
    }

    /// Parse the string form back into the enum
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "fast_start" => Some(EventType::FastStart),
            "fast_end" => Some(EventType::FastEnd),
            "meal" => Some(EventType::Meal),
            "light_exposure" => Some(EventType::LightExposure),
            "sleep_start" => Some(EventType::SleepStart),
            "sleep_end" => Some(EventType::SleepEnd),
            "activity" => Some(EventType::Activity),
            _ => None,
        }
    }
}

impl std::fmt::Display for EventType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Meal classification carried in `meal` event metadata
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MealType {
    Breakfast,
    Lunch,
    Dinner,
    Snack,
}

impl MealType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MealType::Breakfast => "breakfast",
            MealType::Lunch => "lunch",
            MealType::Dinner => "dinner",
            MealType::Snack => "snack",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "breakfast" => Some(MealType::Breakfast),
            "lunch" => Some(MealType::Lunch),
            "dinner" => Some(MealType::Dinner),
            "snack" => Some(MealType::Snack),
            _ => None,
        }
    }
}

/// Time-of-day phase carried in `light_exposure` event metadata
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LightPhase {
    Morning,
    Evening,
}

impl LightPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            LightPhase::Morning => "morning",
            LightPhase::Evening => "evening",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "morning" => Some(LightPhase::Morning),
            "evening" => Some(LightPhase::Evening),
            _ => None,
        }
    }
}

/// A single logged circadian event
///
/// Immutable once appended: the store supports insertion and day-scoped
/// retrieval only, never update or delete.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CircadianEvent {
    /// Opaque unique identifier, assigned at creation
    pub id: Uuid,
    /// Owner reference
    pub user_id: String,
    /// What happened
    pub event_type: EventType,
    /// When it happened (not when it was recorded), local wall-clock
    pub timestamp: NaiveDateTime,
    /// Open key-value metadata; shape depends on `event_type`
    #[serde(default)]
    pub metadata: HashMap<String, String>,
}

impl CircadianEvent {
    /// Create a new event with a fresh id
    pub fn new(
        user_id: impl Into<String>,
        event_type: EventType,
        timestamp: NaiveDateTime,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id: user_id.into(),
            event_type,
            timestamp,
            metadata: HashMap::new(),
        }
    }

    /// Builder method: add a metadata entry
    pub fn meta(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    /// Look up a metadata value
    pub fn meta_value(&self, key: &str) -> Option<&str> {
        self.metadata.get(key).map(String::as_str)
    }
}

/// Typed view of an event and its metadata
///
/// Where `CircadianEvent` keeps metadata as an open map (forward-compatible
/// with event shapes the rule catalog does not know yet), `EventDetails` is
/// the sum type the evaluator matches on exhaustively. Construction is
/// fallible: an event whose metadata does not carry the fields its type
/// requires has no typed view, and no rule can fire for it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventDetails {
    FastStart,
    FastEnd,
    Meal(MealType),
    LightExposure(LightPhase),
    SleepStart,
    SleepEnd,
    Activity,
}

impl EventDetails {
    /// Build the typed view of an event, if its metadata is well-formed
    pub fn of(event: &CircadianEvent) -> Option<Self> {
        match event.event_type {
            EventType::FastStart => Some(EventDetails::FastStart),
            EventType::FastEnd => Some(EventDetails::FastEnd),
            EventType::Meal => event
                .meta_value("meal_type")
                .and_then(MealType::parse)
                .map(EventDetails::Meal),
            EventType::LightExposure => event
                .meta_value("phase")
                .and_then(LightPhase::parse)
                .map(EventDetails::LightExposure),
            EventType::SleepStart => Some(EventDetails::SleepStart),
            EventType::SleepEnd => Some(EventDetails::SleepEnd),
            EventType::Activity => Some(EventDetails::Activity),
        }
    }
}

/// The fixed insight catalog
///
/// One variant per rule. `fast_end`, `sleep_start`, `sleep_end` and
/// `activity` events have no corresponding rule; that asymmetry is a product
/// scope decision, not an oversight.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum InsightKind {
    LongFast,
    LateBreakfast,
    LateDinner,
    LateMorningLight,
    LateEveningLight,
}

impl InsightKind {
    /// Stable string form, used on the wire and in the database
    pub fn as_str(&self) -> &'static str {
        match self {
            InsightKind::LongFast => "long_fast",
            InsightKind::LateBreakfast => "late_breakfast",
            InsightKind::LateDinner => "late_dinner",
            InsightKind::LateMorningLight => "late_morning_light",
            InsightKind::LateEveningLight => "late_evening_light",
        }
    }

    /// Parse the string form back into the enum
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "long_fast" => Some(InsightKind::LongFast),
            "late_breakfast" => Some(InsightKind::LateBreakfast),
            "late_dinner" => Some(InsightKind::LateDinner),
            "late_morning_light" => Some(InsightKind::LateMorningLight),
            "late_evening_light" => Some(InsightKind::LateEveningLight),
            _ => None,
        }
    }

    /// The fixed user-facing message for this insight kind
    pub fn message(&self) -> &'static str {
        match self {
            InsightKind::LongFast => {
                "You've fasted >16h. Consider breaking fast to avoid low energy."
            }
            InsightKind::LateBreakfast => {
                "Late breakfast can shift your clock. Try eating before 9 AM."
            }
            InsightKind::LateDinner => {
                "Late dinner may disrupt sleep. Aim to finish 2h before bed."
            }
            InsightKind::LateMorningLight => {
                "Get 10 min of bright light to kickstart your circadian rhythm."
            }
            InsightKind::LateEveningLight => {
                "Evening light can delay sleep. Dim lights after 8 PM."
            }
        }
    }
}

impl std::fmt::Display for InsightKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A generated recommendation, produced by the rule evaluator
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CircadianInsight {
    /// Opaque unique identifier
    pub id: Uuid,
    /// Owner reference
    pub user_id: String,
    /// Which rule fired
    pub kind: InsightKind,
    /// Fixed message associated with the rule
    pub message: String,
    /// When the insight becomes relevant (may be in the future)
    pub scheduled_for: NaiveDateTime,
    /// Whether the user has dismissed or acted on it; the only mutable field
    pub is_read: bool,
}

/// Half-open local-time interval `[start, end)` covering one calendar day
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DayWindow {
    /// Local midnight at the start of the day (inclusive)
    pub start: NaiveDateTime,
    /// Local midnight at the start of the next day (exclusive)
    pub end: NaiveDateTime,
}

impl DayWindow {
    /// The window for a specific calendar day
    pub fn of(date: NaiveDate) -> Self {
        let start = date.and_time(NaiveTime::MIN);
        Self {
            start,
            end: start + Duration::days(1),
        }
    }

    /// The window containing a timestamp
    pub fn containing(timestamp: NaiveDateTime) -> Self {
        Self::of(timestamp.date())
    }

    /// Check whether a timestamp falls inside the window
    pub fn contains(&self, timestamp: NaiveDateTime) -> bool {
        timestamp >= self.start && timestamp < self.end
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ts(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S").unwrap()
    }

    #[test]
    fn test_event_type_round_trip() {
        for et in EventType::all() {
            assert_eq!(EventType::parse(et.as_str()), Some(*et));
        }
        assert_eq!(EventType::parse("nap"), None);
    }

    #[test]
    fn test_event_creation() {
        let event = CircadianEvent::new("u1", EventType::Meal, ts("2025-01-01T08:30:00"))
            .meta("meal_type", "breakfast");

        assert_eq!(event.user_id, "u1");
        assert_eq!(event.event_type, EventType::Meal);
        assert_eq!(event.meta_value("meal_type"), Some("breakfast"));
        assert_eq!(event.meta_value("phase"), None);
    }

    #[test]
    fn test_event_serialization() {
        let event = CircadianEvent::new("u1", EventType::LightExposure, ts("2025-01-01T07:00:00"))
            .meta("phase", "morning");
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("\"event_type\":\"light_exposure\""));

        let restored: CircadianEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(event, restored);
    }

    #[test]
    fn test_event_details_unit_types() {
        let event = CircadianEvent::new("u1", EventType::FastStart, ts("2025-01-01T20:00:00"));
        assert_eq!(EventDetails::of(&event), Some(EventDetails::FastStart));

        let event = CircadianEvent::new("u1", EventType::Activity, ts("2025-01-01T20:00:00"));
        assert_eq!(EventDetails::of(&event), Some(EventDetails::Activity));
    }

    #[test]
    fn test_event_details_meal() {
        let event = CircadianEvent::new("u1", EventType::Meal, ts("2025-01-01T12:00:00"))
            .meta("meal_type", "dinner");
        assert_eq!(
            EventDetails::of(&event),
            Some(EventDetails::Meal(MealType::Dinner))
        );
    }

    #[test]
    fn test_event_details_missing_metadata() {
        // A meal without a meal_type has no typed view
        let event = CircadianEvent::new("u1", EventType::Meal, ts("2025-01-01T12:00:00"));
        assert_eq!(EventDetails::of(&event), None);

        // Same for an unrecognized value
        let event = CircadianEvent::new("u1", EventType::Meal, ts("2025-01-01T12:00:00"))
            .meta("meal_type", "brunch");
        assert_eq!(EventDetails::of(&event), None);

        let event = CircadianEvent::new("u1", EventType::LightExposure, ts("2025-01-01T12:00:00"))
            .meta("phase", "noon");
        assert_eq!(EventDetails::of(&event), None);
    }

    #[test]
    fn test_insight_kind_round_trip() {
        for kind in [
            InsightKind::LongFast,
            InsightKind::LateBreakfast,
            InsightKind::LateDinner,
            InsightKind::LateMorningLight,
            InsightKind::LateEveningLight,
        ] {
            assert_eq!(InsightKind::parse(kind.as_str()), Some(kind));
        }
        assert_eq!(InsightKind::parse("early_bird"), None);
    }

    #[test]
    fn test_insight_messages_are_fixed() {
        assert_eq!(
            InsightKind::LateBreakfast.message(),
            "Late breakfast can shift your clock. Try eating before 9 AM."
        );
        assert_eq!(
            InsightKind::LongFast.message(),
            "You've fasted >16h. Consider breaking fast to avoid low energy."
        );
    }

    #[test]
    fn test_day_window_bounds() {
        let window = DayWindow::of(NaiveDate::from_ymd_opt(2025, 1, 1).unwrap());

        assert!(window.contains(ts("2025-01-01T00:00:00")));
        assert!(window.contains(ts("2025-01-01T23:59:59")));
        assert!(!window.contains(ts("2025-01-02T00:00:00")));
        assert!(!window.contains(ts("2024-12-31T23:59:59")));
    }

    #[test]
    fn test_day_window_containing() {
        let window = DayWindow::containing(ts("2025-01-01T15:30:00"));
        assert_eq!(window, DayWindow::of(NaiveDate::from_ymd_opt(2025, 1, 1).unwrap()));
    }
}
