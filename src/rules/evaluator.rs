//! Rule Evaluator
//!
//! Decides which insights, if any, a newly logged event produces. Pure and
//! synchronous: every input (the event, the day's events, the recent sleep
//! history, the current time) is supplied by the caller before invocation,
//! and the result is a list of creation requests for the caller to persist.
//! A rule either fires or it doesn't; evaluation itself never fails.
//!
//! The evaluator does not check whether an equivalent insight was already
//! emitted earlier the same day. Two qualifying morning-light events each
//! produce their own insight. Any deduplication belongs at the persistence
//! boundary, keyed by user, day and kind.

use crate::rules::clock::{mean_clock_minutes, minutes_since_midnight};
use crate::store::types::{CircadianEvent, EventDetails, InsightKind, LightPhase, MealType};
use chrono::{Duration, NaiveDateTime, Timelike};

/// Hours after a fast starts before the long-fast reminder becomes relevant
pub const LONG_FAST_HOURS: i64 = 16;

/// Breakfast at or after this local hour counts as late
pub const LATE_BREAKFAST_HOUR: u32 = 10;

/// Morning light at or after this local hour counts as late
pub const LATE_MORNING_LIGHT_HOUR: u32 = 9;

/// Evening light at or after this local hour counts as late
pub const LATE_EVENING_LIGHT_HOUR: u32 = 20;

/// Dinner closer than this many minutes to the average bedtime counts as late
pub const DINNER_TO_SLEEP_GAP_MINUTES: f64 = 120.0;

/// How many recent sleep_start events the late-dinner rule considers
pub const SLEEP_HISTORY_LIMIT: usize = 7;

/// Everything the evaluator is allowed to look at
///
/// `todays_events` is part of the evaluator's input contract even though no
/// rule in the current catalog consults it.
#[derive(Debug, Clone, Copy)]
pub struct RuleContext<'a> {
    /// The event that was just inserted
    pub new_event: &'a CircadianEvent,
    /// All events for the same user on the same calendar day
    pub todays_events: &'a [CircadianEvent],
    /// Up to [`SLEEP_HISTORY_LIMIT`] most recent sleep_start events, newest first
    pub recent_sleep_starts: &'a [CircadianEvent],
    /// Current local time, used to schedule immediately-relevant insights
    pub now: NaiveDateTime,
}

/// A request to create one insight
///
/// The id, owner and unread flag are assigned by the persistence boundary.
#[derive(Debug, Clone, PartialEq)]
pub struct InsightDraft {
    pub kind: InsightKind,
    pub message: String,
    pub scheduled_for: NaiveDateTime,
}

impl InsightDraft {
    fn of(kind: InsightKind, scheduled_for: NaiveDateTime) -> Self {
        Self {
            kind,
            message: kind.message().to_string(),
            scheduled_for,
        }
    }
}

/// Evaluate the rule catalog against a newly inserted event
///
/// Deterministic: identical contexts yield identical drafts.
pub fn evaluate(ctx: &RuleContext<'_>) -> Vec<InsightDraft> {
    let Some(details) = EventDetails::of(ctx.new_event) else {
        // Malformed or not-yet-understood metadata: no rule matches
        return Vec::new();
    };

    let mut drafts = Vec::new();

    match details {
        EventDetails::FastStart => drafts.push(long_fast(ctx.new_event.timestamp)),
        EventDetails::Meal(MealType::Breakfast) => drafts.extend(late_breakfast(ctx)),
        EventDetails::Meal(MealType::Dinner) => drafts.extend(late_dinner(ctx)),
        EventDetails::Meal(_) => {}
        EventDetails::LightExposure(LightPhase::Morning) => {
            drafts.extend(late_morning_light(ctx))
        }
        EventDetails::LightExposure(LightPhase::Evening) => {
            drafts.extend(late_evening_light(ctx))
        }
        // No rules for these event types; deliberate product scope
        EventDetails::FastEnd
        | EventDetails::SleepStart
        | EventDetails::SleepEnd
        | EventDetails::Activity => {}
    }

    drafts
}

/// Every fast start schedules a break-fast reminder 16 hours out
fn long_fast(fast_started_at: NaiveDateTime) -> InsightDraft {
    InsightDraft::of(
        InsightKind::LongFast,
        fast_started_at + Duration::hours(LONG_FAST_HOURS),
    )
}

fn late_breakfast(ctx: &RuleContext<'_>) -> Option<InsightDraft> {
    if ctx.new_event.timestamp.hour() >= LATE_BREAKFAST_HOUR {
        Some(InsightDraft::of(InsightKind::LateBreakfast, ctx.now))
    } else {
        None
    }
}

/// Fires when dinner lands closer than two hours to the average bedtime
///
/// Bedtime is the arithmetic mean of wall-clock minutes across the supplied
/// sleep history; with no history the rule cannot fire.
fn late_dinner(ctx: &RuleContext<'_>) -> Option<InsightDraft> {
    let bedtime =
        mean_clock_minutes(ctx.recent_sleep_starts.iter().map(|event| &event.timestamp))?;
    let dinner = minutes_since_midnight(ctx.new_event.timestamp) as f64;

    if bedtime - dinner < DINNER_TO_SLEEP_GAP_MINUTES {
        Some(InsightDraft::of(InsightKind::LateDinner, ctx.now))
    } else {
        None
    }
}

fn late_morning_light(ctx: &RuleContext<'_>) -> Option<InsightDraft> {
    if ctx.new_event.timestamp.hour() >= LATE_MORNING_LIGHT_HOUR {
        Some(InsightDraft::of(InsightKind::LateMorningLight, ctx.now))
    } else {
        None
    }
}

fn late_evening_light(ctx: &RuleContext<'_>) -> Option<InsightDraft> {
    if ctx.new_event.timestamp.hour() >= LATE_EVENING_LIGHT_HOUR {
        Some(InsightDraft::of(InsightKind::LateEveningLight, ctx.now))
    } else {
        None
    }
}
