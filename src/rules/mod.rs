//! Rule engine for circadian insights
//!
//! [`evaluator`] holds the fixed rule catalog and the pure evaluation
//! function; [`clock`] holds the wall-clock arithmetic the rules share.

pub mod clock;
pub mod evaluator;

pub use evaluator::{
    evaluate, InsightDraft, RuleContext, DINNER_TO_SLEEP_GAP_MINUTES, LATE_BREAKFAST_HOUR,
    LATE_EVENING_LIGHT_HOUR, LATE_MORNING_LIGHT_HOUR, LONG_FAST_HOURS, SLEEP_HISTORY_LIMIT,
};
