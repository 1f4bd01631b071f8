//! Clock-time helpers for the rule evaluator
//!
//! Small pure functions over naive local timestamps. The late-dinner rule
//! compares wall-clock positions within a day, so everything here works in
//! minutes since local midnight.

use chrono::{NaiveDateTime, Timelike};

/// Minutes since local midnight for a timestamp (0..=1439)
pub fn minutes_since_midnight(ts: NaiveDateTime) -> u32 {
    ts.hour() * 60 + ts.minute()
}

/// Arithmetic mean of wall-clock minutes across timestamps
///
/// Returns `None` for an empty input. This is a literal mean of
/// `hour * 60 + minute` values with no wrap-around handling: sleep times
/// straddling midnight skew the result (23:50 and 00:10 average to midday).
pub fn mean_clock_minutes<'a>(
    timestamps: impl IntoIterator<Item = &'a NaiveDateTime>,
) -> Option<f64> {
    let minutes: Vec<f64> = timestamps
        .into_iter()
        .map(|ts| minutes_since_midnight(*ts) as f64)
        .collect();

    if minutes.is_empty() {
        return None;
    }

    Some(minutes.iter().sum::<f64>() / minutes.len() as f64)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ts(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S").unwrap()
    }

    #[test]
    fn test_minutes_since_midnight() {
        assert_eq!(minutes_since_midnight(ts("2025-01-01T00:00:00")), 0);
        assert_eq!(minutes_since_midnight(ts("2025-01-01T09:30:00")), 570);
        assert_eq!(minutes_since_midnight(ts("2025-01-01T23:59:59")), 1439);
        // Seconds are ignored
        assert_eq!(minutes_since_midnight(ts("2025-01-01T10:00:59")), 600);
    }

    #[test]
    fn test_mean_clock_minutes_empty() {
        let empty: Vec<NaiveDateTime> = Vec::new();
        assert_eq!(mean_clock_minutes(&empty), None);
    }

    #[test]
    fn test_mean_clock_minutes() {
        let stamps = vec![
            ts("2025-01-01T23:00:00"),
            ts("2025-01-02T23:10:00"),
            ts("2025-01-03T22:50:00"),
        ];
        let mean = mean_clock_minutes(&stamps).unwrap();
        // (1380 + 1390 + 1370) / 3
        assert!((mean - 1380.0).abs() < 1e-9);
    }

    #[test]
    fn test_mean_is_not_circular() {
        // Known approximation: times straddling midnight average to midday
        let stamps = vec![ts("2025-01-01T23:50:00"), ts("2025-01-02T00:10:00")];
        let mean = mean_clock_minutes(&stamps).unwrap();
        assert!((mean - 720.0).abs() < 1e-9);
    }
}
