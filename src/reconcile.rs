//! Remaining-time reconciliation across paused and resumed visits.
//!
//! Remaining time is bounded twice: by the unused part of the nominal
//! duration and by the wall-clock distance to the end of the window.

use chrono::{DateTime, Utc};

use crate::model::{parse_instant, AssessmentAssignment, AssignmentStatus};

#[derive(Debug, Clone, Copy)]
pub struct ReconcileInput<'a> {
    pub duration_secs: i64,
    pub window_end: DateTime<Utc>,
    pub time_spent_secs: i64,
    pub status: AssignmentStatus,
    pub actual_start_time: Option<&'a str>,
    pub now: DateTime<Utc>,
}

impl<'a> ReconcileInput<'a> {
    pub fn for_assignment(assignment: &'a AssessmentAssignment, now: DateTime<Utc>) -> Self {
        Self {
            duration_secs: assignment.duration,
            window_end: assignment.end_time,
            time_spent_secs: assignment.time_spent_seconds,
            status: assignment.status,
            actual_start_time: assignment.actual_start_time.as_deref(),
            now,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Reconciled {
    pub remaining_secs: i64,
    pub elapsed_secs: i64,
    /// The window end, not the duration budget, set the remaining time.
    pub limited_by_window: bool,
    /// `actualStartTime` was needed but missing or malformed.
    pub start_time_fallback: bool,
}

pub fn reconcile(input: &ReconcileInput<'_>) -> Reconciled {
    let until_window_end = (input.window_end - input.now).num_seconds().max(0);
    let mut start_time_fallback = false;

    let elapsed = match input.status {
        AssignmentStatus::Started => match input.actual_start_time.and_then(parse_instant) {
            Some(started) => {
                let segment = (input.now - started).num_seconds().max(0);
                input.time_spent_secs.checked_add(segment)
            }
            None => {
                start_time_fallback = true;
                Some(input.time_spent_secs)
            }
        },
        _ => Some(input.time_spent_secs),
    };

    let Some(elapsed) = elapsed else {
        tracing::warn!("elapsed time overflowed, using full duration");
        return Reconciled {
            remaining_secs: input.duration_secs.min(until_window_end).max(0),
            elapsed_secs: input.time_spent_secs,
            limited_by_window: until_window_end < input.duration_secs,
            start_time_fallback,
        };
    };

    let from_duration = input.duration_secs.saturating_sub(elapsed).max(0);
    let remaining = from_duration.min(until_window_end).max(0);

    if start_time_fallback {
        tracing::warn!(
            time_spent = input.time_spent_secs,
            "actual start time unusable, reconciling from stored time only"
        );
    }

    Reconciled {
        remaining_secs: remaining,
        elapsed_secs: elapsed,
        limited_by_window: until_window_end < from_duration,
        start_time_fallback,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn t0() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2025-03-01T09:00:00Z")
            .unwrap()
            .with_timezone(&Utc)
    }

    fn input(status: AssignmentStatus, spent: i64, now_offset: i64) -> ReconcileInput<'static> {
        ReconcileInput {
            duration_secs: 1800,
            window_end: t0() + Duration::seconds(3600),
            time_spent_secs: spent,
            status,
            actual_start_time: None,
            now: t0() + Duration::seconds(now_offset),
        }
    }

    #[test]
    fn fresh_start_gets_full_duration() {
        let r = reconcile(&input(AssignmentStatus::Assigned, 0, 0));
        assert_eq!(r.remaining_secs, 1800);
        assert!(!r.limited_by_window);
    }

    #[test]
    fn paused_uses_stored_time_only() {
        let r = reconcile(&input(AssignmentStatus::Paused, 600, 1200));
        assert_eq!(r.remaining_secs, 1200);
        assert_eq!(r.elapsed_secs, 600);
    }

    #[test]
    fn started_adds_running_segment() {
        let start = (t0() + Duration::seconds(1000)).to_rfc3339();
        let mut i = input(AssignmentStatus::Started, 300, 1400);
        i.actual_start_time = Some(&start);
        let r = reconcile(&i);
        assert_eq!(r.elapsed_secs, 700);
        assert_eq!(r.remaining_secs, 1100);
        assert!(!r.start_time_fallback);
    }

    #[test]
    fn window_end_bounds_remaining() {
        let mut i = input(AssignmentStatus::Assigned, 0, 3540);
        i.duration_secs = 3600;
        let r = reconcile(&i);
        assert_eq!(r.remaining_secs, 60);
        assert!(r.limited_by_window);
    }

    #[test]
    fn malformed_start_time_falls_back() {
        let mut i = input(AssignmentStatus::Started, 500, 100);
        i.actual_start_time = Some("yesterday-ish");
        let r = reconcile(&i);
        assert!(r.start_time_fallback);
        assert_eq!(r.remaining_secs, 1300);
    }

    #[test]
    fn never_negative() {
        let r = reconcile(&input(AssignmentStatus::Paused, 5000, 100));
        assert_eq!(r.remaining_secs, 0);

        let r = reconcile(&input(AssignmentStatus::Paused, 0, 7200));
        assert_eq!(r.remaining_secs, 0);

        let mut i = input(AssignmentStatus::Assigned, 0, 0);
        i.duration_secs = -30;
        assert_eq!(reconcile(&i).remaining_secs, 0);
    }

    #[test]
    fn future_start_time_does_not_add_time() {
        let start = (t0() + Duration::seconds(900)).to_rfc3339();
        let mut i = input(AssignmentStatus::Started, 200, 600);
        i.actual_start_time = Some(&start);
        assert_eq!(reconcile(&i).remaining_secs, 1600);
    }

    #[test]
    fn overflow_uses_duration_fallback() {
        let start = (t0() - Duration::seconds(10)).to_rfc3339();
        let mut i = input(AssignmentStatus::Started, i64::MAX, 0);
        i.actual_start_time = Some(&start);
        assert_eq!(reconcile(&i).remaining_secs, 1800);
    }

    #[test]
    fn formula_holds_inside_window() {
        for (duration, spent, now_offset) in [(1800, 0, 0), (1800, 1700, 3000), (600, 0, 3500), (7200, 100, 10)] {
            let mut i = input(AssignmentStatus::Paused, spent, now_offset);
            i.duration_secs = duration;
            let expected = (duration - spent).max(0).min((3600 - now_offset).max(0));
            assert_eq!(reconcile(&i).remaining_secs, expected);
        }
    }
}
