//! Daily progress counters and their reconciliation arithmetic
//!
//! The counters are a throughput indicator, not an audit log: the sync
//! heuristic cannot tell a completed job from a cancelled one, and newly
//! added jobs never decrement anything. Both simplifications are intended.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Day-scoped counters, persisted across restarts
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyProgress {
    /// Calendar day these counters belong to
    pub date: NaiveDate,
    /// Total jobs seen today, monotonically non-decreasing within the day
    pub total: u32,
    /// Jobs that left the active set today, non-decreasing
    pub completed: u32,
}

impl DailyProgress {
    /// Fresh counters for a day
    pub fn new(date: NaiveDate) -> Self {
        Self {
            date,
            total: 0,
            completed: 0,
        }
    }

    /// Jobs still outstanding
    pub fn pending(&self) -> u32 {
        self.total.saturating_sub(self.completed)
    }
}

/// Reconcile the persisted counters against a fresh total observation.
///
/// `new_total` never decreases within a day, so jobs dropping out of the
/// active view cannot erase historical progress. A positive drop in the
/// total means jobs left the active set and counts toward `completed`;
/// a growing total leaves `completed` untouched.
pub fn sync(current_total: u32, previous_total: u32, previous_completed: u32) -> (u32, u32) {
    let new_total = current_total.max(previous_total);
    let delta = previous_total.saturating_sub(current_total);
    let new_completed = previous_completed + delta;
    (new_total, new_completed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_jobs_leaving_count_as_completed() {
        let (total, completed) = sync(3, 5, 2);
        assert_eq!(total, 5);
        assert_eq!(completed, 4);
    }

    #[test]
    fn test_new_jobs_grow_total_only() {
        let (total, completed) = sync(7, 5, 2);
        assert_eq!(total, 7);
        assert_eq!(completed, 2);
    }

    #[test]
    fn test_steady_state_is_a_noop() {
        let (total, completed) = sync(5, 5, 2);
        assert_eq!(total, 5);
        assert_eq!(completed, 2);
    }

    #[test]
    fn test_pending_derivation() {
        let progress = DailyProgress {
            date: NaiveDate::from_ymd_opt(2026, 8, 30).unwrap(),
            total: 9,
            completed: 4,
        };
        assert_eq!(progress.pending(), 5);
    }
}
