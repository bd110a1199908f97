//! Daily progress tracking over working set observations
//!
//! The tracker observes the active assignment count after every store
//! mutation and folds it into the day's persisted counters. The date is a
//! parameter rather than read from the clock, so rollover stays
//! deterministic under test and a host app may choose local midnight
//! instead of UTC.

use crate::persistence::ProgressStore;
use chrono::NaiveDate;
use reparto_types::{progress, DailyProgress, DeliveryResult};

/// Day-scoped progress counter fed by the store
pub struct ProgressTracker {
    store: Box<dyn ProgressStore>,
    current: DailyProgress,
}

impl ProgressTracker {
    /// Load the tracker, resuming today's counters if they were persisted.
    /// Counters from an earlier day are discarded (implicit rollover).
    pub fn load(store: Box<dyn ProgressStore>, today: NaiveDate) -> DeliveryResult<Self> {
        let current = store
            .load()?
            .filter(|p| p.date == today)
            .unwrap_or_else(|| DailyProgress::new(today));
        Ok(Self { store, current })
    }

    /// Current counters
    pub fn current(&self) -> &DailyProgress {
        &self.current
    }

    /// Fold a fresh active-count observation into the day's counters and
    /// persist the result.
    ///
    /// The observation total compared against the stored one is the active
    /// count plus what already completed today, so a repeated observation of
    /// the same working set is a no-op instead of double-counting.
    pub fn observe(&mut self, today: NaiveDate, active_count: u32) -> DeliveryResult<DailyProgress> {
        if today != self.current.date {
            tracing::info!(from = %self.current.date, to = %today, "Progress day rollover");
            self.current = DailyProgress::new(today);
        }

        let observed_total = active_count + self.current.completed;
        let (total, completed) =
            progress::sync(observed_total, self.current.total, self.current.completed);
        self.current.total = total;
        self.current.completed = completed;

        self.store.save(&self.current)?;
        Ok(self.current.clone())
    }
}
