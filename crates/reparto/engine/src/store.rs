//! Observable assignment store
//!
//! Owns the reconciler behind a single-writer lock and publishes a snapshot
//! copy of the working set on every mutation. Readers subscribe to the
//! broadcast feed or take one-off snapshots; nothing outside this module
//! mutates the working set directly.
//!
//! The store also issues monotonic snapshot sequence numbers (taken before
//! a fetch starts, checked on apply) and exposes a refresh signal the I/O
//! layer consumes: reorder events and edits that move the active job out of
//! the in-progress state both route through it, because in those cases only
//! the backend knows the true ordering or destination.

use crate::config::StoreConfig;
use crate::progress::ProgressTracker;
use crate::reconciler::{AssignmentReconciler, EditOutcome, SnapshotOutcome, WorkingSet};
use reparto_types::{
    adapt, try_adapt_one, ChannelEventKind, DeliveryId, DeliveryRecord, DeliveryResult,
    DeliveryStatus, EventEnvelope,
};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::{broadcast, mpsc};

/// What caused a store update
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UpdateCause {
    Snapshot,
    PushUpdate,
    PushAssignment,
    LocalEdit,
}

/// A change notification carrying a snapshot copy of the working set
#[derive(Clone, Debug)]
pub struct StoreUpdate {
    pub cause: UpdateCause,
    pub working: WorkingSet,
}

/// Publish–subscribe store over the assignment reconciler
pub struct AssignmentStore {
    reconciler: Mutex<AssignmentReconciler>,
    progress: Mutex<Option<ProgressTracker>>,
    change_tx: broadcast::Sender<StoreUpdate>,
    refresh_tx: mpsc::Sender<()>,
    snapshot_seq: AtomicU64,
}

impl AssignmentStore {
    /// Create a store. The returned receiver carries refresh signals for
    /// the I/O layer: each signal means "fetch an authoritative snapshot".
    pub fn new(config: StoreConfig) -> (Arc<Self>, mpsc::Receiver<()>) {
        Self::with_progress(config, None)
    }

    /// Create a store that feeds a progress tracker after every mutation
    pub fn with_progress(
        config: StoreConfig,
        progress: Option<ProgressTracker>,
    ) -> (Arc<Self>, mpsc::Receiver<()>) {
        let (change_tx, _) = broadcast::channel(config.event_capacity);
        let (refresh_tx, refresh_rx) = mpsc::channel(config.refresh_capacity);

        let store = Arc::new(Self {
            reconciler: Mutex::new(AssignmentReconciler::new()),
            progress: Mutex::new(progress),
            change_tx,
            refresh_tx,
            snapshot_seq: AtomicU64::new(0),
        });

        (store, refresh_rx)
    }

    /// Subscribe to change notifications
    pub fn subscribe(&self) -> broadcast::Receiver<StoreUpdate> {
        self.change_tx.subscribe()
    }

    /// Snapshot copy of the current working set
    pub fn working_set(&self) -> WorkingSet {
        self.lock_reconciler().working_set()
    }

    /// Issue the sequence number for a snapshot fetch about to start.
    /// Call before the fetch; pass the number to [`apply_snapshot`] with
    /// the result so a late, stale response can be recognized.
    ///
    /// [`apply_snapshot`]: AssignmentStore::apply_snapshot
    pub fn begin_snapshot(&self) -> u64 {
        self.snapshot_seq.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Apply a fetched snapshot under its sequence number
    pub fn apply_snapshot(&self, seq: u64, records: Vec<DeliveryRecord>) -> SnapshotOutcome {
        let outcome = self.lock_reconciler().apply_snapshot(seq, records);
        if outcome == SnapshotOutcome::Applied {
            self.notify(UpdateCause::Snapshot);
        }
        outcome
    }

    /// Apply an optimistic local status edit. When the edit moves the
    /// active job out of the in-progress state, a refresh is requested
    /// because the record's destination is a backend decision.
    pub fn local_status_edit(
        &self,
        id: &DeliveryId,
        new_status: DeliveryStatus,
    ) -> DeliveryResult<()> {
        let outcome = self.lock_reconciler().apply_local_status_edit(id, new_status)?;
        self.notify(UpdateCause::LocalEdit);
        if outcome == EditOutcome::RefreshRequired {
            self.request_refresh();
        }
        Ok(())
    }

    /// Route a named channel event to the matching reconciler operation.
    /// Events must be handed in in receipt order; each is applied to
    /// completion before this method returns.
    pub fn handle_event(&self, envelope: EventEnvelope) {
        match envelope.kind {
            ChannelEventKind::DriverAssigned => {
                let mut records = match &envelope.data {
                    Some(payload) => adapt(payload.as_slice()),
                    None => {
                        tracing::warn!("Assignment event carried no payload");
                        return;
                    }
                };
                if records.is_empty() {
                    return;
                }
                {
                    let mut reconciler = self.lock_reconciler();
                    if records.len() == 1 {
                        reconciler.apply_push_assignment(records.remove(0));
                    } else {
                        reconciler.apply_push_group_assignment(records);
                    }
                }
                self.notify(UpdateCause::PushAssignment);
            }
            ChannelEventKind::DeliveryAssignmentUpdated
            | ChannelEventKind::DeliveryUpdated
            | ChannelEventKind::DeliveryStatusChanged => {
                let raw = match envelope.data.as_ref().and_then(|p| p.as_slice().first()) {
                    Some(raw) => raw,
                    None => {
                        tracing::warn!(event = %envelope.kind, "Update event carried no payload");
                        return;
                    }
                };
                match try_adapt_one(raw) {
                    Ok(record) => {
                        self.lock_reconciler().apply_push_update(record);
                        self.notify(UpdateCause::PushUpdate);
                    }
                    Err(e) => {
                        tracing::warn!(error = %e, "Dropping unmappable update event");
                    }
                }
            }
            ChannelEventKind::DeliveryReordered => {
                // Ordering arrives separately from content; never trust an
                // embedded payload, refetch the authoritative snapshot.
                tracing::debug!("Reorder event received, requesting refresh");
                self.request_refresh();
            }
        }
    }

    /// Ask the I/O layer for an authoritative snapshot fetch. Signals
    /// beyond the queue capacity coalesce into those already pending.
    pub fn request_refresh(&self) {
        match self.refresh_tx.try_send(()) {
            Ok(()) => {}
            Err(mpsc::error::TrySendError::Full(())) => {
                tracing::debug!("Refresh already queued, coalescing");
            }
            Err(mpsc::error::TrySendError::Closed(())) => {
                tracing::warn!("Refresh channel closed, dropping request");
            }
        }
    }

    fn lock_reconciler(&self) -> std::sync::MutexGuard<'_, AssignmentReconciler> {
        self.reconciler.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Broadcast the post-mutation working set and feed the progress
    /// tracker with the active count.
    fn notify(&self, cause: UpdateCause) {
        let working = self.working_set();

        {
            let mut progress = self
                .progress
                .lock()
                .unwrap_or_else(PoisonError::into_inner);
            if let Some(tracker) = progress.as_mut() {
                let today = chrono::Utc::now().date_naive();
                if let Err(e) = tracker.observe(today, working.active_count() as u32) {
                    tracing::warn!(error = %e, "Progress persistence failed");
                }
            }
        }

        // No subscribers is fine; the store does not require observers.
        let _ = self.change_tx.send(StoreUpdate { cause, working });
    }
}
