//! Assignment reconciliation: the mutable working set and its update rules
//!
//! Three sources mutate the same logical collection: full snapshot fetches,
//! single-record push events, and optimistic local edits. The reconciler
//! applies each synchronously while holding two invariants after every
//! operation: the in-progress assignment is never duplicated inside
//! `pending`, and no two pending records share an id. Snapshots carry a
//! monotonic sequence number so a stale fetch arriving late can never
//! clobber a newer one.

use reparto_types::{DeliveryError, DeliveryId, DeliveryResult, DeliveryRecord, DeliveryStatus};
use serde::{Deserialize, Serialize};

/// The courier's current assignment set
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct WorkingSet {
    /// Assignments waiting to be worked, in upstream order
    pub pending: Vec<DeliveryRecord>,
    /// The single assignment being actively worked, if any
    pub in_progress: Option<DeliveryRecord>,
}

impl WorkingSet {
    /// Total assignments held, counting the in-progress one
    pub fn active_count(&self) -> usize {
        self.pending.len() + usize::from(self.in_progress.is_some())
    }

    /// Look up a record by id across both buckets
    pub fn find(&self, id: &DeliveryId) -> Option<&DeliveryRecord> {
        self.in_progress
            .iter()
            .chain(self.pending.iter())
            .find(|r| &r.id == id)
    }

    /// Check the working set invariants: the in-progress record never
    /// appears in `pending`, pending ids are unique, and the only record
    /// carrying the in-progress status is `in_progress` itself.
    pub fn invariants_hold(&self) -> bool {
        if let Some(active) = &self.in_progress {
            if self.pending.iter().any(|r| r.id == active.id) {
                return false;
            }
            if active.status != DeliveryStatus::InProgress {
                return false;
            }
        }
        for (i, record) in self.pending.iter().enumerate() {
            if self.pending[i + 1..].iter().any(|r| r.id == record.id) {
                return false;
            }
        }
        true
    }
}

/// Result of applying a snapshot
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SnapshotOutcome {
    /// The snapshot replaced the working set
    Applied,
    /// The snapshot was older than the last applied one and was discarded
    Stale,
}

/// Result of an optimistic local edit
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EditOutcome {
    /// The edit was applied in place
    Applied,
    /// The edit was applied, and the caller must refresh from the backend
    /// because the record's destination bucket is not knowable client-side
    RefreshRequired,
}

/// Mutable store applying snapshots, push events, and local edits
#[derive(Debug, Default)]
pub struct AssignmentReconciler {
    working: WorkingSet,
    last_snapshot_seq: u64,
}

impl AssignmentReconciler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot copy of the current working set
    pub fn working_set(&self) -> WorkingSet {
        self.working.clone()
    }

    /// Sequence number of the last applied snapshot
    pub fn last_snapshot_seq(&self) -> u64 {
        self.last_snapshot_seq
    }

    /// Replace the working set with a full backend snapshot.
    ///
    /// A snapshot whose sequence number does not exceed the last applied one
    /// is discarded: it was fetched before a newer read completed. Within an
    /// applied snapshot, the first in-progress record (upstream order) is
    /// extracted as the active job; any further in-progress records stay in
    /// `pending` as sent, since the engine records upstream state rather
    /// than repairing inconsistencies it cannot verify.
    pub fn apply_snapshot(
        &mut self,
        seq: u64,
        records: Vec<DeliveryRecord>,
    ) -> SnapshotOutcome {
        if seq <= self.last_snapshot_seq {
            tracing::warn!(
                received = seq,
                last_applied = self.last_snapshot_seq,
                "Discarding stale snapshot"
            );
            return SnapshotOutcome::Stale;
        }
        self.last_snapshot_seq = seq;

        // A lone in-progress job must become the active job, not render as
        // an empty list plus a stray pending entry.
        if records.len() == 1 && records[0].status == DeliveryStatus::InProgress {
            self.working.in_progress = records.into_iter().next();
            self.working.pending = Vec::new();
        } else if let Some(pos) = records
            .iter()
            .position(|r| r.status == DeliveryStatus::InProgress)
        {
            let mut pending = records;
            let active = pending.remove(pos);
            self.working.in_progress = Some(active);
            self.working.pending = pending;
        } else {
            self.working.in_progress = None;
            self.working.pending = records;
        }

        tracing::info!(
            seq,
            pending = self.working.pending.len(),
            has_active = self.working.in_progress.is_some(),
            "Applied assignment snapshot"
        );
        SnapshotOutcome::Applied
    }

    /// Apply a single-record push update.
    ///
    /// An in-progress update becomes the new active job, replacing any prior
    /// one. An update matching the current active job's id but carrying a
    /// different status means the job left the in-progress state; the active
    /// slot is cleared and the next snapshot decides where the record lands.
    /// Anything else replaces the matching pending record by id, or is a
    /// no-op when the id is absent.
    pub fn apply_push_update(&mut self, record: DeliveryRecord) {
        if record.status == DeliveryStatus::InProgress {
            let incoming = record.id.clone();
            self.working.pending.retain(|r| r.id != incoming);
            if let Some(prior) = self.working.in_progress.replace(record) {
                if prior.id != incoming {
                    tracing::debug!(replaced = %prior.id, "Push update replaced the active job");
                }
            }
            return;
        }

        if self
            .working
            .in_progress
            .as_ref()
            .is_some_and(|active| active.id == record.id)
        {
            tracing::info!(id = %record.id, status = %record.status, "Active job left in-progress state");
            self.working.in_progress = None;
            return;
        }

        if let Some(existing) = self.working.pending.iter_mut().find(|r| r.id == record.id) {
            *existing = record;
        } else {
            tracing::debug!(id = %record.id, "Push update for unknown assignment ignored");
        }
    }

    /// Apply a pushed new assignment.
    ///
    /// Repeated delivery of the same assignment event upserts by id instead
    /// of appending a twin, so event replay cannot duplicate entries. A push
    /// matching the current active job is ignored; the active copy stays
    /// authoritative until the next snapshot.
    pub fn apply_push_assignment(&mut self, record: DeliveryRecord) {
        if record.status == DeliveryStatus::InProgress {
            // A pushed job already in progress takes the active slot; it
            // must never sit in `pending` next to another active job.
            self.apply_push_update(record);
            return;
        }
        if self
            .working
            .in_progress
            .as_ref()
            .is_some_and(|active| active.id == record.id)
        {
            tracing::debug!(id = %record.id, "Assignment push matches active job, ignoring");
            return;
        }
        if let Some(existing) = self.working.pending.iter_mut().find(|r| r.id == record.id) {
            tracing::debug!(id = %record.id, "Assignment push replayed, upserting");
            *existing = record;
        } else {
            self.working.pending.push(record);
        }
    }

    /// Apply a batched group assignment push
    pub fn apply_push_group_assignment(&mut self, records: Vec<DeliveryRecord>) {
        for record in records {
            self.apply_push_assignment(record);
        }
    }

    /// Apply an optimistic local status edit, validated against the
    /// transition table.
    ///
    /// Promoting a pending record to in-progress replaces any prior active
    /// job (last writer wins; the prior copy is dropped and restored by the
    /// next snapshot). Editing the active job away from in-progress clears
    /// the slot and asks the caller to refresh, since business rules on the
    /// backend decide where the job lands next.
    pub fn apply_local_status_edit(
        &mut self,
        id: &DeliveryId,
        new_status: DeliveryStatus,
    ) -> DeliveryResult<EditOutcome> {
        let current = self
            .working
            .find(id)
            .map(|r| r.status)
            .ok_or_else(|| DeliveryError::UnknownAssignment(id.clone()))?;

        if !current.can_transition_to(new_status) {
            return Err(DeliveryError::InvalidTransition {
                from: current,
                to: new_status,
            });
        }

        if self
            .working
            .in_progress
            .as_ref()
            .is_some_and(|active| &active.id == id)
        {
            // new_status != InProgress here: the table has no self-edge.
            tracing::info!(id = %id, to = %new_status, "Active job edited away from in-progress, refresh required");
            self.working.in_progress = None;
            return Ok(EditOutcome::RefreshRequired);
        }

        if new_status == DeliveryStatus::InProgress {
            let pos = self
                .working
                .pending
                .iter()
                .position(|r| &r.id == id)
                .ok_or_else(|| DeliveryError::UnknownAssignment(id.clone()))?;
            let mut record = self.working.pending.remove(pos);
            record.status = DeliveryStatus::InProgress;
            if let Some(prior) = self.working.in_progress.replace(record) {
                tracing::warn!(replaced = %prior.id, promoted = %id, "Local edit replaced the active job");
            }
            return Ok(EditOutcome::Applied);
        }

        if let Some(record) = self.working.pending.iter_mut().find(|r| &r.id == id) {
            record.status = new_status;
        }
        Ok(EditOutcome::Applied)
    }
}
