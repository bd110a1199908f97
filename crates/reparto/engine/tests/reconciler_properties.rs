//! Property tests: the single-active-delivery invariant survives arbitrary
//! interleavings of push events and optimistic local edits.

use proptest::prelude::*;
use reparto_engine::reconciler::{AssignmentReconciler, SnapshotOutcome};
use reparto_types::{DeliveryId, DeliveryRecord, DeliveryStatus, LegType};

// ---------------------------------------------------------------------------
// Helpers / Strategies
// ---------------------------------------------------------------------------

#[derive(Clone, Debug)]
enum Op {
    PushAssignment(String, DeliveryStatus),
    PushUpdate(String, DeliveryStatus),
    LocalEdit(String, DeliveryStatus),
}

fn make_record(id: &str, status: DeliveryStatus) -> DeliveryRecord {
    DeliveryRecord::new(DeliveryId::new(id), LegType::Delivery, status)
}

/// Any recognized status, weighted so in-progress shows up often enough to
/// exercise the active-slot handling.
fn arb_status() -> impl Strategy<Value = DeliveryStatus> {
    prop_oneof![
        3 => Just(DeliveryStatus::InProgress),
        1 => Just(DeliveryStatus::Pending),
        1 => Just(DeliveryStatus::Assigned),
        1 => Just(DeliveryStatus::Scheduled),
        1 => Just(DeliveryStatus::Delivered),
        1 => Just(DeliveryStatus::Completed),
        1 => Just(DeliveryStatus::Failed),
        1 => Just(DeliveryStatus::Cancelled),
        1 => Just(DeliveryStatus::Returned),
        1 => Just(DeliveryStatus::OnHold),
    ]
}

/// A small id pool so operations collide on the same records.
fn arb_id() -> impl Strategy<Value = String> {
    (0u8..6).prop_map(|n| format!("job-{}", n))
}

fn arb_op() -> impl Strategy<Value = Op> {
    prop_oneof![
        (arb_id(), arb_status()).prop_map(|(id, s)| Op::PushAssignment(id, s)),
        (arb_id(), arb_status()).prop_map(|(id, s)| Op::PushUpdate(id, s)),
        (arb_id(), arb_status()).prop_map(|(id, s)| Op::LocalEdit(id, s)),
    ]
}

fn apply(reconciler: &mut AssignmentReconciler, op: Op) {
    match op {
        Op::PushAssignment(id, status) => {
            reconciler.apply_push_assignment(make_record(&id, status));
        }
        Op::PushUpdate(id, status) => {
            reconciler.apply_push_update(make_record(&id, status));
        }
        Op::LocalEdit(id, status) => {
            // Invalid transitions and unknown ids are rejected; rejection
            // must leave the working set untouched, which the invariant
            // checks below confirm.
            let _ = reconciler.apply_local_status_edit(&DeliveryId::new(&id), status);
        }
    }
}

// ---------------------------------------------------------------------------
// Property Tests
// ---------------------------------------------------------------------------

proptest! {
    /// After any operation sequence, at most one record across
    /// pending + in_progress carries the in-progress status, and that
    /// record is exactly the in_progress slot.
    #[test]
    fn singleton_invariant_holds(ops in prop::collection::vec(arb_op(), 1..80)) {
        let mut reconciler = AssignmentReconciler::new();

        for op in ops {
            apply(&mut reconciler, op);

            let working = reconciler.working_set();
            prop_assert!(working.invariants_hold());
            prop_assert!(
                working
                    .pending
                    .iter()
                    .all(|r| r.status != DeliveryStatus::InProgress),
                "pending holds an in-progress record: {:?}",
                working.pending
            );
        }
    }

    /// Pending ids stay unique no matter how often assignment events replay.
    #[test]
    fn replayed_assignments_never_duplicate(
        ops in prop::collection::vec(
            (arb_id(), arb_status()).prop_map(|(id, s)| Op::PushAssignment(id, s)),
            1..40,
        ),
    ) {
        let mut reconciler = AssignmentReconciler::new();
        for op in ops {
            apply(&mut reconciler, op);
        }

        let working = reconciler.working_set();
        let mut ids: Vec<_> = working.pending.iter().map(|r| r.id.0.clone()).collect();
        let before = ids.len();
        ids.sort();
        ids.dedup();
        prop_assert_eq!(before, ids.len());
    }

    /// Applying the same snapshot twice (under increasing sequence numbers)
    /// yields an identical working set both times.
    #[test]
    fn snapshot_is_idempotent(
        statuses in prop::collection::vec(arb_status(), 0..10),
    ) {
        let records: Vec<_> = statuses
            .iter()
            .enumerate()
            .map(|(i, status)| make_record(&format!("job-{}", i), *status))
            .collect();

        let mut reconciler = AssignmentReconciler::new();
        reconciler.apply_snapshot(1, records.clone());
        let first = reconciler.working_set();

        reconciler.apply_snapshot(2, records);
        prop_assert_eq!(first, reconciler.working_set());
    }

    /// A stale snapshot never changes the working set.
    #[test]
    fn stale_snapshot_never_mutates(
        fresh in prop::collection::vec(arb_status(), 0..8),
        stale in prop::collection::vec(arb_status(), 0..8),
    ) {
        let fresh_records: Vec<_> = fresh
            .iter()
            .enumerate()
            .map(|(i, status)| make_record(&format!("fresh-{}", i), *status))
            .collect();
        let stale_records: Vec<_> = stale
            .iter()
            .enumerate()
            .map(|(i, status)| make_record(&format!("stale-{}", i), *status))
            .collect();

        let mut reconciler = AssignmentReconciler::new();
        reconciler.apply_snapshot(7, fresh_records);
        let before = reconciler.working_set();

        let outcome = reconciler.apply_snapshot(3, stale_records);
        prop_assert_eq!(outcome, SnapshotOutcome::Stale);
        prop_assert_eq!(before, reconciler.working_set());
    }

    /// Push events after a snapshot keep every invariant intact.
    #[test]
    fn pushes_after_snapshot_hold_invariants(
        snapshot in prop::collection::vec(arb_status(), 0..8),
        ops in prop::collection::vec(arb_op(), 0..40),
    ) {
        let records: Vec<_> = snapshot
            .iter()
            .enumerate()
            .map(|(i, status)| make_record(&format!("job-{}", i), *status))
            .collect();

        let mut reconciler = AssignmentReconciler::new();
        reconciler.apply_snapshot(1, records);

        for op in ops {
            apply(&mut reconciler, op);
            prop_assert!(reconciler.working_set().invariants_hold());
        }
    }
}
