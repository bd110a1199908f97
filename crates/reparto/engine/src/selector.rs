//! Active job selection policy
//!
//! Answers two questions over a working set snapshot: may the courier start
//! a new job, and which job should be worked next. Shipment groups resolve
//! to their first unsettled pickup before the final delivery leg, which is
//! what enforces pickup-before-delivery ordering without an explicit
//! sequence number.

use crate::reconciler::WorkingSet;
use reparto_types::{group, DeliveryRecord, DeliveryStatus, JobItem};

/// Statuses that no longer occupy a processing slot.
///
/// Completed is terminal in the transition table but still occupies a slot
/// here: it marks backend close-out, not courier hand-off.
fn is_settled(status: DeliveryStatus) -> bool {
    matches!(
        status,
        DeliveryStatus::Delivered | DeliveryStatus::Cancelled | DeliveryStatus::Returned
    )
}

/// A new job may start only while no job is in progress
pub fn can_start_new_job(working: &WorkingSet) -> bool {
    working.in_progress.is_none()
}

/// The next job the courier should work, or None when everything is settled.
///
/// Walks the grouped pending view in order. Within a shipment group, every
/// unsettled pickup leg comes before the delivery leg.
pub fn next_processable_job(working: &WorkingSet) -> Option<DeliveryRecord> {
    for item in group(working.pending.clone()) {
        match item {
            JobItem::Single(record) => {
                if !is_settled(record.status) {
                    return Some(record);
                }
            }
            JobItem::Group(shipment) => {
                for pickup in shipment.pickups {
                    if !is_settled(pickup.status) {
                        return Some(pickup);
                    }
                }
                if !is_settled(shipment.delivery.status) {
                    return Some(shipment.delivery);
                }
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use reparto_types::{DeliveryId, LegType, ShipmentId};

    fn make_leg(id: &str, leg: LegType, status: DeliveryStatus, shipment: &str) -> DeliveryRecord {
        DeliveryRecord::new(DeliveryId::new(id), leg, status)
            .with_shipment(ShipmentId::new(shipment))
    }

    fn working_with(pending: Vec<DeliveryRecord>) -> WorkingSet {
        WorkingSet {
            pending,
            in_progress: None,
        }
    }

    #[test]
    fn test_can_start_only_without_active_job() {
        let mut ws = working_with(vec![]);
        assert!(can_start_new_job(&ws));

        ws.in_progress = Some(DeliveryRecord::new(
            DeliveryId::new("busy"),
            LegType::Delivery,
            DeliveryStatus::InProgress,
        ));
        assert!(!can_start_new_job(&ws));
    }

    #[test]
    fn test_unsettled_pickup_comes_before_delivery_leg() {
        let ws = working_with(vec![
            make_leg("p1", LegType::Pickup, DeliveryStatus::Delivered, "S1"),
            make_leg("p2", LegType::Pickup, DeliveryStatus::Pending, "S1"),
            make_leg("d1", LegType::Delivery, DeliveryStatus::Pending, "S1"),
        ]);

        let next = next_processable_job(&ws).unwrap();
        assert_eq!(next.id.0, "p2");
    }

    #[test]
    fn test_delivery_leg_after_all_pickups_settle() {
        let ws = working_with(vec![
            make_leg("p1", LegType::Pickup, DeliveryStatus::Delivered, "S1"),
            make_leg("p2", LegType::Pickup, DeliveryStatus::Cancelled, "S1"),
            make_leg("d1", LegType::Delivery, DeliveryStatus::Pending, "S1"),
        ]);

        let next = next_processable_job(&ws).unwrap();
        assert_eq!(next.id.0, "d1");
    }

    #[test]
    fn test_fully_settled_group_yields_none() {
        let ws = working_with(vec![
            make_leg("p1", LegType::Pickup, DeliveryStatus::Delivered, "S1"),
            make_leg("d1", LegType::Delivery, DeliveryStatus::Delivered, "S1"),
        ]);
        assert!(next_processable_job(&ws).is_none());
    }

    #[test]
    fn test_singles_considered_in_order() {
        let ws = working_with(vec![
            DeliveryRecord::new(
                DeliveryId::new("done"),
                LegType::Delivery,
                DeliveryStatus::Returned,
            ),
            DeliveryRecord::new(
                DeliveryId::new("next"),
                LegType::Delivery,
                DeliveryStatus::Assigned,
            ),
        ]);
        assert_eq!(next_processable_job(&ws).unwrap().id.0, "next");
    }

    #[test]
    fn test_empty_pending_yields_none() {
        assert!(next_processable_job(&working_with(vec![])).is_none());
    }
}
