//! Shipment grouping: fold a flat record list into jobs and shipment groups
//!
//! A shipment group aggregates every record sharing a shipment id into its
//! pickup legs plus the single final delivery leg. Groups are derived on
//! demand and never stored; the records are the source of truth.

use crate::ids::ShipmentId;
use crate::record::{DeliveryRecord, LegType};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// All legs of one shipment, split into pickups and the final delivery
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ShipmentGroup {
    pub shipment_id: ShipmentId,
    /// Pickup legs, in input order
    pub pickups: Vec<DeliveryRecord>,
    /// The single final delivery leg
    pub delivery: DeliveryRecord,
    /// Sum of fees across all legs, minor units
    pub total_fee_minor: u64,
    /// Sum of costs across all legs, minor units
    pub total_cost_minor: u64,
}

impl ShipmentGroup {
    fn assemble(
        shipment_id: ShipmentId,
        pickups: Vec<DeliveryRecord>,
        delivery: DeliveryRecord,
    ) -> Self {
        let total_fee_minor = pickups
            .iter()
            .map(|r| r.fee_minor)
            .chain(std::iter::once(delivery.fee_minor))
            .sum();
        let total_cost_minor = pickups
            .iter()
            .map(|r| r.cost_minor)
            .chain(std::iter::once(delivery.cost_minor))
            .sum();
        Self {
            shipment_id,
            pickups,
            delivery,
            total_fee_minor,
            total_cost_minor,
        }
    }

    /// Total number of legs in the group
    pub fn leg_count(&self) -> usize {
        self.pickups.len() + 1
    }
}

/// One element of the grouped working view
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum JobItem {
    /// A standalone job
    Single(DeliveryRecord),
    /// A multi-leg shipment
    Group(ShipmentGroup),
}

/// Partition records into standalone jobs and shipment groups.
///
/// Standalone records pass through first, in input order. Grouped records
/// are bucketed by shipment id in first-seen order, so the output is
/// deterministic for a given input. A bucket with no delivery leg has no
/// anchor and is dropped from the grouped output; the gap is logged so an
/// incomplete shipment view stays visible.
pub fn group(records: Vec<DeliveryRecord>) -> Vec<JobItem> {
    let mut singles = Vec::new();
    let mut bucket_order: Vec<ShipmentId> = Vec::new();
    let mut buckets: HashMap<ShipmentId, Vec<DeliveryRecord>> = HashMap::new();

    for record in records {
        match record.shipment_id().cloned() {
            Some(shipment_id) => {
                let bucket = buckets.entry(shipment_id.clone()).or_default();
                if bucket.is_empty() {
                    bucket_order.push(shipment_id);
                }
                bucket.push(record);
            }
            None => singles.push(JobItem::Single(record)),
        }
    }

    let mut items = singles;
    for shipment_id in bucket_order {
        let bucket = buckets.remove(&shipment_id).unwrap_or_default();
        let (mut pickups, mut deliveries): (Vec<_>, Vec<_>) =
            bucket.into_iter().partition(|r| r.leg == LegType::Pickup);

        if deliveries.is_empty() {
            tracing::warn!(
                shipment_id = %shipment_id,
                pickups = pickups.len(),
                "Shipment bucket has no delivery leg, dropping from grouped view"
            );
            continue;
        }

        let delivery = deliveries.remove(0);
        if !deliveries.is_empty() {
            // More than one delivery leg violates the shipment invariant.
            // The first leg anchors the group; the rest stay visible as
            // extra legs rather than vanishing.
            tracing::warn!(
                shipment_id = %shipment_id,
                extra = deliveries.len(),
                "Shipment bucket has more than one delivery leg"
            );
            pickups.extend(deliveries);
        }

        items.push(JobItem::Group(ShipmentGroup::assemble(
            shipment_id,
            pickups,
            delivery,
        )));
    }

    items
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::DeliveryId;
    use crate::status::DeliveryStatus;

    fn make_record(id: &str, leg: LegType, shipment: Option<&str>) -> DeliveryRecord {
        let record = DeliveryRecord::new(DeliveryId::new(id), leg, DeliveryStatus::Pending)
            .with_money(100, 1000);
        match shipment {
            Some(s) => record.with_shipment(ShipmentId::new(s)),
            None => record,
        }
    }

    #[test]
    fn test_group_splits_singles_and_shipments() {
        let records = vec![
            make_record("1", LegType::Pickup, Some("S1")),
            make_record("2", LegType::Pickup, Some("S1")),
            make_record("3", LegType::Delivery, Some("S1")),
            make_record("4", LegType::Delivery, None),
        ];

        let items = group(records);
        assert_eq!(items.len(), 2);

        match &items[0] {
            JobItem::Single(r) => assert_eq!(r.id.0, "4"),
            other => panic!("expected single first, got {:?}", other),
        }
        match &items[1] {
            JobItem::Group(g) => {
                assert_eq!(g.shipment_id.0, "S1");
                assert_eq!(g.pickups.len(), 2);
                assert_eq!(g.pickups[0].id.0, "1");
                assert_eq!(g.pickups[1].id.0, "2");
                assert_eq!(g.delivery.id.0, "3");
                assert_eq!(g.leg_count(), 3);
            }
            other => panic!("expected group, got {:?}", other),
        }
    }

    #[test]
    fn test_group_totals() {
        let items = group(vec![
            make_record("1", LegType::Pickup, Some("S1")),
            make_record("2", LegType::Delivery, Some("S1")),
        ]);
        match &items[0] {
            JobItem::Group(g) => {
                assert_eq!(g.total_fee_minor, 200);
                assert_eq!(g.total_cost_minor, 2000);
            }
            other => panic!("expected group, got {:?}", other),
        }
    }

    #[test]
    fn test_pickup_only_bucket_is_dropped() {
        let items = group(vec![
            make_record("1", LegType::Pickup, Some("S1")),
            make_record("2", LegType::Pickup, Some("S1")),
            make_record("3", LegType::Delivery, None),
        ]);
        assert_eq!(items.len(), 1);
        assert!(matches!(&items[0], JobItem::Single(r) if r.id.0 == "3"));
    }

    #[test]
    fn test_bucket_order_is_first_seen() {
        let items = group(vec![
            make_record("1", LegType::Pickup, Some("S2")),
            make_record("2", LegType::Delivery, Some("S1")),
            make_record("3", LegType::Delivery, Some("S2")),
            make_record("4", LegType::Pickup, Some("S1")),
        ]);
        let ids: Vec<_> = items
            .iter()
            .map(|i| match i {
                JobItem::Group(g) => g.shipment_id.0.clone(),
                JobItem::Single(r) => r.id.0.clone(),
            })
            .collect();
        assert_eq!(ids, vec!["S2", "S1"]);
    }

    #[test]
    fn test_ungrouped_batch_passes_through() {
        let records = vec![
            make_record("1", LegType::Delivery, None),
            make_record("2", LegType::Pickup, None),
        ];
        let items = group(records.clone());
        assert_eq!(items.len(), 2);
        for (item, record) in items.iter().zip(&records) {
            assert!(matches!(item, JobItem::Single(r) if r == record));
        }
    }
}
