//! Assignment records: one leg of a courier job
//!
//! A `DeliveryRecord` is either a standalone job or one leg of a multi-leg
//! shipment. Shipment membership is a tagged union set at construction time,
//! so "grouped implies a shipment id" holds structurally rather than by
//! runtime field-sniffing.

use crate::ids::{DeliveryId, ShipmentId};
use crate::status::DeliveryStatus;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Whether a leg picks goods up or hands them over
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum LegType {
    Pickup,
    Delivery,
}

/// Destination address for a leg
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    pub province: String,
    pub municipality: String,
    pub sector: String,
    /// Free-text directions (street, landmark, apartment)
    pub details: String,
}

/// Shipment membership of a record
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ShipmentMembership {
    /// Standalone job, not part of any shipment
    Single,
    /// One leg of a multi-leg shipment
    Grouped { shipment_id: ShipmentId },
}

/// One leg of an assignment as held in the working set
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DeliveryRecord {
    /// Unique id, stable across updates
    pub id: DeliveryId,
    /// Pickup or delivery leg
    pub leg: LegType,
    /// Current lifecycle status
    pub status: DeliveryStatus,
    /// Client display name
    pub client_name: String,
    /// Client contact phone
    pub phone: String,
    /// Destination address
    pub address: Address,
    /// Courier fee in minor currency units
    pub fee_minor: u64,
    /// Goods cost in minor currency units
    pub cost_minor: u64,
    /// Enterprise label shown to the courier
    pub enterprise: String,
    /// Standalone or shipment-grouped
    pub membership: ShipmentMembership,
    /// When this record was last updated
    pub updated_at: DateTime<Utc>,
}

impl DeliveryRecord {
    /// Create a new record with empty client fields
    pub fn new(id: DeliveryId, leg: LegType, status: DeliveryStatus) -> Self {
        Self {
            id,
            leg,
            status,
            client_name: String::new(),
            phone: String::new(),
            address: Address::default(),
            fee_minor: 0,
            cost_minor: 0,
            enterprise: String::new(),
            membership: ShipmentMembership::Single,
            updated_at: Utc::now(),
        }
    }

    pub fn with_client(mut self, name: impl Into<String>, phone: impl Into<String>) -> Self {
        self.client_name = name.into();
        self.phone = phone.into();
        self
    }

    pub fn with_address(mut self, address: Address) -> Self {
        self.address = address;
        self
    }

    pub fn with_money(mut self, fee_minor: u64, cost_minor: u64) -> Self {
        self.fee_minor = fee_minor;
        self.cost_minor = cost_minor;
        self
    }

    pub fn with_enterprise(mut self, enterprise: impl Into<String>) -> Self {
        self.enterprise = enterprise.into();
        self
    }

    pub fn with_shipment(mut self, shipment_id: ShipmentId) -> Self {
        self.membership = ShipmentMembership::Grouped { shipment_id };
        self
    }

    /// Check if this record belongs to a shipment group
    pub fn is_grouped(&self) -> bool {
        matches!(self.membership, ShipmentMembership::Grouped { .. })
    }

    /// Shipment id, if this record is grouped
    pub fn shipment_id(&self) -> Option<&ShipmentId> {
        match &self.membership {
            ShipmentMembership::Grouped { shipment_id } => Some(shipment_id),
            ShipmentMembership::Single => None,
        }
    }

    /// Check if this record's status is terminal
    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }
}
