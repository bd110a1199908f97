//! Wire adapter: map backend assignment DTOs into domain records
//!
//! The backend list endpoint and push payloads both carry `RawAssignment`
//! shapes. Mapping normalizes free-text casing and converts the wire's
//! `is_group` flag + optional shipment id into the tagged membership union.
//! The fail-safe entry point degrades a bad batch to an empty list: a
//! partial, garbled list is worse than an empty one that triggers a retry.

use crate::errors::{DeliveryError, DeliveryResult};
use crate::ids::{DeliveryId, ShipmentId};
use crate::record::{Address, DeliveryRecord, LegType, ShipmentMembership};
use crate::status::DeliveryStatus;
use chrono::Utc;
use serde::{Deserialize, Serialize};

/// Assignment DTO as the backend sends it
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawAssignment {
    pub id: String,
    /// "pickup" or "delivery"
    #[serde(rename = "type")]
    pub leg: String,
    /// Numeric status id
    pub status: u16,
    #[serde(default)]
    pub client_name: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub province: String,
    #[serde(default)]
    pub municipality: String,
    #[serde(default)]
    pub sector: String,
    #[serde(default)]
    pub address: String,
    /// Courier fee, minor units
    #[serde(default)]
    pub fee: u64,
    /// Goods cost, minor units
    #[serde(default)]
    pub cost: u64,
    #[serde(default)]
    pub enterprise: String,
    #[serde(default)]
    pub is_group: bool,
    #[serde(default)]
    pub shipment_id: Option<String>,
}

/// Map one raw assignment into a domain record
pub fn try_adapt_one(raw: &RawAssignment) -> DeliveryResult<DeliveryRecord> {
    if raw.id.is_empty() {
        return Err(DeliveryError::Adapter("assignment id is empty".to_string()));
    }

    let leg = match raw.leg.to_ascii_lowercase().as_str() {
        "pickup" => LegType::Pickup,
        "delivery" => LegType::Delivery,
        other => {
            return Err(DeliveryError::Adapter(format!(
                "unrecognized leg type '{}' for assignment {}",
                other, raw.id
            )))
        }
    };

    let membership = if raw.is_group {
        match raw.shipment_id.as_deref() {
            Some(s) if !s.is_empty() => ShipmentMembership::Grouped {
                shipment_id: ShipmentId::new(s),
            },
            _ => {
                return Err(DeliveryError::Adapter(format!(
                    "grouped assignment {} has no shipment id",
                    raw.id
                )))
            }
        }
    } else {
        ShipmentMembership::Single
    };

    Ok(DeliveryRecord {
        id: DeliveryId::new(&raw.id),
        leg,
        status: DeliveryStatus::from_wire(raw.status),
        client_name: title_case(&raw.client_name),
        phone: raw.phone.clone(),
        address: Address {
            province: title_case(&raw.province),
            municipality: title_case(&raw.municipality),
            sector: title_case(&raw.sector),
            details: title_case(&raw.address),
        },
        fee_minor: raw.fee,
        cost_minor: raw.cost,
        enterprise: raw.enterprise.clone(),
        membership,
        updated_at: Utc::now(),
    })
}

/// Map a whole batch, failing on the first bad record
pub fn try_adapt(raw: &[RawAssignment]) -> DeliveryResult<Vec<DeliveryRecord>> {
    raw.iter().map(try_adapt_one).collect()
}

/// Fail-safe batch mapping: on any failure, log and return an empty list
pub fn adapt(raw: &[RawAssignment]) -> Vec<DeliveryRecord> {
    match try_adapt(raw) {
        Ok(records) => records,
        Err(e) => {
            tracing::warn!(error = %e, count = raw.len(), "Assignment batch mapping failed, returning empty set");
            Vec::new()
        }
    }
}

/// Capitalize the first letter of each whitespace-separated word
pub fn title_case(input: &str) -> String {
    input
        .split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => {
                    first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase()
                }
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
