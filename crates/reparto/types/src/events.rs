//! Push event surface consumed from the live channel
//!
//! The transport is external; the engine only sees named events wrapped in
//! an envelope. Event names are the channel's wire strings.

use crate::adapter::RawAssignment;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Named events delivered on the live channel
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChannelEventKind {
    /// A new job was pushed to this courier
    #[serde(rename = "driver-assigned")]
    DriverAssigned,
    /// A single assignment's content changed
    #[serde(rename = "delivery-assignment-updated")]
    DeliveryAssignmentUpdated,
    /// Presentation order changed; payload content is not trusted
    #[serde(rename = "delivery-reordered")]
    DeliveryReordered,
    /// Informational update, wired to the same single-record path
    #[serde(rename = "delivery-updated")]
    DeliveryUpdated,
    /// Informational status change, wired to the same single-record path
    #[serde(rename = "delivery-status-changed")]
    DeliveryStatusChanged,
}

impl ChannelEventKind {
    /// Wire name of this event
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::DriverAssigned => "driver-assigned",
            Self::DeliveryAssignmentUpdated => "delivery-assignment-updated",
            Self::DeliveryReordered => "delivery-reordered",
            Self::DeliveryUpdated => "delivery-updated",
            Self::DeliveryStatusChanged => "delivery-status-changed",
        }
    }

    /// Parse a wire name
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "driver-assigned" => Some(Self::DriverAssigned),
            "delivery-assignment-updated" => Some(Self::DeliveryAssignmentUpdated),
            "delivery-reordered" => Some(Self::DeliveryReordered),
            "delivery-updated" => Some(Self::DeliveryUpdated),
            "delivery-status-changed" => Some(Self::DeliveryStatusChanged),
            _ => None,
        }
    }
}

impl std::fmt::Display for ChannelEventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Assignment payload of an event: one record or a batch
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AssignmentPayload {
    Batch(Vec<RawAssignment>),
    Single(RawAssignment),
}

impl AssignmentPayload {
    /// View the payload as a slice of raw assignments
    pub fn as_slice(&self) -> &[RawAssignment] {
        match self {
            Self::Batch(batch) => batch,
            Self::Single(one) => std::slice::from_ref(one),
        }
    }
}

/// Envelope wrapping every channel event
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventEnvelope {
    /// Which named event this is
    pub kind: ChannelEventKind,
    /// Assignment payload, absent for reorder signals
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<AssignmentPayload>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enterprise_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub timestamp: DateTime<Utc>,
}

impl EventEnvelope {
    pub fn new(kind: ChannelEventKind, data: Option<AssignmentPayload>) -> Self {
        Self {
            kind,
            data,
            user_id: None,
            enterprise_id: None,
            message: None,
            timestamp: Utc::now(),
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}
