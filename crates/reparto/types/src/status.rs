//! Delivery status lifecycle and transition table
//!
//! The status graph is closed: every allowed transition is listed here and
//! the terminal statuses have no outgoing edges. Unrecognized numeric wire
//! codes are carried as `Unknown` and handled leniently by the table so a
//! legacy backend value never bricks the courier's workflow.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Lifecycle status of one assignment leg
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum DeliveryStatus {
    /// Created, not yet assigned to a courier
    Pending,
    /// Assigned to this courier
    Assigned,
    /// Scheduled for a later slot
    Scheduled,
    /// Actively being worked (at most one device-wide)
    InProgress,
    /// Successfully delivered
    Delivered,
    /// Closed out by the backend
    Completed,
    /// Attempt failed, may be retried or returned
    Failed,
    /// Cancelled by an authorized actor
    Cancelled,
    /// Returned to origin
    Returned,
    /// Paused pending resolution
    OnHold,
    /// Unrecognized numeric wire code from a legacy backend
    Unknown(u16),
}

impl DeliveryStatus {
    /// All recognized statuses, in wire-code order
    pub const KNOWN: [DeliveryStatus; 10] = [
        DeliveryStatus::Pending,
        DeliveryStatus::Assigned,
        DeliveryStatus::Scheduled,
        DeliveryStatus::InProgress,
        DeliveryStatus::Delivered,
        DeliveryStatus::Completed,
        DeliveryStatus::Failed,
        DeliveryStatus::Cancelled,
        DeliveryStatus::Returned,
        DeliveryStatus::OnHold,
    ];

    /// Map a numeric wire code to a status. Unknown codes are carried, not
    /// rejected — the PATCH body and push payloads speak numeric ids.
    pub fn from_wire(code: u16) -> Self {
        match code {
            1 => Self::Pending,
            2 => Self::Assigned,
            3 => Self::Scheduled,
            4 => Self::InProgress,
            5 => Self::Delivered,
            6 => Self::Completed,
            7 => Self::Failed,
            8 => Self::Cancelled,
            9 => Self::Returned,
            10 => Self::OnHold,
            other => Self::Unknown(other),
        }
    }

    /// Numeric wire code for this status
    pub fn wire_id(&self) -> u16 {
        match self {
            Self::Pending => 1,
            Self::Assigned => 2,
            Self::Scheduled => 3,
            Self::InProgress => 4,
            Self::Delivered => 5,
            Self::Completed => 6,
            Self::Failed => 7,
            Self::Cancelled => 8,
            Self::Returned => 9,
            Self::OnHold => 10,
            Self::Unknown(code) => *code,
        }
    }

    /// Check if this status has no outgoing transitions
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::Delivered | Self::Returned | Self::Cancelled | Self::Completed
        )
    }

    /// Statuses reachable from this one.
    ///
    /// For `Unknown` codes the table falls back to every known status except
    /// the input itself. This leniency is deliberate: a courier holding an
    /// assignment with a legacy status must still be able to move it.
    pub fn valid_next_statuses(&self) -> BTreeSet<DeliveryStatus> {
        use DeliveryStatus::*;
        let next: &[DeliveryStatus] = match self {
            Pending => &[Assigned, Scheduled, Cancelled, OnHold],
            Assigned => &[InProgress, Cancelled, OnHold, Scheduled],
            Scheduled => &[Assigned, InProgress, Cancelled, OnHold],
            InProgress => &[Delivered, Failed, OnHold, Cancelled],
            Failed => &[Returned, InProgress, Cancelled],
            OnHold => &[InProgress, Cancelled, Scheduled],
            Delivered | Returned | Cancelled | Completed => &[],
            Unknown(_) => {
                return Self::KNOWN.iter().copied().filter(|s| s != self).collect();
            }
        };
        next.iter().copied().collect()
    }

    /// Check whether moving from this status to `target` is allowed
    pub fn can_transition_to(&self, target: DeliveryStatus) -> bool {
        self.valid_next_statuses().contains(&target)
    }
}

impl std::fmt::Display for DeliveryStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unknown(code) => write!(f, "Unknown({})", code),
            other => write!(f, "{:?}", other),
        }
    }
}
