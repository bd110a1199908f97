//! Error types for the Reparto domain and engine

use crate::ids::DeliveryId;
use crate::status::DeliveryStatus;

/// Errors that can occur while validating or reconciling assignments
#[derive(Debug, thiserror::Error)]
pub enum DeliveryError {
    #[error("Invalid transition: {from} -> {to}")]
    InvalidTransition {
        from: DeliveryStatus,
        to: DeliveryStatus,
    },

    #[error("Assignment not found: {0}")]
    UnknownAssignment(DeliveryId),

    #[error("A note is required when moving to {0}")]
    MissingNote(DeliveryStatus),

    #[error("A camera photo is required to confirm delivery")]
    MissingCameraPhoto,

    #[error("A payment method is required to confirm delivery")]
    MissingPaymentMethod,

    #[error("A paid amount is required to confirm delivery")]
    MissingPaidAmount,

    #[error("A gallery image is required: {0}")]
    MissingGalleryImage(String),

    #[error("Assignment mapping failed: {0}")]
    Adapter(String),

    #[error("Stale snapshot: sequence {received} already superseded by {last_applied}")]
    StaleSnapshot { received: u64, last_applied: u64 },

    #[error("Progress persistence failed: {0}")]
    Persistence(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for delivery operations
pub type DeliveryResult<T> = Result<T, DeliveryError>;
