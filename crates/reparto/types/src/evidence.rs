//! Evidence and payment rules gating status transitions
//!
//! The transition table says where a status may go; this module says what
//! the courier must attach to get there. Violations are local validation
//! errors and block submission before any network call.

use crate::errors::{DeliveryError, DeliveryResult};
use crate::record::LegType;
use crate::status::DeliveryStatus;
use serde::{Deserialize, Serialize};

/// Payment method name requiring extra photographic evidence
const BANK_TRANSFER: &str = "Transferencia";

/// A payment method as configured on the backend
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentMethod {
    /// Backend id, carried in the status PATCH body
    pub id: u32,
    /// Display name
    pub name: String,
}

impl PaymentMethod {
    pub fn new(id: u32, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }

    /// Bank transfers need a gallery image of the transfer receipt
    pub fn is_bank_transfer(&self) -> bool {
        self.name == BANK_TRANSFER
    }
}

/// An image captured or selected on the device
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageAttachment {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl ImageAttachment {
    pub fn jpeg(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            content_type: "image/jpeg".to_string(),
            bytes,
        }
    }
}

/// Everything the courier attached to a status change.
///
/// The camera photo and the gallery image are distinct upload slots; both
/// may be populated and submitted together.
#[derive(Clone, Debug, Default)]
pub struct TransitionEvidence {
    /// Free-text note
    pub note: Option<String>,
    /// Photo captured via the device camera
    pub camera_photo: Option<ImageAttachment>,
    /// Image selected from the device gallery
    pub gallery_image: Option<ImageAttachment>,
    /// Chosen payment method
    pub payment_method: Option<PaymentMethod>,
    /// Amount actually paid, minor units
    pub amount_paid_minor: Option<u64>,
}

impl TransitionEvidence {
    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }

    pub fn with_camera_photo(mut self, photo: ImageAttachment) -> Self {
        self.camera_photo = Some(photo);
        self
    }

    pub fn with_gallery_image(mut self, image: ImageAttachment) -> Self {
        self.gallery_image = Some(image);
        self
    }

    pub fn with_payment(mut self, method: PaymentMethod, amount_paid_minor: u64) -> Self {
        self.payment_method = Some(method);
        self.amount_paid_minor = Some(amount_paid_minor);
        self
    }

    /// All images present, camera slot first
    pub fn images(&self) -> Vec<&ImageAttachment> {
        self.camera_photo
            .iter()
            .chain(self.gallery_image.iter())
            .collect()
    }

    /// Validate this evidence against a chosen target status and leg type.
    ///
    /// Note rule: Cancelled, Returned, OnHold, and Scheduled all need a
    /// non-empty note. Delivery confirmation on a delivery leg needs a camera
    /// photo, a payment method, and a paid amount; a gallery image is
    /// additionally required when the paid amount is zero (payment handled
    /// off-app) or the method is a bank transfer — the two conditions are
    /// independent and either one triggers the requirement. Pickup legs
    /// never need photos or payment info.
    pub fn validate(&self, target: DeliveryStatus, leg: LegType) -> DeliveryResult<()> {
        if matches!(
            target,
            DeliveryStatus::Cancelled
                | DeliveryStatus::Returned
                | DeliveryStatus::OnHold
                | DeliveryStatus::Scheduled
        ) && self.note.as_deref().map_or(true, |n| n.trim().is_empty())
        {
            return Err(DeliveryError::MissingNote(target));
        }

        if target == DeliveryStatus::Delivered && leg == LegType::Delivery {
            if self.camera_photo.is_none() {
                return Err(DeliveryError::MissingCameraPhoto);
            }
            let method = self
                .payment_method
                .as_ref()
                .ok_or(DeliveryError::MissingPaymentMethod)?;
            let amount = self
                .amount_paid_minor
                .ok_or(DeliveryError::MissingPaidAmount)?;

            if self.gallery_image.is_none() {
                if amount == 0 {
                    return Err(DeliveryError::MissingGalleryImage(
                        "paid amount is zero".to_string(),
                    ));
                }
                if method.is_bank_transfer() {
                    return Err(DeliveryError::MissingGalleryImage(
                        "payment by bank transfer".to_string(),
                    ));
                }
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn photo() -> ImageAttachment {
        ImageAttachment::jpeg("proof.jpg", vec![0xff, 0xd8])
    }

    fn cash() -> PaymentMethod {
        PaymentMethod::new(1, "Efectivo")
    }

    fn transfer() -> PaymentMethod {
        PaymentMethod::new(2, "Transferencia")
    }

    #[test]
    fn test_note_required_for_cancellation() {
        let evidence = TransitionEvidence::default();
        let result = evidence.validate(DeliveryStatus::Cancelled, LegType::Delivery);
        assert!(matches!(result, Err(DeliveryError::MissingNote(_))));

        let blank = TransitionEvidence::default().with_note("   ");
        let result = blank.validate(DeliveryStatus::OnHold, LegType::Pickup);
        assert!(matches!(result, Err(DeliveryError::MissingNote(_))));

        let noted = TransitionEvidence::default().with_note("client not home");
        assert!(noted
            .validate(DeliveryStatus::Cancelled, LegType::Delivery)
            .is_ok());
    }

    #[test]
    fn test_delivered_without_payment_method_is_invalid() {
        let evidence = TransitionEvidence::default().with_camera_photo(photo());
        let result = evidence.validate(DeliveryStatus::Delivered, LegType::Delivery);
        assert!(matches!(result, Err(DeliveryError::MissingPaymentMethod)));
    }

    #[test]
    fn test_delivered_without_camera_photo_is_invalid() {
        let evidence = TransitionEvidence::default().with_payment(cash(), 5000);
        let result = evidence.validate(DeliveryStatus::Delivered, LegType::Delivery);
        assert!(matches!(result, Err(DeliveryError::MissingCameraPhoto)));
    }

    #[test]
    fn test_zero_amount_requires_gallery_image() {
        let evidence = TransitionEvidence::default()
            .with_camera_photo(photo())
            .with_payment(cash(), 0);
        let result = evidence.validate(DeliveryStatus::Delivered, LegType::Delivery);
        assert!(matches!(result, Err(DeliveryError::MissingGalleryImage(_))));

        let with_gallery = evidence.with_gallery_image(photo());
        assert!(with_gallery
            .validate(DeliveryStatus::Delivered, LegType::Delivery)
            .is_ok());
    }

    #[test]
    fn test_bank_transfer_requires_gallery_image() {
        let evidence = TransitionEvidence::default()
            .with_camera_photo(photo())
            .with_payment(transfer(), 5000);
        let result = evidence.validate(DeliveryStatus::Delivered, LegType::Delivery);
        assert!(matches!(result, Err(DeliveryError::MissingGalleryImage(_))));

        let with_gallery = evidence.with_gallery_image(photo());
        assert!(with_gallery
            .validate(DeliveryStatus::Delivered, LegType::Delivery)
            .is_ok());
    }

    #[test]
    fn test_paid_cash_needs_no_gallery_image() {
        let evidence = TransitionEvidence::default()
            .with_camera_photo(photo())
            .with_payment(cash(), 5000);
        assert!(evidence
            .validate(DeliveryStatus::Delivered, LegType::Delivery)
            .is_ok());
    }

    #[test]
    fn test_pickup_legs_need_no_evidence() {
        let evidence = TransitionEvidence::default();
        assert!(evidence
            .validate(DeliveryStatus::Delivered, LegType::Pickup)
            .is_ok());
    }

    #[test]
    fn test_both_image_slots_submitted_together() {
        let evidence = TransitionEvidence::default()
            .with_camera_photo(photo())
            .with_gallery_image(ImageAttachment::jpeg("receipt.jpg", vec![1, 2, 3]))
            .with_payment(transfer(), 10000);
        assert!(evidence
            .validate(DeliveryStatus::Delivered, LegType::Delivery)
            .is_ok());
        assert_eq!(evidence.images().len(), 2);
        assert_eq!(evidence.images()[0].file_name, "proof.jpg");
    }
}
