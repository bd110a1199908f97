//! Domain types for the Reparto delivery assignment engine
//!
//! This crate holds the pure model shared by the reconciliation engine and
//! the submission client: the delivery status lifecycle and its transition
//! table, assignment records and shipment grouping, the evidence/payment
//! rules gating status changes, push event payloads, the wire adapter, and
//! the daily progress arithmetic.

pub mod adapter;
pub mod errors;
pub mod events;
pub mod evidence;
pub mod ids;
pub mod progress;
pub mod record;
pub mod shipment;
pub mod status;

pub use adapter::{adapt, try_adapt, try_adapt_one, RawAssignment};
pub use errors::{DeliveryError, DeliveryResult};
pub use events::{AssignmentPayload, ChannelEventKind, EventEnvelope};
pub use evidence::{ImageAttachment, PaymentMethod, TransitionEvidence};
pub use ids::{CourierId, DeliveryId, EnterpriseId, ShipmentId};
pub use progress::DailyProgress;
pub use record::{Address, DeliveryRecord, LegType, ShipmentMembership};
pub use shipment::{group, JobItem, ShipmentGroup};
pub use status::DeliveryStatus;
