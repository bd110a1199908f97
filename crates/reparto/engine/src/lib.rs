//! Reparto reconciliation engine
//!
//! Keeps a courier's in-memory working set of assignments consistent across
//! three independent update channels: authoritative REST snapshots, live
//! push events, and optimistic local status edits. The working set holds at
//! most one in-progress assignment at a time; shipment groups resolve into
//! a strict pickup-before-delivery processing order.
//!
//! The [`AssignmentStore`] owns the reconciler behind a single-writer lock
//! and publishes change notifications on a broadcast channel; readers only
//! ever see snapshot copies. The [`EventDispatcher`] feeds channel events
//! into the store in receipt order.

pub mod config;
pub mod dispatcher;
pub mod persistence;
pub mod progress;
pub mod reconciler;
pub mod selector;
pub mod store;

pub use config::StoreConfig;
pub use dispatcher::{DispatcherHandle, EventDispatcher};
pub use persistence::{InMemoryProgressStore, JsonFileProgressStore, ProgressStore};
pub use progress::ProgressTracker;
pub use reconciler::{AssignmentReconciler, EditOutcome, SnapshotOutcome, WorkingSet};
pub use selector::{can_start_new_job, next_processable_job};
pub use store::{AssignmentStore, StoreUpdate, UpdateCause};
