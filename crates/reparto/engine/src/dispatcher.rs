//! Event dispatcher: feeds channel events into the store in receipt order
//!
//! The live transport hands envelopes to the returned sender; the
//! dispatcher task drains them FIFO into the store, one at a time, so
//! every event applies to completion before the next. The task is created
//! at session start and shut down at logout through its handle.

use crate::store::AssignmentStore;
use reparto_types::EventEnvelope;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// FIFO pump from the live event channel into the assignment store
pub struct EventDispatcher {
    store: Arc<AssignmentStore>,
    event_rx: mpsc::Receiver<EventEnvelope>,
    shutdown_rx: mpsc::Receiver<()>,
}

/// Handle for stopping a running dispatcher
pub struct DispatcherHandle {
    shutdown_tx: mpsc::Sender<()>,
    join: JoinHandle<()>,
}

impl DispatcherHandle {
    /// Stop the dispatcher and wait for it to drain
    pub async fn shutdown(self) {
        let _ = self.shutdown_tx.send(()).await;
        let _ = self.join.await;
    }
}

impl EventDispatcher {
    /// Spawn the dispatcher task. The returned sender is handed to the
    /// event transport; dropping it also stops the task.
    pub fn spawn(
        store: Arc<AssignmentStore>,
        capacity: usize,
    ) -> (mpsc::Sender<EventEnvelope>, DispatcherHandle) {
        let (event_tx, event_rx) = mpsc::channel(capacity);
        let (shutdown_tx, shutdown_rx) = mpsc::channel(1);

        let dispatcher = Self {
            store,
            event_rx,
            shutdown_rx,
        };
        let join = tokio::spawn(dispatcher.run());

        (event_tx, DispatcherHandle { shutdown_tx, join })
    }

    async fn run(mut self) {
        tracing::info!("Event dispatcher started");
        loop {
            tokio::select! {
                maybe_envelope = self.event_rx.recv() => match maybe_envelope {
                    Some(envelope) => {
                        tracing::debug!(event = %envelope.kind, "Dispatching channel event");
                        self.store.handle_event(envelope);
                    }
                    None => break,
                },
                _ = self.shutdown_rx.recv() => break,
            }
        }
        tracing::info!("Event dispatcher stopped");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StoreConfig;
    use reparto_types::{AssignmentPayload, ChannelEventKind, RawAssignment};

    fn make_raw(id: &str) -> RawAssignment {
        RawAssignment {
            id: id.to_string(),
            leg: "delivery".to_string(),
            status: 2,
            client_name: String::new(),
            phone: String::new(),
            province: String::new(),
            municipality: String::new(),
            sector: String::new(),
            address: String::new(),
            fee: 0,
            cost: 0,
            enterprise: String::new(),
            is_group: false,
            shipment_id: None,
        }
    }

    #[tokio::test]
    async fn test_events_apply_in_receipt_order() {
        let (store, _refresh_rx) = AssignmentStore::new(StoreConfig::default());
        let mut updates = store.subscribe();
        let (event_tx, handle) = EventDispatcher::spawn(store.clone(), 16);

        // Assignment first, then an update to the same record. Applied in
        // order, the final status must be the update's.
        event_tx
            .send(EventEnvelope::new(
                ChannelEventKind::DriverAssigned,
                Some(AssignmentPayload::Single(make_raw("a1"))),
            ))
            .await
            .unwrap();
        let mut updated = make_raw("a1");
        updated.status = 3;
        event_tx
            .send(EventEnvelope::new(
                ChannelEventKind::DeliveryAssignmentUpdated,
                Some(AssignmentPayload::Single(updated)),
            ))
            .await
            .unwrap();

        // Two mutations, two notifications.
        updates.recv().await.unwrap();
        updates.recv().await.unwrap();

        let working = store.working_set();
        assert_eq!(working.pending.len(), 1);
        assert_eq!(
            working.pending[0].status,
            reparto_types::DeliveryStatus::Scheduled
        );

        handle.shutdown().await;
    }

    #[tokio::test]
    async fn test_shutdown_stops_the_task() {
        let (store, _refresh_rx) = AssignmentStore::new(StoreConfig::default());
        let (event_tx, handle) = EventDispatcher::spawn(store, 4);

        handle.shutdown().await;
        // After shutdown the receiver is gone; sends fail.
        assert!(event_tx
            .send(EventEnvelope::new(ChannelEventKind::DeliveryReordered, None))
            .await
            .is_err());
    }

    #[tokio::test]
    async fn test_dropping_sender_stops_the_task() {
        let (store, _refresh_rx) = AssignmentStore::new(StoreConfig::default());
        let (event_tx, handle) = EventDispatcher::spawn(store, 4);

        drop(event_tx);
        let _ = handle.join.await;
    }
}
