//! Configuration for the assignment store

use serde::{Deserialize, Serialize};

/// Tuning for the store's notification and refresh channels
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Capacity of the broadcast channel carrying change notifications
    #[serde(default = "default_event_capacity")]
    pub event_capacity: usize,

    /// Capacity of the refresh signal queue; refresh requests beyond this
    /// coalesce into the ones already queued
    #[serde(default = "default_refresh_capacity")]
    pub refresh_capacity: usize,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            event_capacity: default_event_capacity(),
            refresh_capacity: default_refresh_capacity(),
        }
    }
}

fn default_event_capacity() -> usize {
    256
}

fn default_refresh_capacity() -> usize {
    8
}
