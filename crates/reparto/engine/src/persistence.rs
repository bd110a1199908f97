//! Progress persistence — daily counters must survive restarts
//!
//! Provides the `ProgressStore` trait, a JSON file implementation with
//! atomic writes, and an in-memory implementation for tests.

use reparto_types::{DailyProgress, DeliveryError, DeliveryResult};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Trait for persisting daily progress across restarts
pub trait ProgressStore: Send + Sync {
    /// Save the current day's counters
    fn save(&self, progress: &DailyProgress) -> DeliveryResult<()>;

    /// Load the persisted counters, if any exist
    fn load(&self) -> DeliveryResult<Option<DailyProgress>>;
}

/// JSON-file progress persistence.
///
/// Stores the counters as a single JSON file. Writes are atomic (write to
/// `.tmp`, then rename) to prevent corruption from interrupted writes. Only
/// the latest day is kept; an older day on disk is superseded at the next
/// save.
pub struct JsonFileProgressStore {
    path: PathBuf,
}

impl JsonFileProgressStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ProgressStore for JsonFileProgressStore {
    fn save(&self, progress: &DailyProgress) -> DeliveryResult<()> {
        let json = serde_json::to_string_pretty(progress)
            .map_err(|e| DeliveryError::Persistence(format!("serialization failed: {}", e)))?;

        let tmp_path = self.path.with_extension("tmp");
        std::fs::write(&tmp_path, json)?;
        std::fs::rename(&tmp_path, &self.path)?;

        Ok(())
    }

    fn load(&self) -> DeliveryResult<Option<DailyProgress>> {
        if !self.path.exists() {
            return Ok(None);
        }

        let contents = std::fs::read_to_string(&self.path)?;
        let progress = serde_json::from_str(&contents)
            .map_err(|e| DeliveryError::Persistence(format!("deserialization failed: {}", e)))?;

        Ok(Some(progress))
    }
}

/// In-memory progress persistence (for testing)
pub struct InMemoryProgressStore {
    data: Mutex<Option<DailyProgress>>,
}

impl InMemoryProgressStore {
    pub fn new() -> Self {
        Self {
            data: Mutex::new(None),
        }
    }
}

impl Default for InMemoryProgressStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressStore for InMemoryProgressStore {
    fn save(&self, progress: &DailyProgress) -> DeliveryResult<()> {
        let mut data = self
            .data
            .lock()
            .map_err(|_| DeliveryError::Persistence("lock poisoned".to_string()))?;
        *data = Some(progress.clone());
        Ok(())
    }

    fn load(&self) -> DeliveryResult<Option<DailyProgress>> {
        let data = self
            .data
            .lock()
            .map_err(|_| DeliveryError::Persistence("lock poisoned".to_string()))?;
        Ok(data.clone())
    }
}
