//! Ids of heroes created during the current run

use std::sync::Arc;

use parking_lot::Mutex;

/// Ordered, shareable list of created hero ids.
///
/// Ids are recorded as returned by the service, including ones the service
/// may have mangled; registry-mode cleanup deletes exactly these.
#[derive(Debug, Clone, Default)]
pub struct CreatedRegistry {
    ids: Arc<Mutex<Vec<i64>>>,
}

impl CreatedRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, id: i64) {
        self.ids.lock().push(id);
    }

    /// Copy of the recorded ids in insertion order
    pub fn snapshot(&self) -> Vec<i64> {
        self.ids.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.ids.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.lock().is_empty()
    }
}
