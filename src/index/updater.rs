//! Fan-out of change batches to registered index listeners.

use std::sync::{Arc, RwLock};

use tracing::error;

use crate::change::ChangeRecord;
use crate::index::OntologyChangeListener;

/// Dispatches each change batch to every registered listener, in
/// registration order.
///
/// A listener failure is logged and skipped; the remaining listeners still
/// see the batch. Registration order is therefore also a dependency order:
/// a listener that reads other indices while applying a batch must be
/// registered after them.
pub struct IndexUpdater {
    listeners: RwLock<Vec<(String, Arc<dyn OntologyChangeListener>)>>,
}

impl IndexUpdater {
    pub fn new() -> Self {
        Self {
            listeners: RwLock::new(Vec::new()),
        }
    }

    /// Register a listener under a name used in failure logs.
    pub fn register(&self, name: impl Into<String>, listener: Arc<dyn OntologyChangeListener>) {
        self.listeners
            .write()
            .expect("updater listener lock poisoned")
            .push((name.into(), listener));
    }

    /// Number of registered listeners.
    pub fn listener_count(&self) -> usize {
        self.listeners
            .read()
            .expect("updater listener lock poisoned")
            .len()
    }

    /// Deliver a batch to every listener in registration order.
    pub fn propagate(&self, changes: &[ChangeRecord]) {
        if changes.is_empty() {
            return;
        }
        let listeners = self
            .listeners
            .read()
            .expect("updater listener lock poisoned");
        for (name, listener) in listeners.iter() {
            if let Err(e) = listener.apply_changes(changes) {
                error!(index = %name, error = %e, "index failed to apply change batch, skipping");
            }
        }
    }
}

impl Default for IndexUpdater {
    fn default() -> Self {
        Self::new()
    }
}
