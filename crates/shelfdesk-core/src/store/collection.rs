// ── Generic reactive entity collection ──
//
// Holds one immutable snapshot per entity type. Snapshots are only ever
// replaced wholesale; subscribers are woken through a `watch` channel.

use std::sync::Arc;

use tokio::sync::watch;

/// A reactive, replace-only collection for a single entity type.
pub(crate) struct EntityCollection<T: Send + Sync + 'static> {
    /// Current snapshot, shared with every subscriber.
    snapshot: watch::Sender<Arc<Vec<Arc<T>>>>,
}

impl<T: Send + Sync + 'static> EntityCollection<T> {
    pub(crate) fn new() -> Self {
        let (snapshot, _) = watch::channel(Arc::new(Vec::new()));
        Self { snapshot }
    }

    /// Replace the whole collection.
    pub(crate) fn replace(&self, items: Vec<T>) {
        let snap: Vec<Arc<T>> = items.into_iter().map(Arc::new).collect();
        self.snapshot.send_replace(Arc::new(snap));
    }

    /// Remove all entities.
    pub(crate) fn clear(&self) {
        self.snapshot.send_replace(Arc::new(Vec::new()));
    }

    /// Get the current snapshot (cheap `Arc` clone).
    pub(crate) fn snapshot(&self) -> Arc<Vec<Arc<T>>> {
        self.snapshot.borrow().clone()
    }

    /// Subscribe to snapshot changes via a `watch::Receiver`.
    pub(crate) fn subscribe(&self) -> watch::Receiver<Arc<Vec<Arc<T>>>> {
        self.snapshot.subscribe()
    }

    pub(crate) fn len(&self) -> usize {
        self.snapshot.borrow().len()
    }
}
