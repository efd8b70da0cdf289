//! Lifecycle notifications emitted by the store for external observers
//! (telemetry, higher-level systems).

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::types::{EdgeId, NodeId};

/// Observer of store lifecycle events.
///
/// Implementations must be cheap and non-blocking; notifications fire
/// after the corresponding state change has completed.
pub trait GraphEvents: Send + Sync {
    /// The store finished initialization.
    fn initialized(&self);

    /// A node was created or overwritten.
    fn node_added(&self, id: &NodeId);

    /// A node was deleted (after its incident edges).
    fn node_deleted(&self, id: &NodeId);

    /// An edge passed endpoint validation and was persisted.
    fn edge_added(&self, id: &EdgeId);

    /// An edge was deleted.
    fn edge_deleted(&self, id: &EdgeId);
}

/// Discards every notification.
#[derive(Default)]
pub struct NoopEvents;

impl GraphEvents for NoopEvents {
    fn initialized(&self) {}
    fn node_added(&self, _id: &NodeId) {}
    fn node_deleted(&self, _id: &NodeId) {}
    fn edge_added(&self, _id: &EdgeId) {}
    fn edge_deleted(&self, _id: &EdgeId) {}
}

/// Thread-safe counting observer.
#[derive(Default)]
pub struct CounterEvents {
    /// Number of `initialized` notifications.
    pub initialized: AtomicU64,
    /// Number of nodes added or overwritten.
    pub nodes_added: AtomicU64,
    /// Number of nodes deleted.
    pub nodes_deleted: AtomicU64,
    /// Number of edges added.
    pub edges_added: AtomicU64,
    /// Number of edges deleted.
    pub edges_deleted: AtomicU64,
}

impl GraphEvents for CounterEvents {
    fn initialized(&self) {
        self.initialized.fetch_add(1, Ordering::Relaxed);
    }

    fn node_added(&self, _id: &NodeId) {
        self.nodes_added.fetch_add(1, Ordering::Relaxed);
    }

    fn node_deleted(&self, _id: &NodeId) {
        self.nodes_deleted.fetch_add(1, Ordering::Relaxed);
    }

    fn edge_added(&self, _id: &EdgeId) {
        self.edges_added.fetch_add(1, Ordering::Relaxed);
    }

    fn edge_deleted(&self, _id: &EdgeId) {
        self.edges_deleted.fetch_add(1, Ordering::Relaxed);
    }
}

/// Default observer: [`NoopEvents`], zero overhead.
pub fn default_events() -> Arc<dyn GraphEvents> {
    Arc::new(NoopEvents)
}
