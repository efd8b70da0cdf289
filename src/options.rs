//! Configuration supplied when opening a [`crate::GraphStore`].

use std::path::PathBuf;
use std::sync::Arc;

use crate::events::GraphEvents;

/// Default node cache capacity (entries).
pub const DEFAULT_NODE_CACHE_CAPACITY: usize = 1024;
/// Default edge cache capacity (entries).
pub const DEFAULT_EDGE_CACHE_CAPACITY: usize = 4096;

/// Options for opening a graph store.
#[derive(Clone)]
pub struct StoreOptions {
    /// Directory under which blocks and index roots are placed.
    pub base_path: PathBuf,
    /// Capacity of the node read-through cache.
    pub node_cache_capacity: usize,
    /// Capacity of the edge read-through cache.
    pub edge_cache_capacity: usize,
    /// Optional lifecycle observer.
    pub events: Option<Arc<dyn GraphEvents>>,
}

impl StoreOptions {
    /// Creates options with default cache sizes and no observer.
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
            node_cache_capacity: DEFAULT_NODE_CACHE_CAPACITY,
            edge_cache_capacity: DEFAULT_EDGE_CACHE_CAPACITY,
            events: None,
        }
    }

    /// Sets the node cache capacity.
    pub fn node_cache_capacity(mut self, entries: usize) -> Self {
        self.node_cache_capacity = entries;
        self
    }

    /// Sets the edge cache capacity.
    pub fn edge_cache_capacity(mut self, entries: usize) -> Self {
        self.edge_cache_capacity = entries;
        self
    }

    /// Sets the lifecycle observer.
    pub fn events(mut self, events: Arc<dyn GraphEvents>) -> Self {
        self.events = Some(events);
        self
    }
}
