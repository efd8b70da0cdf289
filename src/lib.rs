//! braid: graph modeling over an immutable, content-addressed block store.
//!
//! Nodes and edges keep mutable logical identities while their bytes live
//! as immutable records addressed by content hash. Three persistent trie
//! indices (node-by-id, node-by-type-key, edge-by-id) map identities to
//! the most recent address; in-memory adjacency sets and LRU caches sit on
//! top for traversal and read performance.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod block;
pub mod events;
pub mod graph;
pub mod model;
pub mod options;
pub mod record;
pub mod trie;
pub mod types;

pub use block::BlockStore;
pub use events::{default_events, CounterEvents, GraphEvents, NoopEvents};
pub use graph::{Dir, GraphStats, GraphStore, IndexRoots};
pub use model::{
    type_key, AttrValue, Attributes, GraphEdge, GraphNode, Metadata, UpdateNode,
};
pub use options::StoreOptions;
pub use record::{
    build_edge_record, build_entity_record, edge_from_record, entity_from_record, Link, Record,
    RecordMeta,
};
pub use trie::{TrieIndex, TrieStats};
pub use types::{Cid, EdgeId, EdgeType, GraphError, NodeId, NodeType, Result};
