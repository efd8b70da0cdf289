//! The graph store: node/edge lifecycle, adjacency, caching, statistics.

use std::collections::{BTreeMap, HashMap};
use std::num::NonZeroUsize;
use std::sync::Arc;

use lru::LruCache;
use parking_lot::Mutex;
use tracing::{debug, warn};

use crate::block::BlockStore;
use crate::events::{default_events, GraphEvents};
use crate::model::{GraphEdge, GraphNode};
use crate::options::StoreOptions;
use crate::record::edge_from_record;
use crate::trie::TrieIndex;
use crate::types::{Cid, EdgeId, NodeId, Result};

mod edge_ops;
mod node_ops;
mod traversal;

pub use traversal::Dir;

// Mutable state behind one lock, so every public mutation runs the whole
// persist -> index -> adjacency -> cache sequence as a single critical
// section.
pub(crate) struct State {
    pub(crate) node_index: TrieIndex,
    pub(crate) key_index: TrieIndex,
    pub(crate) edge_index: TrieIndex,
    pub(crate) out_edges: HashMap<NodeId, Vec<EdgeId>>,
    pub(crate) in_edges: HashMap<NodeId, Vec<EdgeId>>,
    pub(crate) node_cache: LruCache<NodeId, (GraphNode, Cid)>,
    pub(crate) edge_cache: LruCache<EdgeId, (GraphEdge, Cid)>,
}

pub(crate) fn push_unique(list: &mut Vec<EdgeId>, id: &EdgeId) {
    if !list.iter().any(|existing| existing == id) {
        list.push(id.clone());
    }
}

/// Combined store statistics.
///
/// `node_count`/`edge_count` come from the persisted indices; the per-type
/// breakdowns are derived from cache contents only and undercount anything
/// evicted or never read.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct GraphStats {
    /// Nodes present in the persisted node index.
    pub node_count: u64,
    /// Edges present in the persisted edge index.
    pub edge_count: u64,
    /// Nodes currently cached.
    pub cached_nodes: usize,
    /// Edges currently cached.
    pub cached_edges: usize,
    /// Cache-resident node counts by kind.
    pub nodes_by_type: BTreeMap<&'static str, usize>,
    /// Cache-resident edge counts by kind.
    pub edges_by_type: BTreeMap<&'static str, usize>,
}

/// Root addresses of the three indices; together they snapshot the whole
/// indexed graph at a point in time.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IndexRoots {
    /// Root of the node-by-id index.
    pub nodes: Option<Cid>,
    /// Root of the node-by-type-key index.
    pub node_keys: Option<Cid>,
    /// Root of the edge-by-id index.
    pub edges: Option<Cid>,
}

/// Graph-shaped storage over an immutable, content-addressed block store.
///
/// Composes one [`BlockStore`] and three [`TrieIndex`] instances
/// (node-by-id, node-by-type-key, edge-by-id), plus in-memory adjacency
/// maps and read-through caches. Adjacency maps and caches are process
/// local; the indexed records are durable.
pub struct GraphStore {
    pub(crate) blocks: Arc<BlockStore>,
    pub(crate) state: Mutex<State>,
    pub(crate) events: Arc<dyn GraphEvents>,
}

impl GraphStore {
    /// Opens (and on first use initializes) a store rooted at
    /// `options.base_path`. The block store comes up first, then the
    /// three indices on top of it. Reopening an existing path reloads
    /// the persisted index roots; the operation is idempotent.
    pub fn open(options: StoreOptions) -> Result<Self> {
        let blocks = Arc::new(BlockStore::open(&options.base_path)?);
        let node_index = TrieIndex::open(blocks.clone(), &options.base_path, "nodes")?;
        let key_index = TrieIndex::open(blocks.clone(), &options.base_path, "node-keys")?;
        let edge_index = TrieIndex::open(blocks.clone(), &options.base_path, "edges")?;

        let node_cap = NonZeroUsize::new(options.node_cache_capacity).unwrap_or(NonZeroUsize::MIN);
        let edge_cap = NonZeroUsize::new(options.edge_cache_capacity).unwrap_or(NonZeroUsize::MIN);
        let events = options.events.unwrap_or_else(default_events);

        let store = Self {
            blocks,
            state: Mutex::new(State {
                node_index,
                key_index,
                edge_index,
                out_edges: HashMap::new(),
                in_edges: HashMap::new(),
                node_cache: LruCache::new(node_cap),
                edge_cache: LruCache::new(edge_cap),
            }),
            events,
        };
        debug!(base_path = %options.base_path.display(), "graph store initialized");
        store.events.initialized();
        Ok(store)
    }

    /// Drops both caches. Indices and adjacency maps are untouched;
    /// subsequent reads repopulate the caches from persisted records.
    pub fn clear_cache(&self) {
        let mut st = self.state.lock();
        st.node_cache.clear();
        st.edge_cache.clear();
    }

    /// Current root addresses of the three indices.
    pub fn index_roots(&self) -> IndexRoots {
        let st = self.state.lock();
        IndexRoots {
            nodes: st.node_index.root().cloned(),
            node_keys: st.key_index.root().cloned(),
            edges: st.edge_index.root().cloned(),
        }
    }

    /// Combined statistics; see [`GraphStats`] for the cache caveat.
    pub fn stats(&self) -> GraphStats {
        let st = self.state.lock();
        let mut nodes_by_type: BTreeMap<&'static str, usize> = BTreeMap::new();
        for (_, entry) in st.node_cache.iter() {
            *nodes_by_type.entry(entry.0.node_type.as_str()).or_insert(0) += 1;
        }
        let mut edges_by_type: BTreeMap<&'static str, usize> = BTreeMap::new();
        for (_, entry) in st.edge_cache.iter() {
            *edges_by_type.entry(entry.0.edge_type.as_str()).or_insert(0) += 1;
        }
        GraphStats {
            node_count: st.node_index.stats().total_entries,
            edge_count: st.edge_index.stats().total_entries,
            cached_nodes: st.node_cache.len(),
            cached_edges: st.edge_cache.len(),
            nodes_by_type,
            edges_by_type,
        }
    }

    /// Rebuilds the in-memory adjacency maps from the persisted indices.
    ///
    /// Adjacency is process local and empty after a reopen; this replays
    /// the edge index instead of requiring callers to replay every edge
    /// write. Edge records resolve their endpoints through a reverse
    /// address-to-id map taken from the node index; edges whose endpoints
    /// no longer resolve are skipped. Returns the number of edges wired
    /// back in.
    pub fn rebuild_adjacency(&self) -> Result<usize> {
        let mut st = self.state.lock();
        let mut id_by_cid: HashMap<String, NodeId> = HashMap::new();
        for (id, cid) in st.node_index.entries()? {
            id_by_cid.insert(cid, NodeId::new(id));
        }
        st.out_edges.clear();
        st.in_edges.clear();
        for id in id_by_cid.values() {
            st.out_edges.entry(id.clone()).or_default();
            st.in_edges.entry(id.clone()).or_default();
        }
        let mut restored = 0usize;
        for (edge_id, cid) in st.edge_index.entries()? {
            let edge_id = EdgeId::new(edge_id);
            let cid = Cid(cid);
            let Some(record) = self.blocks.get(&cid)? else {
                warn!(edge = %edge_id, "edge index entry without a block");
                continue;
            };
            let mut edge = edge_from_record(&edge_id, &record)?;
            let source = id_by_cid.get(edge.source_id.as_str()).cloned();
            let target = id_by_cid.get(edge.target_id.as_str()).cloned();
            let (Some(source), Some(target)) = (source, target) else {
                warn!(edge = %edge_id, "edge endpoints no longer resolve; skipped");
                continue;
            };
            edge.source_id = source.clone();
            edge.target_id = target.clone();
            push_unique(st.out_edges.entry(source.clone()).or_default(), &edge_id);
            push_unique(st.in_edges.entry(target.clone()).or_default(), &edge_id);
            if edge.bidirectional {
                push_unique(st.out_edges.entry(target).or_default(), &edge_id);
                push_unique(st.in_edges.entry(source).or_default(), &edge_id);
            }
            // the rebuilt copy carries logical endpoints again; cache it
            st.edge_cache.put(edge_id, (edge, cid));
            restored += 1;
        }
        debug!(restored, "adjacency rebuilt from edge index");
        Ok(restored)
    }
}
