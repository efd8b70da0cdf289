//! Edge lifecycle operations.

use tracing::debug;

use super::{push_unique, GraphStore, State};
use crate::model::GraphEdge;
use crate::record::{build_edge_record, edge_from_record};
use crate::types::{Cid, EdgeId, GraphError, Result};

impl GraphStore {
    /// Persists an edge after validating both endpoints.
    ///
    /// Endpoint validation is the one hard precondition in the store: if
    /// either `source_id` or `target_id` does not resolve in the node
    /// index this returns [`GraphError::Integrity`] *before* anything is
    /// written, so no index, adjacency set, or cache entry mutates. A
    /// bidirectional edge is wired into both directions' adjacency sets
    /// for both endpoints.
    pub fn add_edge(&self, edge: GraphEdge) -> Result<Cid> {
        let cid = {
            let mut st = self.state.lock();
            let source_cid = st.node_index.get(edge.source_id.as_str())?.ok_or_else(|| {
                GraphError::Integrity(format!(
                    "edge {} references unknown source node {}",
                    edge.id, edge.source_id
                ))
            })?;
            let target_cid = st.node_index.get(edge.target_id.as_str())?.ok_or_else(|| {
                GraphError::Integrity(format!(
                    "edge {} references unknown target node {}",
                    edge.id, edge.target_id
                ))
            })?;
            let record = build_edge_record(&edge, Cid(source_cid), Cid(target_cid))?;
            let cid = self.blocks.put(&record)?;
            st.edge_index.set(edge.id.as_str(), cid.as_str())?;
            push_unique(
                st.out_edges.entry(edge.source_id.clone()).or_default(),
                &edge.id,
            );
            push_unique(
                st.in_edges.entry(edge.target_id.clone()).or_default(),
                &edge.id,
            );
            if edge.bidirectional {
                push_unique(
                    st.out_edges.entry(edge.target_id.clone()).or_default(),
                    &edge.id,
                );
                push_unique(
                    st.in_edges.entry(edge.source_id.clone()).or_default(),
                    &edge.id,
                );
            }
            st.edge_cache
                .put(edge.id.clone(), (edge.clone(), cid.clone()));
            cid
        };
        debug!(edge = %edge.id, cid = %cid, "edge added");
        self.events.edge_added(&edge.id);
        Ok(cid)
    }

    /// Fetches an edge by id: cache first, then index and block store.
    ///
    /// An uncached fetch rebuilds the edge from its record, whose
    /// endpoints are the raw link addresses rather than the original
    /// logical node ids; only a cached copy preserves them.
    pub fn get_edge(&self, id: &EdgeId) -> Result<Option<GraphEdge>> {
        let mut st = self.state.lock();
        self.get_edge_locked(&mut st, id)
    }

    pub(super) fn get_edge_locked(
        &self,
        st: &mut State,
        id: &EdgeId,
    ) -> Result<Option<GraphEdge>> {
        if let Some((edge, _)) = st.edge_cache.get(id) {
            return Ok(Some(edge.clone()));
        }
        let Some(cid) = st.edge_index.get(id.as_str())? else {
            return Ok(None);
        };
        let cid = Cid(cid);
        let Some(record) = self.blocks.get(&cid)? else {
            return Ok(None);
        };
        let edge = edge_from_record(id, &record)?;
        st.edge_cache.put(id.clone(), (edge.clone(), cid));
        Ok(Some(edge))
    }

    /// Deletes an edge: adjacency sets first (both mirrors when
    /// bidirectional), then the index entry and cache slot, all inside one
    /// critical section so a concurrent overwrite of the same id cannot
    /// interleave between the fetch and the unwind. Returns `Ok(false)`
    /// when the id does not resolve.
    pub fn delete_edge(&self, id: &EdgeId) -> Result<bool> {
        let deleted = {
            let mut st = self.state.lock();
            self.delete_edge_locked(&mut st, id)?
        };
        if deleted {
            debug!(edge = %id, "edge deleted");
            self.events.edge_deleted(id);
        }
        Ok(deleted)
    }

    pub(super) fn delete_edge_locked(&self, st: &mut State, id: &EdgeId) -> Result<bool> {
        let Some(edge) = self.get_edge_locked(st, id)? else {
            return Ok(false);
        };
        if let Some(list) = st.out_edges.get_mut(&edge.source_id) {
            list.retain(|existing| existing != id);
        }
        if let Some(list) = st.in_edges.get_mut(&edge.target_id) {
            list.retain(|existing| existing != id);
        }
        if edge.bidirectional {
            if let Some(list) = st.out_edges.get_mut(&edge.target_id) {
                list.retain(|existing| existing != id);
            }
            if let Some(list) = st.in_edges.get_mut(&edge.source_id) {
                list.retain(|existing| existing != id);
            }
        }
        st.edge_index.delete(id.as_str())?;
        st.edge_cache.pop(id);
        Ok(true)
    }

    /// Authoritative existence check against the persisted edge index.
    pub fn has_edge(&self, id: &EdgeId) -> Result<bool> {
        self.state.lock().edge_index.contains(id.as_str())
    }
}
