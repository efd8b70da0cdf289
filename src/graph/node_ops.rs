//! Node lifecycle operations.

use tracing::debug;

use super::{push_unique, GraphStore, State};
use crate::model::{type_key, GraphNode, UpdateNode};
use crate::record::{build_entity_record, entity_from_record};
use crate::types::{Cid, NodeId, NodeType, Result};

impl GraphStore {
    /// Persists a node and indexes it under both its id and its type key.
    ///
    /// Re-adding an existing id is a full overwrite: the record lands at a
    /// new address, both index entries move to it, and no field-level merge
    /// happens. Returns the new content address.
    pub fn add_node(&self, node: GraphNode) -> Result<Cid> {
        let cid = {
            let mut st = self.state.lock();
            self.add_node_locked(&mut st, &node)?
        };
        debug!(node = %node.id, cid = %cid, "node added");
        self.events.node_added(&node.id);
        Ok(cid)
    }

    fn add_node_locked(&self, st: &mut State, node: &GraphNode) -> Result<Cid> {
        let record = build_entity_record(node)?;
        let cid = self.blocks.put(&record)?;
        st.node_index.set(node.id.as_str(), cid.as_str())?;
        st.key_index.set(&node.key(), cid.as_str())?;
        st.out_edges.entry(node.id.clone()).or_default();
        st.in_edges.entry(node.id.clone()).or_default();
        st.node_cache
            .put(node.id.clone(), (node.clone(), cid.clone()));
        Ok(cid)
    }

    /// Fetches a node by logical id: cache first, then index and block
    /// store, repopulating the cache. Absence at any stage is `Ok(None)`.
    pub fn get_node(&self, id: &NodeId) -> Result<Option<GraphNode>> {
        let mut st = self.state.lock();
        self.get_node_locked(&mut st, id)
    }

    fn get_node_locked(&self, st: &mut State, id: &NodeId) -> Result<Option<GraphNode>> {
        if let Some((node, _)) = st.node_cache.get(id) {
            return Ok(Some(node.clone()));
        }
        let Some(cid) = st.node_index.get(id.as_str())? else {
            return Ok(None);
        };
        let cid = Cid(cid);
        let Some(record) = self.blocks.get(&cid)? else {
            return Ok(None);
        };
        let mut node = entity_from_record(&record)?;
        // the record has no id field; the lookup key is the identity
        node.id = id.clone();
        st.node_cache.put(id.clone(), (node.clone(), cid));
        Ok(Some(node))
    }

    /// Fetches a node by `(type, identifier)`.
    ///
    /// When a cached node carries the resolved address, that copy (with
    /// its real id) is returned. Otherwise the node is rebuilt from the
    /// record alone, which cannot recover the logical id; the returned
    /// node carries a freshly generated one. Such a reconstruction is not
    /// cached.
    pub fn get_node_by_key(
        &self,
        node_type: NodeType,
        identifier: &str,
    ) -> Result<Option<GraphNode>> {
        let st = self.state.lock();
        let Some(cid) = st.key_index.get(&type_key(node_type, identifier))? else {
            return Ok(None);
        };
        let cid = Cid(cid);
        let cached = st
            .node_cache
            .iter()
            .find(|(_, entry)| entry.1 == cid)
            .map(|(_, entry)| entry.0.clone());
        if let Some(node) = cached {
            return Ok(Some(node));
        }
        drop(st);
        // blocks are immutable, so reading outside the lock is safe
        let Some(record) = self.blocks.get(&cid)? else {
            return Ok(None);
        };
        Ok(Some(entity_from_record(&record)?))
    }

    /// Applies a patch to an existing node and overwrites it (new address,
    /// same logical id), all inside one critical section. Returns the
    /// updated node, or `Ok(None)` when the id does not resolve.
    pub fn update_node(&self, id: &NodeId, update: UpdateNode) -> Result<Option<GraphNode>> {
        let node = {
            let mut st = self.state.lock();
            let Some(mut node) = self.get_node_locked(&mut st, id)? else {
                return Ok(None);
            };
            for (key, value) in update.attributes {
                node.attributes.insert(key, value);
            }
            if let Some(name) = update.name {
                node.name = Some(name);
            }
            node.metadata.touch();
            self.add_node_locked(&mut st, &node)?;
            node
        };
        debug!(node = %id, "node updated");
        self.events.node_added(id);
        Ok(Some(node))
    }

    /// Deletes a node, cascading to every incident edge first.
    ///
    /// Returns `Ok(false)` when the id does not resolve. The whole cascade
    /// runs inside one critical section, so no edge can be re-added against
    /// the node between the incident-edge snapshot and the index removal.
    /// The persisted record stays in the block store (orphaned); only the
    /// index entries, adjacency sets, and cache entry are removed.
    pub fn delete_node(&self, id: &NodeId) -> Result<bool> {
        let incident = {
            let mut st = self.state.lock();
            let Some(node) = self.get_node_locked(&mut st, id)? else {
                return Ok(false);
            };
            let mut incident = st.out_edges.get(id).cloned().unwrap_or_default();
            for edge_id in st.in_edges.get(id).cloned().unwrap_or_default() {
                push_unique(&mut incident, &edge_id);
            }
            for edge_id in &incident {
                self.delete_edge_locked(&mut st, edge_id)?;
            }
            st.node_index.delete(id.as_str())?;
            st.key_index.delete(&node.key())?;
            st.out_edges.remove(id);
            st.in_edges.remove(id);
            st.node_cache.pop(id);
            incident
        };
        debug!(node = %id, edges = incident.len(), "node deleted");
        for edge_id in &incident {
            self.events.edge_deleted(edge_id);
        }
        self.events.node_deleted(id);
        Ok(true)
    }

    /// Authoritative existence check against the persisted index,
    /// bypassing the cache.
    pub fn has_node(&self, id: &NodeId) -> Result<bool> {
        self.state.lock().node_index.contains(id.as_str())
    }

    /// Cache-resident nodes of the given kind.
    ///
    /// This is not a persisted scan: nodes evicted from (or never loaded
    /// into) the cache are absent from the result.
    pub fn nodes_by_type(&self, node_type: NodeType) -> Vec<GraphNode> {
        let st = self.state.lock();
        st.node_cache
            .iter()
            .filter(|(_, entry)| entry.0.node_type == node_type)
            .map(|(_, entry)| entry.0.clone())
            .collect()
    }
}
