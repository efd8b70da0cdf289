//! Adjacency and traversal queries.

use tracing::warn;

use super::GraphStore;
use crate::model::{GraphEdge, GraphNode};
use crate::types::{EdgeId, EdgeType, NodeId, Result};

/// Direction selector for adjacency queries.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Dir {
    /// Outgoing edges only.
    Out,
    /// Incoming edges only.
    In,
    /// Both directions.
    Both,
}

impl Dir {
    /// Whether the selector covers outgoing edges.
    pub fn includes_out(self) -> bool {
        matches!(self, Dir::Out | Dir::Both)
    }

    /// Whether the selector covers incoming edges.
    pub fn includes_in(self) -> bool {
        matches!(self, Dir::In | Dir::Both)
    }
}

impl GraphStore {
    fn resolve_edges(
        &self,
        ids: Vec<EdgeId>,
        edge_type: Option<EdgeType>,
    ) -> Result<Vec<GraphEdge>> {
        let mut edges = Vec::with_capacity(ids.len());
        for edge_id in ids {
            let Some(edge) = self.get_edge(&edge_id)? else {
                warn!(edge = %edge_id, "adjacency entry without a resolvable edge");
                continue;
            };
            if edge_type.map_or(true, |ty| edge.edge_type == ty) {
                edges.push(edge);
            }
        }
        Ok(edges)
    }

    /// Outgoing edges of a node, in adjacency insertion order, optionally
    /// filtered by kind.
    pub fn out_edges(&self, id: &NodeId, edge_type: Option<EdgeType>) -> Result<Vec<GraphEdge>> {
        let ids = self.state.lock().out_edges.get(id).cloned().unwrap_or_default();
        self.resolve_edges(ids, edge_type)
    }

    /// Incoming edges of a node, in adjacency insertion order, optionally
    /// filtered by kind.
    pub fn in_edges(&self, id: &NodeId, edge_type: Option<EdgeType>) -> Result<Vec<GraphEdge>> {
        let ids = self.state.lock().in_edges.get(id).cloned().unwrap_or_default();
        self.resolve_edges(ids, edge_type)
    }

    /// All edges touching a node, de-duplicated by edge id. The
    /// de-duplication matters because a bidirectional edge sits in both
    /// the out- and in-set of each endpoint.
    pub fn edges(&self, id: &NodeId, edge_type: Option<EdgeType>) -> Result<Vec<GraphEdge>> {
        let ids = {
            let st = self.state.lock();
            let mut ids = st.out_edges.get(id).cloned().unwrap_or_default();
            for edge_id in st.in_edges.get(id).cloned().unwrap_or_default() {
                super::push_unique(&mut ids, &edge_id);
            }
            ids
        };
        self.resolve_edges(ids, edge_type)
    }

    /// Distinct neighbor nodes reachable over the requested direction(s),
    /// self excluded. Neighbor ids that no longer resolve to a node are
    /// skipped.
    pub fn neighbors(
        &self,
        id: &NodeId,
        direction: Dir,
        edge_type: Option<EdgeType>,
    ) -> Result<Vec<GraphNode>> {
        let mut neighbor_ids: Vec<NodeId> = Vec::new();
        let mut push = |other: NodeId| {
            if other != *id && !neighbor_ids.contains(&other) {
                neighbor_ids.push(other);
            }
        };
        if direction.includes_out() {
            for edge in self.out_edges(id, edge_type)? {
                let other = if edge.source_id == *id {
                    edge.target_id
                } else {
                    edge.source_id
                };
                push(other);
            }
        }
        if direction.includes_in() {
            for edge in self.in_edges(id, edge_type)? {
                let other = if edge.target_id == *id {
                    edge.source_id
                } else {
                    edge.target_id
                };
                push(other);
            }
        }
        let mut nodes = Vec::with_capacity(neighbor_ids.len());
        for neighbor_id in neighbor_ids {
            match self.get_node(&neighbor_id)? {
                Some(node) => nodes.push(node),
                None => warn!(node = %neighbor_id, "neighbor id does not resolve; skipped"),
            }
        }
        Ok(nodes)
    }

    /// First edge from `source` to `target`, found by a linear scan of the
    /// source's outgoing edges.
    pub fn edge_between(
        &self,
        source: &NodeId,
        target: &NodeId,
        edge_type: Option<EdgeType>,
    ) -> Result<Option<GraphEdge>> {
        for edge in self.out_edges(source, edge_type)? {
            if edge.target_id == *target || (edge.bidirectional && edge.source_id == *target) {
                return Ok(Some(edge));
            }
        }
        Ok(None)
    }

    /// Degree of a node from adjacency-set sizes; O(1).
    pub fn degree(&self, id: &NodeId, direction: Dir) -> usize {
        let st = self.state.lock();
        let out = st.out_edges.get(id).map_or(0, Vec::len);
        let inn = st.in_edges.get(id).map_or(0, Vec::len);
        match direction {
            Dir::Out => out,
            Dir::In => inn,
            Dir::Both => out + inn,
        }
    }
}
