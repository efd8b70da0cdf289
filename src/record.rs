//! The stored unit: a data payload plus named links to other addresses,
//! and the builders that shape nodes and edges into it.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::model::{Attributes, GraphEdge, GraphNode, Metadata};
use crate::types::{Cid, EdgeId, EdgeType, GraphError, NodeId, NodeType, Result};

/// Link name for an edge record's source endpoint.
pub const LINK_SOURCE: &str = "source";
/// Link name for an edge record's target endpoint.
pub const LINK_TARGET: &str = "target";

/// A named reference from one record to another's content address.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    /// Role of the reference within the record.
    pub name: String,
    /// Address of the referenced record.
    pub cid: Cid,
}

/// Record bookkeeping; deliberately free of timestamps so identical
/// logical writes produce identical bytes and therefore identical CIDs.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordMeta {
    /// Payload discriminator: `entity`, `edge`, or `trie`.
    pub kind: String,
    /// Payload schema version.
    pub version: u32,
}

impl RecordMeta {
    pub(crate) fn entity() -> Self {
        Self {
            kind: "entity".to_string(),
            version: 1,
        }
    }

    pub(crate) fn edge() -> Self {
        Self {
            kind: "edge".to_string(),
            version: 1,
        }
    }

    pub(crate) fn trie() -> Self {
        Self {
            kind: "trie".to_string(),
            version: 1,
        }
    }
}

/// The stored unit of the block store.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Record {
    /// Payload, sufficient to reconstruct the logical entity or edge.
    pub data: Value,
    /// Named references to other records.
    #[serde(default)]
    pub links: Vec<Link>,
    /// Record bookkeeping.
    pub metadata: RecordMeta,
}

impl Record {
    /// Resolves a link by name.
    pub fn link(&self, name: &str) -> Option<&Cid> {
        self.links.iter().find(|l| l.name == name).map(|l| &l.cid)
    }
}

#[derive(Serialize)]
struct EntityPayload<'a> {
    #[serde(rename = "type")]
    node_type: NodeType,
    identifier: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<&'a str>,
    attributes: &'a Attributes,
    metadata: &'a Metadata,
}

#[derive(Deserialize)]
struct EntityData {
    #[serde(rename = "type")]
    node_type: NodeType,
    identifier: String,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    attributes: Attributes,
    metadata: Metadata,
}

#[derive(Serialize)]
struct EdgePayload<'a> {
    #[serde(rename = "type")]
    edge_type: EdgeType,
    weight: f64,
    bidirectional: bool,
    attributes: &'a Attributes,
    metadata: &'a Metadata,
}

#[derive(Deserialize)]
struct EdgeData {
    #[serde(rename = "type")]
    edge_type: EdgeType,
    weight: f64,
    bidirectional: bool,
    #[serde(default)]
    attributes: Attributes,
    metadata: Metadata,
}

fn encode_payload<T: Serialize>(payload: &T) -> Result<Value> {
    serde_json::to_value(payload).map_err(|err| GraphError::Serialization(err.to_string()))
}

/// Shapes a node into an entity record. The payload carries everything
/// needed to rebuild the node except its logical id.
pub fn build_entity_record(node: &GraphNode) -> Result<Record> {
    let data = encode_payload(&EntityPayload {
        node_type: node.node_type,
        identifier: &node.identifier,
        name: node.name.as_deref(),
        attributes: &node.attributes,
        metadata: &node.metadata,
    })?;
    Ok(Record {
        data,
        links: Vec::new(),
        metadata: RecordMeta::entity(),
    })
}

/// Shapes an edge into a record carrying `source`/`target` links to the
/// endpoint node records.
pub fn build_edge_record(edge: &GraphEdge, source_cid: Cid, target_cid: Cid) -> Result<Record> {
    let data = encode_payload(&EdgePayload {
        edge_type: edge.edge_type,
        weight: edge.weight,
        bidirectional: edge.bidirectional,
        attributes: &edge.attributes,
        metadata: &edge.metadata,
    })?;
    Ok(Record {
        data,
        links: vec![
            Link {
                name: LINK_SOURCE.to_string(),
                cid: source_cid,
            },
            Link {
                name: LINK_TARGET.to_string(),
                cid: target_cid,
            },
        ],
        metadata: RecordMeta::edge(),
    })
}

/// Rebuilds a node from an entity record alone.
///
/// The payload does not carry the logical id, so a fresh one is
/// generated. Callers that looked the record up by id overwrite it.
pub fn entity_from_record(record: &Record) -> Result<GraphNode> {
    let data: EntityData = serde_json::from_value(record.data.clone())
        .map_err(|err| GraphError::Corruption(format!("entity payload undecodable: {err}")))?;
    Ok(GraphNode {
        id: NodeId::generate(),
        node_type: data.node_type,
        identifier: data.identifier,
        name: data.name,
        attributes: data.attributes,
        metadata: data.metadata,
    })
}

/// Rebuilds an edge from its record.
///
/// Endpoint ids come from the record's raw link addresses, not the
/// original logical node ids; a cached copy is the only place the
/// logical endpoints survive.
pub fn edge_from_record(id: &EdgeId, record: &Record) -> Result<GraphEdge> {
    let data: EdgeData = serde_json::from_value(record.data.clone())
        .map_err(|err| GraphError::Corruption(format!("edge payload undecodable: {err}")))?;
    let source = record
        .link(LINK_SOURCE)
        .ok_or_else(|| GraphError::Corruption(format!("edge record {id} missing source link")))?;
    let target = record
        .link(LINK_TARGET)
        .ok_or_else(|| GraphError::Corruption(format!("edge record {id} missing target link")))?;
    Ok(GraphEdge {
        id: id.clone(),
        edge_type: data.edge_type,
        source_id: NodeId::new(source.as_str()),
        target_id: NodeId::new(target.as_str()),
        weight: data.weight,
        attributes: data.attributes,
        metadata: data.metadata,
        bidirectional: data.bidirectional,
    })
}
