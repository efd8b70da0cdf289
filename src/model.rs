//! Logical graph entities: nodes, edges, attribute bags, and bookkeeping.

use std::collections::BTreeMap;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

use crate::types::{EdgeId, EdgeType, NodeId, NodeType};

/// An open, domain-extensible attribute value.
///
/// Attributes are schemaless by design; this enum only fixes the value
/// representations, not which keys may appear.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttrValue {
    /// Boolean flag.
    Bool(bool),
    /// Signed integer.
    Int(i64),
    /// Floating point number.
    Float(f64),
    /// UTF-8 text.
    Text(String),
}

impl From<bool> for AttrValue {
    fn from(value: bool) -> Self {
        AttrValue::Bool(value)
    }
}

impl From<i64> for AttrValue {
    fn from(value: i64) -> Self {
        AttrValue::Int(value)
    }
}

impl From<f64> for AttrValue {
    fn from(value: f64) -> Self {
        AttrValue::Float(value)
    }
}

impl From<&str> for AttrValue {
    fn from(value: &str) -> Self {
        AttrValue::Text(value.to_string())
    }
}

/// Sorted attribute bag; the sort keeps record bytes canonical.
pub type Attributes = BTreeMap<String, AttrValue>;

pub(crate) fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

/// Creation/update bookkeeping carried by every node and edge.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Metadata {
    /// Unix milliseconds at creation.
    pub created_at_ms: u64,
    /// Unix milliseconds at the most recent overwrite.
    pub updated_at_ms: u64,
    /// Optional provenance marker.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

impl Metadata {
    /// Metadata stamped with the current time.
    pub fn now() -> Self {
        let ts = now_ms();
        Self {
            created_at_ms: ts,
            updated_at_ms: ts,
            source: None,
        }
    }

    /// Bumps the update timestamp.
    pub fn touch(&mut self) {
        self.updated_at_ms = now_ms();
    }
}

/// Derived lookup key for type-keyed node access.
pub fn type_key(node_type: NodeType, identifier: &str) -> String {
    format!("{}:{identifier}", node_type.as_str())
}

/// A logical graph node.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GraphNode {
    /// Logical identity; stable across overwrites.
    pub id: NodeId,
    /// Kind of the node.
    pub node_type: NodeType,
    /// Domain natural key, unique within the kind.
    pub identifier: String,
    /// Optional display name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Open attribute bag.
    #[serde(default)]
    pub attributes: Attributes,
    /// Creation/update bookkeeping.
    pub metadata: Metadata,
}

impl GraphNode {
    /// Creates a node with a generated id.
    pub fn new(node_type: NodeType, identifier: impl Into<String>) -> Self {
        Self::with_id(NodeId::generate(), node_type, identifier)
    }

    /// Creates a node with a caller-supplied id.
    pub fn with_id(id: NodeId, node_type: NodeType, identifier: impl Into<String>) -> Self {
        Self {
            id,
            node_type,
            identifier: identifier.into(),
            name: None,
            attributes: Attributes::new(),
            metadata: Metadata::now(),
        }
    }

    /// Sets the display name.
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Inserts one attribute.
    pub fn attr(mut self, key: impl Into<String>, value: impl Into<AttrValue>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    /// The type-keyed lookup key, `"{type}:{identifier}"`.
    pub fn key(&self) -> String {
        type_key(self.node_type, &self.identifier)
    }
}

/// A typed relationship between two nodes.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GraphEdge {
    /// Logical identity; stable across overwrites.
    pub id: EdgeId,
    /// Kind of the relationship.
    pub edge_type: EdgeType,
    /// Logical id of the source node.
    pub source_id: NodeId,
    /// Logical id of the target node.
    pub target_id: NodeId,
    /// Relationship strength.
    pub weight: f64,
    /// Open attribute bag.
    #[serde(default)]
    pub attributes: Attributes,
    /// Creation/update bookkeeping.
    pub metadata: Metadata,
    /// Whether the edge reads the same in both directions.
    pub bidirectional: bool,
}

impl GraphEdge {
    /// Creates an edge with a generated id and weight 1.0.
    pub fn new(edge_type: EdgeType, source_id: NodeId, target_id: NodeId) -> Self {
        Self::with_id(EdgeId::generate(), edge_type, source_id, target_id)
    }

    /// Creates an edge with a caller-supplied id.
    pub fn with_id(
        id: EdgeId,
        edge_type: EdgeType,
        source_id: NodeId,
        target_id: NodeId,
    ) -> Self {
        Self {
            id,
            edge_type,
            source_id,
            target_id,
            weight: 1.0,
            attributes: Attributes::new(),
            metadata: Metadata::now(),
            bidirectional: false,
        }
    }

    /// Sets the weight.
    pub fn weight(mut self, weight: f64) -> Self {
        self.weight = weight;
        self
    }

    /// Marks the edge bidirectional.
    pub fn bidirectional(mut self, bidirectional: bool) -> Self {
        self.bidirectional = bidirectional;
        self
    }

    /// Inserts one attribute.
    pub fn attr(mut self, key: impl Into<String>, value: impl Into<AttrValue>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }
}

/// Patch applied by `update_node`: attribute upserts plus an optional
/// display-name change. Field-level removal is not supported; overwriting
/// via `add_node` replaces the whole node instead.
#[derive(Clone, Debug, Default)]
pub struct UpdateNode {
    /// Attributes to insert or replace.
    pub attributes: Attributes,
    /// New display name, when present.
    pub name: Option<String>,
}

impl UpdateNode {
    /// Empty patch.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds one attribute upsert.
    pub fn attr(mut self, key: impl Into<String>, value: impl Into<AttrValue>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    /// Sets the display name.
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}
