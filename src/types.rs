//! Identifiers, closed type enumerations, and the crate error type.

use std::fmt;

use rand::RngCore;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result alias used across the crate.
pub type Result<T> = std::result::Result<T, GraphError>;

/// Errors surfaced by the store.
///
/// Absence of a node or edge is never an error; lookups return
/// `Option`/`bool` instead. Only I/O, undecodable content, and edge
/// endpoint violations are reported through this type.
#[derive(Debug, Error)]
pub enum GraphError {
    /// I/O failure in the block store or a root pointer file.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// A record could not be encoded.
    #[error("serialization error: {0}")]
    Serialization(String),
    /// Persisted content exists but cannot be decoded.
    #[error("corruption detected: {0}")]
    Corruption(String),
    /// An edge referenced an endpoint that does not resolve in the node index.
    #[error("integrity violation: {0}")]
    Integrity(String),
}

fn random_hex() -> String {
    let mut bytes = [0u8; 16];
    rand::thread_rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}

/// Logical identity of a node. Opaque; caller-supplied or generated.
#[derive(Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub String);

impl NodeId {
    /// Wraps a caller-supplied id.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Generates a fresh random id.
    pub fn generate() -> Self {
        Self(random_hex())
    }

    /// The id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for NodeId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// Logical identity of an edge.
#[derive(Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EdgeId(pub String);

impl EdgeId {
    /// Wraps a caller-supplied id.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Generates a fresh random id.
    pub fn generate() -> Self {
        Self(random_hex())
    }

    /// The id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EdgeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for EdgeId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// Content address of a stored record: hex sha-256 of its canonical bytes.
///
/// Identical content always yields the identical address. Overwriting a
/// logical id produces a new address; the old one is orphaned, not erased.
#[derive(Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cid(pub String);

impl Cid {
    /// Builds a CID from a raw digest.
    pub fn from_digest(digest: &[u8]) -> Self {
        Self(hex::encode(digest))
    }

    /// The address as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Cid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Closed enumeration of node kinds.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeType {
    /// A human or account identity.
    User,
    /// An automated actor.
    Agent,
    /// An addressable artifact (document, dataset, url).
    Resource,
    /// A subject-matter grouping.
    Topic,
    /// An assertion made about other nodes.
    Claim,
}

impl NodeType {
    /// All node kinds, in declaration order.
    pub const ALL: [NodeType; 5] = [
        NodeType::User,
        NodeType::Agent,
        NodeType::Resource,
        NodeType::Topic,
        NodeType::Claim,
    ];

    /// Lowercase wire name of the kind.
    pub fn as_str(self) -> &'static str {
        match self {
            NodeType::User => "user",
            NodeType::Agent => "agent",
            NodeType::Resource => "resource",
            NodeType::Topic => "topic",
            NodeType::Claim => "claim",
        }
    }

    /// Parses a wire name back to a kind.
    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|ty| ty.as_str() == value)
    }
}

impl fmt::Display for NodeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Closed enumeration of edge kinds.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EdgeType {
    /// Source subscribes to target.
    Follows,
    /// Source produced target.
    Authored,
    /// Source cites target.
    References,
    /// Source extends trust to target.
    Trusts,
    /// Untyped association.
    RelatesTo,
}

impl EdgeType {
    /// All edge kinds, in declaration order.
    pub const ALL: [EdgeType; 5] = [
        EdgeType::Follows,
        EdgeType::Authored,
        EdgeType::References,
        EdgeType::Trusts,
        EdgeType::RelatesTo,
    ];

    /// Snake-case wire name of the kind.
    pub fn as_str(self) -> &'static str {
        match self {
            EdgeType::Follows => "follows",
            EdgeType::Authored => "authored",
            EdgeType::References => "references",
            EdgeType::Trusts => "trusts",
            EdgeType::RelatesTo => "relates_to",
        }
    }

    /// Parses a wire name back to a kind.
    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|ty| ty.as_str() == value)
    }
}

impl fmt::Display for EdgeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
