//! Physical node abstractions for the consistent hash ring.
//!
//! Physical nodes are the real backends keys are routed to. They are
//! identified by a caller-supplied string id; equality and hashing only look
//! at that id.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::time::SystemTime;

use serde::Serialize;

/// Identifier of a physical node.
pub type NodeId = String;

/// A physical node participating in the ring.
///
/// Immutable once constructed. The ring keeps the authoritative copy and
/// hands out clones, so callers cannot change ring state through a node.
#[derive(Clone, Debug, Serialize)]
pub struct PhysicalNode {
    id: NodeId,
    address: String,
    created_at: SystemTime,
}

impl PhysicalNode {
    /// Construct a node stamped with the current time.
    pub fn new(id: impl Into<NodeId>, address: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            address: address.into(),
            created_at: SystemTime::now(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Network address or other opaque metadata.
    pub fn address(&self) -> &str {
        &self.address
    }

    pub fn created_at(&self) -> SystemTime {
        self.created_at
    }
}

impl PartialEq for PhysicalNode {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for PhysicalNode {}

impl Hash for PhysicalNode {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Display for PhysicalNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Node{{id='{}', address='{}'}}", self.id, self.address)
    }
}
