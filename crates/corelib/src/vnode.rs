//! Virtual node abstractions.
//!
//! # Virtual Nodes (VNodes) Concept
//!
//! Instead of each physical node having a single token on the ring, each node
//! has `V` tokens (virtual nodes). This provides:
//!
//! 1. **Better Load Distribution**: more tokens means a smoother share of keys
//! 2. **Gradual Rebalancing**: when nodes join/leave, only a fraction of keys move
//!
//! # Performance Characteristics
//!
//! - **Memory**: O(V) per physical node
//! - **Lookup**: O(log n) where n = total vnodes
//! - **Rebalancing**: roughly k/N keys move when one of N nodes leaves

use std::fmt;
use std::sync::Arc;

use crate::node::PhysicalNode;
use crate::partitioner::Partitioner;
use crate::token::Token;

/// A virtual node on the hash ring.
///
/// # Invariants
///
/// - The owner is present in the ring's node table for as long as this
///   virtual node is on the ring.
/// - `token` is the partitioner's hash of `id`.
#[derive(Debug, Clone)]
pub struct VirtualNode {
    /// Derived id, `physical_id + separator + index`.
    id: String,
    /// Token position on the ring.
    token: Token,
    /// The physical node that owns this virtual node.
    ///
    /// Shared handle, never a cycle: physical nodes do not point back.
    owner: Arc<PhysicalNode>,
}

impl VirtualNode {
    /// Create a virtual node at an explicit token.
    pub fn new(id: impl Into<String>, token: Token, owner: Arc<PhysicalNode>) -> Self {
        Self {
            id: id.into(),
            token,
            owner,
        }
    }

    /// Create a virtual node by hashing its derived id.
    pub fn hashed<P: Partitioner + ?Sized>(
        id: String,
        owner: Arc<PhysicalNode>,
        partitioner: &P,
    ) -> Self {
        let token = partitioner.partition_str(&id);
        Self::new(id, token, owner)
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    #[inline]
    pub fn token(&self) -> Token {
        self.token
    }

    #[inline]
    pub fn owner(&self) -> &Arc<PhysicalNode> {
        &self.owner
    }

    /// Id of the owning physical node.
    #[inline]
    pub fn owner_id(&self) -> &str {
        self.owner.id()
    }

    /// Clockwise distance to another virtual node.
    #[inline]
    pub fn distance_to(&self, other: &Self) -> u64 {
        self.token.distance_to(other.token)
    }
}

impl fmt::Display for VirtualNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "VirtualNode{{id='{}', token={}, physicalNode={}}}",
            self.id,
            self.token,
            self.owner.id()
        )
    }
}
