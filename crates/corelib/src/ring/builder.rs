//! Builder for assembling a ring with an initial set of nodes.

use crate::config::RingConfig;
use crate::error::Result;
use crate::node::NodeId;
use crate::partitioner::{Murmur3Partitioner, Partitioner};
use crate::ring::ring::HashRing;

/// Collects configuration and seed nodes, then builds a [`HashRing`].
///
/// ```rust
/// use hashring::RingBuilder;
///
/// let ring = RingBuilder::new()
///     .with_vnodes(8)
///     .add_node("node-1", "10.0.0.1:8080")
///     .add_node("node-2", "10.0.0.2:8080")
///     .build()
///     .unwrap();
///
/// assert_eq!(ring.virtual_node_count(), 16);
/// ```
#[derive(Debug, Clone, Default)]
pub struct RingBuilder {
    config: RingConfig,
    nodes: Vec<(NodeId, String)>,
}

impl RingBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the whole configuration.
    pub fn with_config(mut self, config: RingConfig) -> Self {
        self.config = config;
        self
    }

    /// Virtual nodes per physical node.
    pub fn with_vnodes(mut self, vnodes: usize) -> Self {
        self.config.virtual_nodes_per_node = vnodes;
        self
    }

    pub fn with_separator(mut self, separator: impl Into<String>) -> Self {
        self.config.separator = separator.into();
        self
    }

    /// Queue a node. Later duplicates of the same id are ignored at build time.
    pub fn add_node(mut self, id: impl Into<NodeId>, address: impl Into<String>) -> Self {
        self.nodes.push((id.into(), address.into()));
        self
    }

    /// Build a Murmur3-hashed ring.
    pub fn build(self) -> Result<HashRing> {
        self.build_with_partitioner(Murmur3Partitioner)
    }

    /// Build a ring hashing with `partitioner`.
    pub fn build_with_partitioner<P: Partitioner>(self, partitioner: P) -> Result<HashRing<P>> {
        let ring = HashRing::with_partitioner(self.config, partitioner)?;
        for (id, address) in self.nodes {
            ring.add_node(id, address)?;
        }
        Ok(ring)
    }
}
