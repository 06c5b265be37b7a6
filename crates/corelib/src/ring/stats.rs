//! Point-in-time statistics about a ring.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

use crate::node::NodeId;

/// Snapshot of ring membership and virtual node placement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RingStats {
    pub physical_node_count: usize,
    pub virtual_node_count: usize,
    /// Configured `V`.
    pub virtual_nodes_per_node: usize,
    /// Physical node id -> virtual nodes currently on the ring for it.
    pub distribution: BTreeMap<NodeId, usize>,
}

impl RingStats {
    /// True when every live node has exactly `V` virtual nodes on the ring.
    ///
    /// Only a 64-bit token collision between two virtual node ids can make
    /// this false; the later insertion overwrites the earlier one.
    pub fn is_fully_populated(&self) -> bool {
        self.distribution.len() == self.physical_node_count
            && self.virtual_node_count == self.physical_node_count * self.virtual_nodes_per_node
            && self
                .distribution
                .values()
                .all(|&count| count == self.virtual_nodes_per_node)
    }
}

impl fmt::Display for RingStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "HashRingStats{{physicalNodes={}, virtualNodes={}, distribution={{",
            self.physical_node_count, self.virtual_node_count
        )?;
        for (i, (id, count)) in self.distribution.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}={}", id, count)?;
        }
        f.write_str("}}")
    }
}
