//! Ring configuration.
//!
//! The configuration is fixed once a ring is constructed. Every field has a
//! serde default so partial documents deserialize cleanly.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Default number of virtual nodes created per physical node.
pub const DEFAULT_VIRTUAL_NODES: usize = 150;

/// Default separator between a node id and its replica index.
pub const DEFAULT_SEPARATOR: &str = "#";

/// Construction-time settings for a [`HashRing`](crate::ring::HashRing).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RingConfig {
    /// Virtual nodes placed on the ring for each physical node (`V`).
    #[serde(default = "default_virtual_nodes")]
    pub virtual_nodes_per_node: usize,

    /// Separator used to derive virtual node ids (`"node-1#37"`).
    #[serde(default = "default_separator")]
    pub separator: String,
}

impl RingConfig {
    /// Create a configuration with `vnodes` virtual nodes and the default separator.
    pub fn new(vnodes: usize) -> Self {
        Self {
            virtual_nodes_per_node: vnodes,
            ..Self::default()
        }
    }

    /// Check the configuration for values the ring cannot work with.
    pub fn validate(&self) -> Result<()> {
        if self.virtual_nodes_per_node == 0 {
            return Err(Error::InvalidConfig(
                "virtual_nodes_per_node must be at least 1".into(),
            ));
        }
        if self.separator.is_empty() {
            return Err(Error::InvalidConfig("separator must not be empty".into()));
        }
        Ok(())
    }

    /// Derive the id of the `index`-th virtual node of `node_id`.
    pub fn virtual_node_id(&self, node_id: &str, index: usize) -> String {
        format!("{}{}{}", node_id, self.separator, index)
    }
}

impl Default for RingConfig {
    fn default() -> Self {
        Self {
            virtual_nodes_per_node: default_virtual_nodes(),
            separator: default_separator(),
        }
    }
}

fn default_virtual_nodes() -> usize {
    DEFAULT_VIRTUAL_NODES
}

fn default_separator() -> String {
    DEFAULT_SEPARATOR.to_string()
}
