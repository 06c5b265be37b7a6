//! Hash ring data structure.
//!
//! Holds a `BTreeMap<Token, VirtualNode>` ordered by position plus the table
//! of physical nodes, both behind one reader/writer lock. Lookups take the
//! shared lock; membership changes take the exclusive lock, so readers never
//! observe a node whose virtual nodes are only partly placed.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::{debug, info, warn};

use crate::config::RingConfig;
use crate::error::{Error, Result};
use crate::node::{NodeId, PhysicalNode};
use crate::partitioner::{Murmur3Partitioner, Partitioner};
use crate::ring::stats::RingStats;
use crate::token::{Token, RING_SPAN};
use crate::vnode::VirtualNode;

/// Ring contents guarded by the lock.
#[derive(Debug, Default)]
struct RingState {
    /// Ring positions, ascending.
    tokens: BTreeMap<Token, VirtualNode>,
    /// Physical nodes by id.
    nodes: HashMap<NodeId, Arc<PhysicalNode>>,
}

impl RingState {
    /// Ceiling query with wraparound: the first virtual node at or after
    /// `token`, or the smallest position when `token` is past the tail.
    fn successor(&self, token: Token) -> Option<&VirtualNode> {
        self.tokens
            .range(token..)
            .next()
            .or_else(|| self.tokens.iter().next())
            .map(|(_, vnode)| vnode)
    }

    /// One clockwise revolution starting at the ceiling of `token`.
    fn walk_from(&self, token: Token) -> impl Iterator<Item = &VirtualNode> {
        self.tokens
            .range(token..)
            .chain(self.tokens.range(..token))
            .map(|(_, vnode)| vnode)
    }
}

/// Thread-safe consistent hash ring.
///
/// Maps string keys to physical nodes through `V` virtual nodes per physical
/// node. Generic over the [`Partitioner`] that hashes keys and virtual node
/// ids; defaults to MurmurHash3.
///
/// # Example
///
/// ```rust
/// use hashring::HashRing;
///
/// let ring = HashRing::new();
/// ring.add_node("node-1", "10.0.0.1:8080").unwrap();
/// ring.add_node("node-2", "10.0.0.2:8080").unwrap();
///
/// let owner = ring.lookup("user-123").unwrap();
/// assert!(owner.id() == "node-1" || owner.id() == "node-2");
/// ```
pub struct HashRing<P: Partitioner = Murmur3Partitioner> {
    state: RwLock<RingState>,
    config: RingConfig,
    partitioner: P,
}

impl HashRing {
    /// Create an empty ring with 150 virtual nodes per node and `"#"` as separator.
    pub fn new() -> Self {
        Self::build(RingConfig::default(), Murmur3Partitioner)
    }

    /// Create an empty ring with the given configuration.
    pub fn with_config(config: RingConfig) -> Result<Self> {
        Self::with_partitioner(config, Murmur3Partitioner)
    }
}

impl Default for HashRing {
    fn default() -> Self {
        Self::new()
    }
}

impl<P: Partitioner> HashRing<P> {
    /// Create an empty ring hashing with `partitioner`.
    pub fn with_partitioner(config: RingConfig, partitioner: P) -> Result<Self> {
        config.validate()?;
        Ok(Self::build(config, partitioner))
    }

    fn build(config: RingConfig, partitioner: P) -> Self {
        info!(
            vnodes = config.virtual_nodes_per_node,
            partitioner = partitioner.name(),
            "initialized consistent hash ring"
        );
        Self {
            state: RwLock::new(RingState::default()),
            config,
            partitioner,
        }
    }

    /// Add a physical node and its `V` virtual nodes.
    ///
    /// Returns `Ok(false)` without touching the ring if `id` is already
    /// present. A blank `id` is rejected with [`Error::InvalidNode`].
    pub fn add_node(&self, id: impl Into<NodeId>, address: impl Into<String>) -> Result<bool> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err(Error::InvalidNode("node id must not be blank".into()));
        }

        let node = Arc::new(PhysicalNode::new(id, address));
        // Hash outside the write section; placement below is all-or-nothing.
        let vnodes: Vec<VirtualNode> = (0..self.config.virtual_nodes_per_node)
            .map(|i| {
                let vnode_id = self.config.virtual_node_id(node.id(), i);
                VirtualNode::hashed(vnode_id, Arc::clone(&node), &self.partitioner)
            })
            .collect();

        let mut state = self.state.write();
        if state.nodes.contains_key(node.id()) {
            warn!(node_id = node.id(), "node already exists in the hash ring");
            return Ok(false);
        }

        state.nodes.insert(node.id().to_string(), Arc::clone(&node));
        for vnode in vnodes {
            // A token collision overwrites the earlier virtual node.
            state.tokens.insert(vnode.token(), vnode);
        }

        info!(
            node_id = node.id(),
            address = node.address(),
            vnodes = self.config.virtual_nodes_per_node,
            "added node to the hash ring"
        );
        Ok(true)
    }

    /// Remove a physical node and every virtual node it owns.
    ///
    /// Returns `false` if `id` is not on the ring. Scans the whole ring:
    /// O(ring size), since virtual nodes are not indexed by owner.
    pub fn remove_node(&self, id: &str) -> bool {
        let mut state = self.state.write();
        if state.nodes.remove(id).is_none() {
            warn!(node_id = id, "node does not exist in the hash ring");
            return false;
        }

        let before = state.tokens.len();
        state.tokens.retain(|_, vnode| vnode.owner_id() != id);

        info!(
            node_id = id,
            vnodes = before - state.tokens.len(),
            "removed node from the hash ring"
        );
        true
    }

    /// Add several nodes, each as its own atomic step.
    ///
    /// Every id is validated before any node is added. The result maps each
    /// id to whether it was newly added.
    pub fn add_nodes<I, K, A>(&self, nodes: I) -> Result<BTreeMap<NodeId, bool>>
    where
        I: IntoIterator<Item = (K, A)>,
        K: Into<NodeId>,
        A: Into<String>,
    {
        let nodes: Vec<(NodeId, String)> = nodes
            .into_iter()
            .map(|(id, address)| (id.into(), address.into()))
            .collect();
        if let Some((id, _)) = nodes.iter().find(|(id, _)| id.trim().is_empty()) {
            return Err(Error::InvalidNode(format!("node id {:?} must not be blank", id)));
        }

        let mut results = BTreeMap::new();
        for (id, address) in nodes {
            let added = self.add_node(id.clone(), address)?;
            // Repeated ids in one batch report the first outcome.
            results.entry(id).or_insert(added);
        }
        Ok(results)
    }

    /// Remove several nodes, each as its own atomic step.
    pub fn remove_nodes<I, K>(&self, ids: I) -> BTreeMap<NodeId, bool>
    where
        I: IntoIterator<Item = K>,
        K: AsRef<str>,
    {
        let mut results = BTreeMap::new();
        for id in ids {
            let id = id.as_ref();
            let removed = self.remove_node(id);
            results.entry(id.to_string()).or_insert(removed);
        }
        results
    }

    /// Find the physical node responsible for `key`.
    ///
    /// Returns `None` for a blank key or an empty ring.
    pub fn lookup(&self, key: &str) -> Option<Arc<PhysicalNode>> {
        if key.trim().is_empty() {
            debug!(key, "invalid key provided");
            return None;
        }

        let token = self.partitioner.partition_str(key);
        let state = self.state.read();
        let Some(vnode) = state.successor(token) else {
            debug!(key, "hash ring is empty, no node for key");
            return None;
        };

        debug!(key, %token, node_id = vnode.owner_id(), "mapped key to node");
        Some(Arc::clone(vnode.owner()))
    }

    /// Find up to `count` distinct physical nodes for `key`, primary first.
    ///
    /// Walks clockwise from the key's position for at most one revolution,
    /// so fewer than `count` nodes come back when the ring has fewer
    /// distinct physical nodes. `count == 0` is rejected.
    pub fn lookup_replicas(&self, key: &str, count: usize) -> Result<Vec<Arc<PhysicalNode>>> {
        if count == 0 {
            return Err(Error::InvalidReplicaCount(count));
        }
        if key.trim().is_empty() {
            debug!(key, "invalid key provided");
            return Ok(Vec::new());
        }

        let token = self.partitioner.partition_str(key);
        let state = self.state.read();
        let wanted = count.min(state.nodes.len());
        let mut replicas: Vec<Arc<PhysicalNode>> = Vec::with_capacity(wanted);
        if wanted == 0 {
            debug!(key, "hash ring is empty, no nodes for key");
            return Ok(replicas);
        }

        let mut seen: HashSet<&str> = HashSet::with_capacity(wanted);
        for vnode in state.walk_from(token) {
            if seen.insert(vnode.owner_id()) {
                replicas.push(Arc::clone(vnode.owner()));
                if replicas.len() == wanted {
                    break;
                }
            }
        }

        debug!(
            key,
            requested = count,
            found = replicas.len(),
            "mapped key to replica nodes"
        );
        Ok(replicas)
    }

    /// Snapshot of membership counts and per-node virtual node placement.
    pub fn stats(&self) -> RingStats {
        let state = self.state.read();
        let mut distribution: BTreeMap<NodeId, usize> = BTreeMap::new();
        for vnode in state.tokens.values() {
            *distribution.entry(vnode.owner_id().to_string()).or_default() += 1;
        }

        RingStats {
            physical_node_count: state.nodes.len(),
            virtual_node_count: state.tokens.len(),
            virtual_nodes_per_node: self.config.virtual_nodes_per_node,
            distribution,
        }
    }

    /// Fraction of the token space owned by each node.
    ///
    /// A virtual node owns the arc from its predecessor (exclusive) up to its
    /// own token (inclusive). Fractions sum to 1.0 on a non-empty ring.
    pub fn ownership(&self) -> BTreeMap<NodeId, f64> {
        let state = self.state.read();
        let mut arcs: BTreeMap<NodeId, u128> = BTreeMap::new();

        let mut prev = match state.tokens.last_key_value() {
            Some((token, _)) => *token,
            None => return BTreeMap::new(),
        };
        let single = state.tokens.len() == 1;
        for (token, vnode) in &state.tokens {
            let arc = if single {
                RING_SPAN
            } else {
                prev.distance_to(*token) as u128
            };
            *arcs.entry(vnode.owner_id().to_string()).or_default() += arc;
            prev = *token;
        }

        arcs.into_iter()
            .map(|(id, arc)| (id, arc as f64 / RING_SPAN as f64))
            .collect()
    }

    /// Count how many of `keys` land on each node, under one read lock.
    ///
    /// Blank keys are skipped.
    pub fn key_distribution<I, K>(&self, keys: I) -> BTreeMap<NodeId, usize>
    where
        I: IntoIterator<Item = K>,
        K: AsRef<str>,
    {
        let state = self.state.read();
        let mut counts: BTreeMap<NodeId, usize> = BTreeMap::new();
        for key in keys {
            let key = key.as_ref();
            if key.trim().is_empty() {
                continue;
            }
            let token = self.partitioner.partition_str(key);
            if let Some(vnode) = state.successor(token) {
                *counts.entry(vnode.owner_id().to_string()).or_default() += 1;
            }
        }
        counts
    }

    /// All physical nodes, sorted by id.
    pub fn nodes(&self) -> Vec<Arc<PhysicalNode>> {
        let state = self.state.read();
        let mut nodes: Vec<_> = state.nodes.values().cloned().collect();
        nodes.sort_by(|a, b| a.id().cmp(b.id()));
        nodes
    }

    /// Fetch a physical node by id.
    pub fn get_node(&self, id: &str) -> Option<Arc<PhysicalNode>> {
        self.state.read().nodes.get(id).cloned()
    }

    pub fn contains_node(&self, id: &str) -> bool {
        self.state.read().nodes.contains_key(id)
    }

    /// True when no virtual nodes are on the ring.
    pub fn is_empty(&self) -> bool {
        self.state.read().tokens.is_empty()
    }

    pub fn node_count(&self) -> usize {
        self.state.read().nodes.len()
    }

    pub fn virtual_node_count(&self) -> usize {
        self.state.read().tokens.len()
    }

    /// All `(token, owner id)` pairs in ring order. Intended for debugging.
    pub fn tokens(&self) -> Vec<(Token, NodeId)> {
        self.state
            .read()
            .tokens
            .iter()
            .map(|(token, vnode)| (*token, vnode.owner_id().to_string()))
            .collect()
    }

    pub fn config(&self) -> &RingConfig {
        &self.config
    }

    pub fn partitioner_name(&self) -> &'static str {
        self.partitioner.name()
    }
}
