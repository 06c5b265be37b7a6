//! Scenario tests for the hash ring.
//!
//! # Test Strategy
//!
//! 1. **Basic functionality**: empty ring, add/lookup, remove
//! 2. **Multiple nodes**: determinism, coverage, bounded churn
//! 3. **Replicas**: ordering, distinctness, under-provisioned rings
//! 4. **Invariants**: stats after add/remove sequences

use std::collections::HashSet;

use hashring::partitioner::{SipHashPartitioner, XxHash3Partitioner};
use hashring::{HashRing, RingBuilder, RingConfig};

fn ring_with_nodes(vnodes: usize, count: usize) -> HashRing {
    let ring = HashRing::with_config(RingConfig::new(vnodes)).unwrap();
    for i in 1..=count {
        assert!(ring
            .add_node(format!("node-{}", i), format!("192.168.1.{}:8080", 9 + i))
            .unwrap());
    }
    ring
}

fn sample_keys(n: usize) -> Vec<String> {
    (0..n).map(|i| format!("key-{}", i)).collect()
}

// ============================================================================
// Basic Functionality Tests
// ============================================================================

#[test]
fn test_empty_ring_lookup() {
    let ring = HashRing::new();
    assert!(ring.lookup("anything").is_none());
    assert!(ring.lookup_replicas("anything", 3).unwrap().is_empty());
    assert!(ring.is_empty());
    assert_eq!(ring.node_count(), 0);

    let stats = ring.stats();
    assert_eq!(stats.physical_node_count, 0);
    assert_eq!(stats.virtual_node_count, 0);
    assert!(stats.distribution.is_empty());
    assert!(ring.ownership().is_empty());
}

#[test]
fn test_add_node_and_lookup() {
    let ring = HashRing::with_config(RingConfig::new(4)).unwrap();

    assert!(ring.add_node("node-1", "10.0.0.1:8080").unwrap());
    assert_eq!(ring.node_count(), 1);
    assert_eq!(ring.virtual_node_count(), 4);

    let node = ring.lookup("test-key").expect("lookup should succeed after adding node");
    assert_eq!(node.id(), "node-1");
    assert_eq!(node.address(), "10.0.0.1:8080");

    let retrieved = ring.get_node("node-1").expect("node should be retrievable by id");
    assert_eq!(*retrieved, *node);
    assert!(ring.contains_node("node-1"));
}

#[test]
fn test_duplicate_add_is_rejected_without_mutation() {
    let ring = HashRing::with_config(RingConfig::new(4)).unwrap();

    assert!(ring.add_node("node-1", "first").unwrap());
    assert!(!ring.add_node("node-1", "second").unwrap());

    assert_eq!(ring.node_count(), 1);
    assert_eq!(ring.virtual_node_count(), 4);
    assert_eq!(ring.get_node("node-1").unwrap().address(), "first");
}

#[test]
fn test_remove_node() {
    let ring = ring_with_nodes(4, 2);
    assert_eq!(ring.virtual_node_count(), 8);

    assert!(ring.remove_node("node-1"));
    assert_eq!(ring.node_count(), 1);
    assert_eq!(ring.virtual_node_count(), 4);

    assert_eq!(ring.lookup("some-key").unwrap().id(), "node-2");
    assert!(ring.get_node("node-1").is_none());
    assert!(ring.get_node("node-2").is_some());

    assert!(!ring.remove_node("node-999"));
}

#[test]
fn test_idempotent_removal() {
    let ring = ring_with_nodes(8, 3);
    assert!(ring.remove_node("node-2"));
    assert!(!ring.remove_node("node-2"));
    assert_eq!(ring.node_count(), 2);
}

#[test]
fn test_add_remove_add() {
    let ring = ring_with_nodes(4, 1);
    assert!(ring.remove_node("node-1"));
    assert!(ring.is_empty());

    assert!(ring.add_node("node-1", "again").unwrap());
    assert_eq!(ring.node_count(), 1);
    assert_eq!(ring.lookup("key").unwrap().address(), "again");
}

#[test]
fn test_blank_keys_find_nothing() {
    let ring = ring_with_nodes(8, 3);
    for key in ["", " ", "\t\n"] {
        assert!(ring.lookup(key).is_none());
        assert!(ring.lookup_replicas(key, 2).unwrap().is_empty());
    }
}

// ============================================================================
// Multiple Nodes Tests
// ============================================================================

#[test]
fn test_concrete_scenario() {
    let ring = ring_with_nodes(150, 5);
    let ids: HashSet<String> = (1..=5).map(|i| format!("node-{}", i)).collect();

    let first = ring.lookup("user-123").unwrap();
    assert!(ids.contains(first.id()));
    for _ in 0..100 {
        assert_eq!(ring.lookup("user-123").unwrap().id(), first.id());
    }

    assert!(ring.remove_node("node-3"));
    let after = ring.lookup("user-123").expect("key must still map to a node");
    assert_ne!(after.id(), "node-3");
    assert!(ids.contains(after.id()));
    if first.id() != "node-3" {
        assert_eq!(after.id(), first.id());
    }
}

#[test]
fn test_coverage() {
    let ring = ring_with_nodes(16, 3);
    for key in sample_keys(1_000) {
        assert!(ring.lookup(&key).is_some(), "no node for {}", key);
    }
}

#[test]
fn test_single_node() {
    let ring = ring_with_nodes(4, 1);
    for key in ["key1", "key2", "key3", "very-long-key-name"] {
        assert_eq!(ring.lookup(key).unwrap().id(), "node-1");
    }
}

#[test]
fn test_bounded_churn_on_removal() {
    let ring = ring_with_nodes(150, 5);
    let keys = sample_keys(10_000);

    let before: Vec<String> = keys
        .iter()
        .map(|k| ring.lookup(k).unwrap().id().to_string())
        .collect();

    assert!(ring.remove_node("node-3"));

    let mut moved = 0usize;
    for (key, old) in keys.iter().zip(&before) {
        let new = ring.lookup(key).unwrap();
        if new.id() != old {
            moved += 1;
            // Only keys of the removed node move.
            assert_eq!(old, "node-3");
        } else {
            assert_ne!(old, "node-3");
        }
    }

    let fraction = moved as f64 / keys.len() as f64;
    assert!(
        (0.10..=0.30).contains(&fraction),
        "expected roughly 1/5 of keys to move, got {:.3}",
        fraction
    );
}

#[test]
fn test_bounded_churn_on_addition() {
    let ring = ring_with_nodes(150, 4);
    let keys = sample_keys(10_000);
    let before: Vec<String> = keys
        .iter()
        .map(|k| ring.lookup(k).unwrap().id().to_string())
        .collect();

    assert!(ring.add_node("node-5", "192.168.1.14:8080").unwrap());

    let mut moved = 0usize;
    for (key, old) in keys.iter().zip(&before) {
        let new = ring.lookup(key).unwrap();
        if new.id() != old {
            // Keys only move onto the new node.
            assert_eq!(new.id(), "node-5");
            moved += 1;
        }
    }

    let fraction = moved as f64 / keys.len() as f64;
    assert!((0.10..=0.30).contains(&fraction), "moved {:.3}", fraction);
}

#[test]
fn test_distribution_is_roughly_even() {
    let ring = ring_with_nodes(150, 5);
    let counts = ring.key_distribution(sample_keys(10_000));

    assert_eq!(counts.len(), 5);
    assert_eq!(counts.values().sum::<usize>(), 10_000);
    for (id, count) in &counts {
        assert!(
            (1_000..=3_000).contains(count),
            "{} received {} of 10000 keys",
            id,
            count
        );
    }
}

#[test]
fn test_ownership_sums_to_one() {
    let ring = ring_with_nodes(150, 5);
    let ownership = ring.ownership();

    assert_eq!(ownership.len(), 5);
    let total: f64 = ownership.values().sum();
    assert!((total - 1.0).abs() < 1e-9, "total ownership {}", total);
    for share in ownership.values() {
        assert!((0.1..=0.3).contains(share));
    }
}

// ============================================================================
// Replica Tests
// ============================================================================

#[test]
fn test_replicas_primary_first_and_distinct() {
    let ring = ring_with_nodes(150, 5);

    for key in sample_keys(200) {
        let replicas = ring.lookup_replicas(&key, 3).unwrap();
        assert_eq!(replicas.len(), 3);
        assert_eq!(replicas[0].id(), ring.lookup(&key).unwrap().id());

        let unique: HashSet<&str> = replicas.iter().map(|n| n.id()).collect();
        assert_eq!(unique.len(), 3);
    }
}

#[test]
fn test_replicas_capped_by_node_count() {
    let ring = ring_with_nodes(16, 2);
    let replicas = ring.lookup_replicas("important-data", 5).unwrap();
    assert_eq!(replicas.len(), 2);

    let ids: HashSet<&str> = replicas.iter().map(|n| n.id()).collect();
    assert_eq!(ids, HashSet::from(["node-1", "node-2"]));
}

#[test]
fn test_replicas_deterministic() {
    let ring = ring_with_nodes(32, 5);
    let first: Vec<String> = ring
        .lookup_replicas("replication-key", 3)
        .unwrap()
        .iter()
        .map(|n| n.id().to_string())
        .collect();
    for _ in 0..10 {
        let again: Vec<String> = ring
            .lookup_replicas("replication-key", 3)
            .unwrap()
            .iter()
            .map(|n| n.id().to_string())
            .collect();
        assert_eq!(first, again);
    }
}

// ============================================================================
// Invariants and Utilities
// ============================================================================

#[test]
fn test_stats_invariant_after_churn() {
    let ring = ring_with_nodes(50, 6);
    ring.remove_node("node-2");
    ring.remove_node("node-5");
    ring.add_node("node-7", "x").unwrap();
    ring.add_node("node-2", "y").unwrap();

    let stats = ring.stats();
    assert_eq!(stats.physical_node_count, 5);
    assert_eq!(stats.virtual_node_count, 5 * 50);
    assert_eq!(stats.virtual_nodes_per_node, 50);
    assert!(stats.distribution.values().all(|&count| count == 50));
    assert!(stats.is_fully_populated());
    assert!(!stats.distribution.contains_key("node-5"));
}

#[test]
fn test_stats_serialize() {
    let ring = ring_with_nodes(4, 2);
    let json = serde_json::to_value(ring.stats()).unwrap();
    assert_eq!(json["physical_node_count"], 2);
    assert_eq!(json["virtual_node_count"], 8);
    assert_eq!(json["distribution"]["node-1"], 4);
}

#[test]
fn test_nodes_sorted_by_id() {
    let ring = ring_with_nodes(4, 3);
    let ids: Vec<String> = ring.nodes().iter().map(|n| n.id().to_string()).collect();
    assert_eq!(ids, ["node-1", "node-2", "node-3"]);
}

#[test]
fn test_tokens_sorted_and_owned() {
    let ring = ring_with_nodes(4, 1);
    let tokens = ring.tokens();
    assert_eq!(tokens.len(), 4);
    assert!(tokens.windows(2).all(|w| w[0].0 < w[1].0));
    assert!(tokens.iter().all(|(_, id)| id == "node-1"));
}

#[test]
fn test_separator_changes_placement() {
    let hash = RingBuilder::new()
        .with_vnodes(8)
        .add_node("node-1", "a")
        .build()
        .unwrap();
    let colon = RingBuilder::new()
        .with_vnodes(8)
        .with_separator(":")
        .add_node("node-1", "a")
        .build()
        .unwrap();
    assert_ne!(hash.tokens(), colon.tokens());
}

#[test]
fn test_partitioner_name() {
    assert_eq!(HashRing::new().partitioner_name(), "Murmur3Partitioner");

    let ring = HashRing::with_partitioner(RingConfig::default(), SipHashPartitioner).unwrap();
    assert_eq!(ring.partitioner_name(), "SipHashPartitioner");
}

#[test]
fn test_alternate_partitioners_route_every_key() {
    let sip = HashRing::with_partitioner(RingConfig::new(64), SipHashPartitioner).unwrap();
    let xx = HashRing::with_partitioner(RingConfig::new(64), XxHash3Partitioner).unwrap();
    for ring_nodes in 1..=3 {
        sip.add_node(format!("node-{}", ring_nodes), "").unwrap();
        xx.add_node(format!("node-{}", ring_nodes), "").unwrap();
    }

    let keys = sample_keys(3_000);
    assert_eq!(sip.key_distribution(&keys).len(), 3);
    assert_eq!(xx.key_distribution(&keys).len(), 3);
}
