//! Subcommands and their results.

use std::collections::BTreeMap;
use std::fmt;
use std::thread;
use std::time::{Instant, UNIX_EPOCH};

use anyhow::{bail, Context, Result};
use clap::Subcommand;
use hashring::{HashRing, Partitioner, PhysicalNode, RingStats};
use serde::Serialize;
use tracing::info;

/// Work to perform against the ring.
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Show which node owns each key.
    Lookup {
        /// Keys to route.
        #[arg(required = true)]
        keys: Vec<String>,
    },

    /// Show the replica set for a key, primary first.
    Replicas {
        key: String,

        /// Number of distinct nodes wanted.
        #[arg(long, default_value_t = 3)]
        count: usize,
    },

    /// Show membership and virtual node counts.
    Stats,

    /// List physical nodes.
    Nodes,

    /// Show the fraction of the hash space each node owns.
    Ownership,

    /// Route generated keys and count how many land on each node.
    Distribution {
        /// Number of keys to generate.
        #[arg(short = 'k', long, default_value_t = 1_000)]
        keys: usize,

        /// Prefix of generated keys (`<prefix><i>`).
        #[arg(long, default_value = "key-")]
        prefix: String,
    },

    /// Remove a node and report how many keys changed owner.
    Churn {
        /// Node to remove.
        #[arg(short = 'r', long)]
        remove: String,

        /// Number of keys to sample.
        #[arg(short = 'k', long, default_value_t = 10_000)]
        keys: usize,
    },

    /// Run concurrent lookups from several threads.
    Bench {
        #[arg(short = 't', long, default_value_t = 4)]
        threads: usize,

        /// Total lookups across all threads.
        #[arg(short = 'l', long, default_value_t = 100_000)]
        lookups: usize,
    },
}

/// Node as rendered in results.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NodeView {
    pub id: String,
    pub address: String,
    /// Milliseconds since the Unix epoch.
    pub created_at_ms: u128,
}

impl From<&PhysicalNode> for NodeView {
    fn from(node: &PhysicalNode) -> Self {
        let created_at_ms = node
            .created_at()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis())
            .unwrap_or_default();
        Self {
            id: node.id().to_string(),
            address: node.address().to_string(),
            created_at_ms,
        }
    }
}

/// Key routed to a node, if any.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Assignment {
    pub key: String,
    pub node: Option<NodeView>,
}

/// Outcome of a [`Command`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum CommandResult {
    Lookup {
        assignments: Vec<Assignment>,
    },
    Replicas {
        key: String,
        requested: usize,
        nodes: Vec<NodeView>,
    },
    Stats(RingStats),
    Nodes {
        nodes: Vec<NodeView>,
    },
    Ownership {
        shares: BTreeMap<String, f64>,
    },
    Distribution {
        keys: usize,
        counts: BTreeMap<String, usize>,
    },
    Churn {
        removed: String,
        keys: usize,
        moved: usize,
        fraction: f64,
        stats: RingStats,
    },
    Bench {
        threads: usize,
        lookups: usize,
        elapsed_ms: f64,
        lookups_per_sec: f64,
    },
}

impl Command {
    /// Execute against `ring`. `Churn` mutates the ring.
    pub fn execute<P: Partitioner>(&self, ring: &HashRing<P>) -> Result<CommandResult> {
        match self {
            Command::Lookup { keys } => {
                let assignments = keys
                    .iter()
                    .map(|key| Assignment {
                        key: key.clone(),
                        node: ring.lookup(key).map(|n| NodeView::from(n.as_ref())),
                    })
                    .collect();
                Ok(CommandResult::Lookup { assignments })
            }
            Command::Replicas { key, count } => {
                let nodes = ring
                    .lookup_replicas(key, *count)
                    .with_context(|| format!("replica lookup for {:?} failed", key))?;
                Ok(CommandResult::Replicas {
                    key: key.clone(),
                    requested: *count,
                    nodes: nodes.iter().map(|n| NodeView::from(n.as_ref())).collect(),
                })
            }
            Command::Stats => Ok(CommandResult::Stats(ring.stats())),
            Command::Nodes => Ok(CommandResult::Nodes {
                nodes: ring.nodes().iter().map(|n| NodeView::from(n.as_ref())).collect(),
            }),
            Command::Ownership => Ok(CommandResult::Ownership {
                shares: ring.ownership(),
            }),
            Command::Distribution { keys, prefix } => {
                let counts = ring.key_distribution(generate_keys(prefix, *keys));
                Ok(CommandResult::Distribution {
                    keys: *keys,
                    counts,
                })
            }
            Command::Churn { remove, keys } => churn(ring, remove, *keys),
            Command::Bench { threads, lookups } => bench(ring, *threads, *lookups),
        }
    }
}

fn generate_keys(prefix: &str, n: usize) -> impl Iterator<Item = String> + '_ {
    (0..n).map(move |i| format!("{}{}", prefix, i))
}

fn churn<P: Partitioner>(ring: &HashRing<P>, remove: &str, keys: usize) -> Result<CommandResult> {
    if !ring.contains_node(remove) {
        bail!("node {:?} is not on the ring", remove);
    }

    let before: Vec<Option<String>> = generate_keys("key-", keys)
        .map(|k| ring.lookup(&k).map(|n| n.id().to_string()))
        .collect();

    ring.remove_node(remove);

    let moved = generate_keys("key-", keys)
        .zip(&before)
        .filter(|(k, old)| ring.lookup(k).map(|n| n.id().to_string()) != **old)
        .count();
    let fraction = if keys == 0 {
        0.0
    } else {
        moved as f64 / keys as f64
    };

    info!(node_id = remove, moved, keys, "simulated node failure");
    Ok(CommandResult::Churn {
        removed: remove.to_string(),
        keys,
        moved,
        fraction,
        stats: ring.stats(),
    })
}

fn bench<P: Partitioner>(ring: &HashRing<P>, threads: usize, lookups: usize) -> Result<CommandResult> {
    if threads == 0 {
        bail!("bench needs at least one thread");
    }
    let per_thread = lookups / threads;

    let start = Instant::now();
    thread::scope(|s| {
        for t in 0..threads {
            s.spawn(move || {
                for i in 0..per_thread {
                    std::hint::black_box(ring.lookup(&format!("bench-{}-{}", t, i)));
                }
            });
        }
    });
    let elapsed = start.elapsed();

    let total = per_thread * threads;
    let secs = elapsed.as_secs_f64();
    Ok(CommandResult::Bench {
        threads,
        lookups: total,
        elapsed_ms: secs * 1_000.0,
        lookups_per_sec: if secs > 0.0 { total as f64 / secs } else { 0.0 },
    })
}

fn write_node(f: &mut fmt::Formatter<'_>, node: &NodeView) -> fmt::Result {
    write!(f, "{}", node.id)?;
    if !node.address.is_empty() {
        write!(f, " ({})", node.address)?;
    }
    Ok(())
}

impl fmt::Display for CommandResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CommandResult::Lookup { assignments } => {
                for (i, a) in assignments.iter().enumerate() {
                    if i > 0 {
                        writeln!(f)?;
                    }
                    write!(f, "{} -> ", a.key)?;
                    match &a.node {
                        Some(node) => write_node(f, node)?,
                        None => write!(f, "<no node>")?,
                    }
                }
                Ok(())
            }
            CommandResult::Replicas {
                key,
                requested,
                nodes,
            } => {
                write!(f, "{} ({} of {} requested):", key, nodes.len(), requested)?;
                for node in nodes {
                    write!(f, "\n  ")?;
                    write_node(f, node)?;
                }
                Ok(())
            }
            CommandResult::Stats(stats) => write!(f, "{}", stats),
            CommandResult::Nodes { nodes } => {
                write!(f, "{} node(s)", nodes.len())?;
                for node in nodes {
                    write!(f, "\n  ")?;
                    write_node(f, node)?;
                }
                Ok(())
            }
            CommandResult::Ownership { shares } => {
                write!(f, "hash space ownership:")?;
                for (id, share) in shares {
                    write!(f, "\n  {}: {:.2}%", id, share * 100.0)?;
                }
                Ok(())
            }
            CommandResult::Distribution { keys, counts } => {
                write!(f, "key distribution over {} keys:", keys)?;
                let mut sorted: Vec<_> = counts.iter().collect();
                sorted.sort_by(|a, b| b.1.cmp(a.1).then(a.0.cmp(b.0)));
                for (id, count) in sorted {
                    write!(f, "\n  {}: {} keys", id, count)?;
                }
                Ok(())
            }
            CommandResult::Churn {
                removed,
                keys,
                moved,
                fraction,
                stats,
            } => write!(
                f,
                "removed {}: {} of {} keys moved ({:.2}%)\n{}",
                removed,
                moved,
                keys,
                fraction * 100.0,
                stats
            ),
            CommandResult::Bench {
                threads,
                lookups,
                elapsed_ms,
                lookups_per_sec,
            } => write!(
                f,
                "{} lookups on {} thread(s) in {:.1} ms ({:.0} lookups/s)",
                lookups, threads, elapsed_ms, lookups_per_sec
            ),
        }
    }
}
