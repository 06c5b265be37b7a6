//! Command line arguments and the optional JSON ring file.
//!
//! A ring file looks like:
//!
//! ```json
//! {
//!   "ring": { "virtual_nodes_per_node": 150, "separator": "#" },
//!   "nodes": [ { "id": "node-1", "address": "192.168.1.10:8080" } ]
//! }
//! ```
//!
//! Flags override the file's ring settings; `--node` flags are appended to
//! the file's nodes. With no nodes from either source, five demo nodes are
//! used.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, ValueEnum};
use hashring::partitioner::{Murmur3Partitioner, SipHashPartitioner, XxHash3Partitioner};
use hashring::{HashRing, Partitioner, RingBuilder, RingConfig};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::commands::{Command, CommandResult};

/// A node to seed the ring with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeSpec {
    pub id: String,
    #[serde(default)]
    pub address: String,
}

impl NodeSpec {
    pub fn new(id: impl Into<String>, address: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            address: address.into(),
        }
    }
}

/// Parse `id=address` (or a bare `id`) from the command line.
fn parse_node(s: &str) -> std::result::Result<NodeSpec, String> {
    let (id, address) = s.split_once('=').unwrap_or((s, ""));
    if id.trim().is_empty() {
        return Err(format!("invalid node {:?}: expected ID[=ADDRESS]", s));
    }
    Ok(NodeSpec::new(id.trim(), address.trim()))
}

/// Contents of a `--config` file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RingFile {
    #[serde(default)]
    pub ring: RingConfig,
    #[serde(default)]
    pub nodes: Vec<NodeSpec>,
}

impl RingFile {
    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("failed to read ring file {}", path.display()))?;
        serde_json::from_str(&raw)
            .with_context(|| format!("failed to parse ring file {}", path.display()))
    }
}

/// Hash function used to place keys and virtual nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum PartitionerKind {
    #[default]
    Murmur3,
    Xxhash3,
    Siphash,
}

/// Nodes used when neither the file nor the flags name any.
pub fn default_nodes() -> Vec<NodeSpec> {
    (1..=5)
        .map(|i| NodeSpec::new(format!("node-{}", i), format!("192.168.1.{}:8080", 9 + i)))
        .collect()
}

/// Inspect and exercise an in-memory consistent hash ring.
#[derive(Parser, Debug)]
#[command(name = "hashring", version)]
pub struct CliConfig {
    /// Path to a JSON ring file.
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Virtual nodes per physical node.
    #[arg(long, global = true)]
    pub vnodes: Option<usize>,

    /// Separator between node id and virtual node index.
    #[arg(long, global = true)]
    pub separator: Option<String>,

    /// Node to add, as `ID=ADDRESS`. Can be given multiple times.
    #[arg(short = 'n', long = "node", global = true, value_parser = parse_node)]
    pub nodes: Vec<NodeSpec>,

    /// Hash function for keys and virtual nodes.
    #[arg(long, global = true, value_enum, default_value_t = PartitionerKind::Murmur3)]
    pub partitioner: PartitionerKind,

    /// Print results as JSON.
    #[arg(long, global = true)]
    pub json: bool,

    /// Log level used when `RUST_LOG` is not set.
    #[arg(long, global = true, default_value = "warn")]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Command,
}

impl CliConfig {
    /// Merge the ring file with command line overrides.
    pub fn resolve(&self) -> Result<RingFile> {
        let mut file = match &self.config {
            Some(path) => RingFile::load(path)?,
            None => RingFile::default(),
        };

        if let Some(vnodes) = self.vnodes {
            file.ring.virtual_nodes_per_node = vnodes;
        }
        if let Some(separator) = &self.separator {
            file.ring.separator = separator.clone();
        }
        file.nodes.extend(self.nodes.iter().cloned());
        if file.nodes.is_empty() {
            file.nodes = default_nodes();
        }
        Ok(file)
    }

    /// Build the ring and execute the selected command.
    pub fn execute(&self) -> Result<CommandResult> {
        let file = self.resolve()?;
        match self.partitioner {
            PartitionerKind::Murmur3 => self.execute_with(file, Murmur3Partitioner),
            PartitionerKind::Xxhash3 => self.execute_with(file, XxHash3Partitioner),
            PartitionerKind::Siphash => self.execute_with(file, SipHashPartitioner),
        }
    }

    fn execute_with<P: Partitioner>(&self, file: RingFile, partitioner: P) -> Result<CommandResult> {
        let ring = build_ring(file, partitioner)?;
        self.command.execute(&ring)
    }

    /// Entry point used by `main`: set up logging, execute, print.
    pub fn run(self) -> Result<()> {
        init_tracing(&self.log_level);

        let result = self.execute()?;
        if self.json {
            println!("{}", serde_json::to_string_pretty(&result)?);
        } else {
            println!("{}", result);
        }
        Ok(())
    }
}

fn build_ring<P: Partitioner>(file: RingFile, partitioner: P) -> Result<HashRing<P>> {
    let mut builder = RingBuilder::new().with_config(file.ring);
    let count = file.nodes.len();
    for node in file.nodes {
        if node.id.trim().is_empty() {
            bail!("ring file contains a node with a blank id");
        }
        debug!(node_id = %node.id, address = %node.address, "seeding node");
        builder = builder.add_node(node.id, node.address);
    }

    let ring = builder
        .build_with_partitioner(partitioner)
        .context("failed to build hash ring")?;
    info!(
        requested = count,
        nodes = ring.node_count(),
        partitioner = ring.partitioner_name(),
        "ring ready"
    );
    Ok(ring)
}

/// Initialize the `tracing` subscriber.
///
/// Respects `RUST_LOG` if set, otherwise uses `level`.
fn init_tracing(level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
