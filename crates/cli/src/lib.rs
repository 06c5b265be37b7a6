//! CLI tool for inspecting consistent hash rings.
//!
//! Builds an in-memory ring from a JSON ring file and/or `--node` flags, then
//! runs one command against it:
//! - Routing keys to nodes and replica sets
//! - Ring statistics, ownership and key distribution
//! - Simulating node failure (churn)
//! - Concurrent lookup benchmark

pub mod commands;
pub mod config;

pub use commands::{Command, CommandResult};
pub use config::{CliConfig, NodeSpec, RingFile};
