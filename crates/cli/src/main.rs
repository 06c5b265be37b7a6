//! CLI entry point for the hash ring tool.
//!
//! ```text
//! hashring stats
//! hashring lookup user-123 product-456
//! hashring replicas important-data --count 3
//! hashring churn --remove node-3 --keys 10000
//! hashring -c ring.json --vnodes 64 distribution --keys 5000 --json
//! ```

use clap::Parser;
use hashring_cli::CliConfig;

fn main() -> anyhow::Result<()> {
    CliConfig::parse().run()
}
