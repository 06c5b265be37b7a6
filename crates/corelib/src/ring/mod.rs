//! Consistent hash ring implementation.
//!
//! The ring manages token positions and provides efficient lookup
//! operations for finding the nodes responsible for keys.

pub mod builder;
pub mod ring;
pub mod stats;

pub use builder::RingBuilder;
pub use ring::HashRing;
pub use stats::RingStats;

/// Alias for the main ring type (used by lib.rs).
pub type Ring = HashRing;
