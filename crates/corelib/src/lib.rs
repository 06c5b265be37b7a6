//! Consistent hashing ring.
//!
//! This crate maps string keys onto a changing set of physical nodes:
//! - Tokens and partitioners (hash functions onto the 64-bit ring)
//! - Physical and virtual node abstractions
//! - The thread-safe [`HashRing`] with lookup, replica lookup and statistics
//! - Ring configuration and a builder for seeding nodes
//!
//! Adding or removing one of `N` nodes only moves roughly `1/N` of the keys.

pub mod config;
pub mod error;
pub mod node;
pub mod partitioner;
pub mod ring;
pub mod token;
pub mod vnode;

pub use config::RingConfig;
pub use error::{Error, Result};
pub use node::{NodeId, PhysicalNode};
pub use partitioner::Partitioner;
pub use ring::{HashRing, RingBuilder, RingStats};
pub use token::Token;
pub use vnode::VirtualNode;
