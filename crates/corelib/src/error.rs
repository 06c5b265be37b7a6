//! Error types for the hash ring.
//!
//! Most ring outcomes are expected business conditions (duplicate node,
//! unknown node, blank key, empty ring) and are reported through `bool` or
//! `Option` results. The variants below cover caller contract violations.

use thiserror::Error;

/// Result type alias for the ring library.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in the ring library.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// Replica lookups need at least one replica.
    #[error("invalid replica count {0}: must be at least 1")]
    InvalidReplicaCount(usize),
    /// Node identifiers must be non-blank.
    #[error("invalid node: {0}")]
    InvalidNode(String),
    /// Ring configuration rejected at construction.
    #[error("invalid ring configuration: {0}")]
    InvalidConfig(String),
}
