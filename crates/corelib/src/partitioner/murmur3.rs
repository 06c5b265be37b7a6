//! Murmur3 partitioner implementation.

use std::io::Cursor;

use crate::partitioner::traits::Partitioner;
use crate::token::Token;

/// MurmurHash3 x64 128-bit, seed 0, keeping the low 64 bits.
///
/// This is the default partitioner for [`HashRing`](crate::ring::HashRing).
#[derive(Clone, Copy, Debug, Default)]
pub struct Murmur3Partitioner;

impl Partitioner for Murmur3Partitioner {
    fn partition(&self, key: &[u8]) -> Token {
        let hash = ::murmur3::murmur3_x64_128(&mut Cursor::new(key), 0)
            .expect("reading from an in-memory buffer cannot fail");
        Token(hash as u64)
    }

    fn name(&self) -> &'static str {
        "Murmur3Partitioner"
    }
}
