//! XXH3 partitioner implementation.

use xxhash_rust::xxh3::xxh3_64;

use crate::partitioner::traits::Partitioner;
use crate::token::Token;

/// XXH3 64-bit partitioner. Faster than Murmur3 on long keys.
#[derive(Clone, Copy, Debug, Default)]
pub struct XxHash3Partitioner;

impl Partitioner for XxHash3Partitioner {
    fn partition(&self, key: &[u8]) -> Token {
        Token(xxh3_64(key))
    }

    fn name(&self) -> &'static str {
        "XxHash3Partitioner"
    }
}
