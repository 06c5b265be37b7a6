//! Partitioner abstraction for consistent hashing.
//!
//! Partitioners convert keys and virtual node ids into tokens that can be
//! placed on the hash ring. The same partitioner must hash both so that keys
//! and virtual nodes share one coordinate space.

pub mod murmur3;
pub mod siphash;
pub mod traits;
pub mod xxhash;

pub use self::murmur3::Murmur3Partitioner;
pub use self::siphash::SipHashPartitioner;
pub use self::traits::Partitioner;
pub use self::xxhash::XxHash3Partitioner;
