//! Cache Module
//!
//! Provides a sharded in-memory cache with least-recently-used eviction.

mod entry;
mod key;
mod lru;
mod router;
mod shard;
mod stats;
mod store;


// Re-export public types
pub use entry::Entry;
pub use key::{ByteView, FixedWidth, ShardKey, Structural, TextView};
pub use lru::{LruList, SlotId};
pub use router::{fnv1a_32, hash_key, Fnv1a32, ShardRouter, FRONT_SENTINEL};
pub use shard::Shard;
pub use stats::CacheStats;
pub use store::{Cache, CacheBuilder, TraverseOrder};
