//! Sharded LRU - an in-memory least-recently-used cache
//!
//! Keys are spread over independently locked shards by a deterministic
//! FNV-1a router, so threads working on different shards never contend.

pub mod cache;
pub mod config;
pub mod error;

pub use cache::{Cache, CacheBuilder, CacheStats, ShardKey, Structural, TraverseOrder};
pub use config::Config;
pub use error::{CacheError, Result};
