//! Shard Router Module
//!
//! Maps keys to shard indices with 32-bit FNV-1a over the key's routing bytes.
//! The hash is unseeded, so the same key lands on the same shard in every
//! process and on every call.

use std::fmt;

use crate::cache::key::ShardKey;

/// FNV-1a 32-bit offset basis.
pub const FNV_OFFSET_BASIS: u32 = 0x811c_9dc5;
/// FNV-1a 32-bit prime.
pub const FNV_PRIME: u32 = 0x0100_0193;

/// Sentinel key whose shard backs `Cache::peek_front`.
pub const FRONT_SENTINEL: u64 = 1;

// == FNV-1a Hasher ==
/// Streaming 32-bit FNV-1a hasher.
///
/// Writing a byte sequence in several pieces yields the same hash as writing
/// it in one go, so keys can feed their encoding incrementally.
#[derive(Debug, Clone, Copy)]
pub struct Fnv1a32 {
    state: u32,
}

impl Fnv1a32 {
    pub fn new() -> Self {
        Self {
            state: FNV_OFFSET_BASIS,
        }
    }

    /// Folds `bytes` into the hash.
    pub fn write(&mut self, bytes: &[u8]) {
        for &byte in bytes {
            self.state ^= u32::from(byte);
            self.state = self.state.wrapping_mul(FNV_PRIME);
        }
    }

    pub fn finish(&self) -> u32 {
        self.state
    }
}

impl Default for Fnv1a32 {
    fn default() -> Self {
        Self::new()
    }
}

/// Lets `Display` output stream straight into the hash.
impl fmt::Write for Fnv1a32 {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.write(s.as_bytes());
        Ok(())
    }
}

/// Hashes a byte slice with 32-bit FNV-1a.
pub fn fnv1a_32(bytes: &[u8]) -> u32 {
    let mut hasher = Fnv1a32::new();
    hasher.write(bytes);
    hasher.finish()
}

/// Hashes a key's routing bytes.
pub fn hash_key<K: ShardKey + ?Sized>(key: &K) -> u32 {
    let mut hasher = Fnv1a32::new();
    key.write_shard_bytes(&mut hasher);
    hasher.finish()
}

// == Shard Router ==
/// Deterministic key-to-shard mapping.
///
/// The index is `hash % shard_count`, so any shard count covers the full
/// index range, not only powers of two.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShardRouter {
    shards: usize,
    front_shard: usize,
}

impl ShardRouter {
    // == Constructor ==
    /// Creates a router over `shards` shards, clamped to at least 1.
    pub fn new(shards: usize) -> Self {
        let shards = shards.max(1);
        let front_shard = index_for(hash_key(&FRONT_SENTINEL), shards);
        Self {
            shards,
            front_shard,
        }
    }

    /// Returns the number of shards routed over.
    pub fn shard_count(&self) -> usize {
        self.shards
    }

    // == Shard For ==
    /// Returns the shard index in `[0, shard_count)` for `key`.
    pub fn shard_for<K: ShardKey + ?Sized>(&self, key: &K) -> usize {
        index_for(hash_key(key), self.shards)
    }

    /// Returns the shard consulted by `peek_front`.
    pub fn front_shard(&self) -> usize {
        self.front_shard
    }
}

impl Default for ShardRouter {
    fn default() -> Self {
        Self::new(1)
    }
}

fn index_for(hash: u32, shards: usize) -> usize {
    // u32 -> usize is lossless on every supported target
    hash as usize % shards
}
