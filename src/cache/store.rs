//! Cache Store Module
//!
//! The top-level sharded LRU cache. Each key is routed to exactly one shard,
//! so single-key operations only ever lock that shard.
//!
//! Recency is tracked per shard. With more than one shard, `peek_front`
//! and traversal reflect per-shard recency only:
//!
//! - `peek_front` returns the most recently used entry of one fixed shard,
//!   not the most recently used entry of the whole cache.
//! - traversal walks shards in index order and, inside each shard, in
//!   recency order. The result is grouped by shard, not merged by recency.
//!
//! With a single shard both are exact.

use std::borrow::Borrow;
use std::hash::Hash;

use tracing::{debug, trace, warn};

use crate::cache::router::ShardRouter;
use crate::cache::shard::Shard;
use crate::cache::{CacheStats, ShardKey};

// == Traverse Order ==
/// Direction of a traversal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TraverseOrder {
    /// Most recently used first
    #[default]
    MostRecentFirst,
    /// Least recently used first
    LeastRecentFirst,
}

// == Cache Builder ==
/// Construction options for [`Cache`].
///
/// Defaults: unbounded capacity, one shard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheBuilder {
    capacity: usize,
    shards: usize,
}

impl CacheBuilder {
    pub fn new() -> Self {
        Self {
            capacity: 0,
            shards: 1,
        }
    }

    /// Total number of entries to hold; 0 means unbounded.
    pub fn capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    /// Number of independently locked shards; values below 1 become 1.
    pub fn shards(mut self, shards: usize) -> Self {
        self.shards = shards;
        self
    }

    // == Build ==
    /// Creates the cache.
    ///
    /// Each shard gets `capacity / shards` entries. The remainder of the
    /// division is not redistributed, so the effective total can be lower
    /// than `capacity`. A bounded capacity smaller than the shard count
    /// leaves every shard with a capacity of 0, which is unbounded.
    pub fn build<K, V>(self) -> Cache<K, V> {
        let router = ShardRouter::new(self.shards);
        let shard_count = router.shard_count();
        let shard_capacity = self.capacity / shard_count;

        if self.capacity > 0 {
            if shard_capacity == 0 {
                warn!(
                    capacity = self.capacity,
                    shards = shard_count,
                    "capacity is smaller than the shard count; shards are unbounded"
                );
            } else if self.capacity % shard_count != 0 {
                warn!(
                    capacity = self.capacity,
                    shards = shard_count,
                    effective = shard_capacity * shard_count,
                    "capacity does not divide evenly across shards; remainder is unused"
                );
            }
        }

        debug!(
            capacity = self.capacity,
            shards = shard_count,
            shard_capacity,
            "sharded LRU cache created"
        );

        Cache {
            capacity: self.capacity,
            shard_capacity,
            shards: (0..shard_count).map(|_| Shard::new(shard_capacity)).collect(),
            router,
        }
    }
}

impl Default for CacheBuilder {
    fn default() -> Self {
        Self::new()
    }
}

// == Cache ==
/// A least-recently-used cache split into independently locked shards.
///
/// The shard count is fixed for the cache's lifetime. `Cache::default()` is
/// a usable single-shard, unbounded cache.
///
/// Traversal callbacks run while the visited shard is locked and must not
/// call back into the same cache.
#[derive(Debug)]
pub struct Cache<K, V> {
    capacity: usize,
    shard_capacity: usize,
    shards: Box<[Shard<K, V>]>,
    router: ShardRouter,
}

impl<K, V> Cache<K, V> {
    // == Constructor ==
    /// Creates a cache holding about `capacity` entries (0 = unbounded)
    /// across `shards` shards.
    pub fn new(capacity: usize, shards: usize) -> Self {
        CacheBuilder::new().capacity(capacity).shards(shards).build()
    }

    pub fn builder() -> CacheBuilder {
        CacheBuilder::new()
    }

    /// Returns the configured total capacity (0 = unbounded).
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Returns the capacity of each shard (0 = unbounded).
    pub fn shard_capacity(&self) -> usize {
        self.shard_capacity
    }

    pub fn shard_count(&self) -> usize {
        self.shards.len()
    }

    // == Length ==
    /// Returns the number of entries across all shards.
    ///
    /// Each shard's count is read without locking. The sum is not a
    /// point-in-time snapshot while other threads are writing.
    pub fn len(&self) -> usize {
        self.shards.iter().map(Shard::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.shards.iter().all(Shard::is_empty)
    }

    // == Stats ==
    /// Returns counters summed over all shards.
    pub fn stats(&self) -> CacheStats {
        self.shards.iter().fold(CacheStats::new(), |mut total, shard| {
            total.merge(&shard.stats());
            total
        })
    }

    // == Traverse ==
    /// Visits entries from most to least recently used within each shard.
    ///
    /// Stops as soon as `visit` returns false.
    pub fn traverse<F>(&self, visit: F)
    where
        F: FnMut(&K, &V) -> bool,
    {
        self.traverse_ordered(visit, TraverseOrder::MostRecentFirst)
    }

    /// Visits entries from least to most recently used within each shard.
    ///
    /// Stops as soon as `visit` returns false.
    pub fn traverse_reverse<F>(&self, visit: F)
    where
        F: FnMut(&K, &V) -> bool,
    {
        self.traverse_ordered(visit, TraverseOrder::LeastRecentFirst)
    }

    /// Visits shards 0..N in turn, each in `order`, locking one shard at a
    /// time. Stops across all shards the first time `visit` returns false.
    pub fn traverse_ordered<F>(&self, mut visit: F, order: TraverseOrder)
    where
        F: FnMut(&K, &V) -> bool,
    {
        for shard in self.shards.iter() {
            if !shard.traverse(order, &mut visit) {
                return;
            }
        }
    }
}

impl<K, V> Cache<K, V>
where
    K: Hash + Eq + Clone + ShardKey,
{
    fn shard_for<Q>(&self, key: &Q) -> &Shard<K, V>
    where
        Q: ShardKey + ?Sized,
    {
        &self.shards[self.router.shard_for(key)]
    }

    // == Add ==
    /// Stores `value` under `key` as the most recently used entry of its shard.
    ///
    /// An existing key has its value replaced. If the shard is over capacity
    /// afterwards, its least recently used entry is dropped.
    pub fn add(&self, key: K, value: V) {
        let shard = self.shard_for(&key);
        if shard.add(key, value).is_some() {
            trace!(shard_len = shard.len(), "evicted least recently used entry");
        }
    }

    // == Get ==
    /// Returns a copy of the value for `key`, promoting it within its shard.
    ///
    /// A miss returns None and leaves the cache untouched.
    pub fn get<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ShardKey + ?Sized,
        V: Clone,
    {
        self.shard_for(key).get(key)
    }

    // == Contains ==
    /// Checks whether `key` is cached without promoting it.
    pub fn contains<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ShardKey + ?Sized,
    {
        self.shard_for(key).contains(key)
    }

    // == Remove ==
    /// Removes `key`, returning its value. Removing an absent key is a no-op.
    pub fn remove<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ShardKey + ?Sized,
    {
        self.shard_for(key).remove(key)
    }

    // == Peek Front ==
    /// Returns the most recently used entry of the shard owning the sentinel
    /// key `1u64`, without changing any order.
    ///
    /// This is only the global most recently used entry when there is one shard.
    pub fn peek_front(&self) -> Option<(K, V)>
    where
        V: Clone,
    {
        self.shards[self.router.front_shard()].front()
    }

    // == Clear ==
    /// Drops all entries. Statistics are kept.
    pub fn clear(&self) {
        for shard in self.shards.iter() {
            shard.clear();
        }
    }
}

impl<K, V> Default for Cache<K, V> {
    fn default() -> Self {
        CacheBuilder::new().build()
    }
}
