//! Shard Module
//!
//! One independently locked partition of the cache: a recency list plus an
//! index from key to list slot, kept consistent under a single mutex.

use std::borrow::Borrow;
use std::collections::HashMap;
use std::hash::Hash;
use std::sync::atomic::{AtomicUsize, Ordering};

use parking_lot::Mutex;

use crate::cache::entry::Entry;
use crate::cache::lru::{LruList, SlotId};
use crate::cache::stats::CacheStats;
use crate::cache::store::TraverseOrder;

/// Upper bound on slots reserved up front; larger shards grow on demand.
const MAX_PREALLOCATED: usize = 4096;

#[derive(Debug)]
struct ShardState<K, V> {
    index: HashMap<K, SlotId>,
    order: LruList<Entry<K, V>>,
    stats: CacheStats,
}

// == Shard ==
/// A thread-safe recency-ordered store bounded by a local capacity.
///
/// Invariant: every key in `index` points at exactly one live slot in
/// `order`, every slot in `order` is indexed, and `len == order.len()`.
#[derive(Debug)]
pub struct Shard<K, V> {
    /// 0 = unbounded
    capacity: usize,
    /// Mirrors `order.len()`; written under the lock, read without it
    len: AtomicUsize,
    state: Mutex<ShardState<K, V>>,
}

impl<K, V> Shard<K, V> {
    // == Constructor ==
    /// Creates an empty shard holding at most `capacity` entries (0 = unbounded).
    pub fn new(capacity: usize) -> Self {
        let reserve = capacity.min(MAX_PREALLOCATED);
        Self {
            capacity,
            len: AtomicUsize::new(0),
            state: Mutex::new(ShardState {
                index: HashMap::with_capacity(reserve + 1),
                order: LruList::with_capacity(reserve),
                stats: CacheStats::new(),
            }),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    // == Length ==
    /// Returns the number of entries without taking the lock.
    pub fn len(&self) -> usize {
        self.len.load(Ordering::Acquire)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    // == Stats ==
    /// Returns a copy of this shard's counters.
    pub fn stats(&self) -> CacheStats {
        let state = self.state.lock();
        let mut stats = state.stats.clone();
        stats.total_entries = state.order.len();
        stats
    }

    // == Traverse ==
    /// Calls `visit` for each entry in `order` while holding the lock.
    ///
    /// Returns false if `visit` asked to stop.
    pub fn traverse<F>(&self, order: TraverseOrder, visit: &mut F) -> bool
    where
        F: FnMut(&K, &V) -> bool,
    {
        let state = self.state.lock();
        let mut entries = match order {
            TraverseOrder::MostRecentFirst => state.order.iter(),
            TraverseOrder::LeastRecentFirst => state.order.iter_rev(),
        };
        entries.all(|entry| visit(&entry.key, &entry.value))
    }

    fn sync_len(&self, state: &ShardState<K, V>) {
        self.len.store(state.order.len(), Ordering::Release);
    }
}

impl<K, V> Shard<K, V>
where
    K: Hash + Eq + Clone,
{
    // == Add ==
    /// Inserts or updates `key`, making it the most recently used entry.
    ///
    /// If the insert pushes the shard over capacity, the least recently used
    /// entry is evicted and returned.
    pub fn add(&self, key: K, value: V) -> Option<Entry<K, V>> {
        let mut guard = self.state.lock();
        let state = &mut *guard;

        if let Some(&slot) = state.index.get(&key) {
            if let Some(entry) = state.order.get_mut(slot) {
                entry.replace(value);
            }
            state.order.move_to_front(slot);
            state.stats.record_update();
            return None;
        }

        let slot = state.order.push_front(Entry::new(key.clone(), value));
        state.index.insert(key, slot);
        state.stats.record_insertion();

        let evicted = if self.capacity > 0 && state.order.len() > self.capacity {
            let oldest = state.order.pop_back();
            if let Some(entry) = &oldest {
                state.index.remove(&entry.key);
                state.stats.record_eviction();
            }
            oldest
        } else {
            None
        };

        self.sync_len(state);
        evicted
    }

    // == Get ==
    /// Returns a copy of the value for `key` and promotes it to most recently used.
    pub fn get<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
        V: Clone,
    {
        let mut guard = self.state.lock();
        let state = &mut *guard;

        match state.index.get(key) {
            Some(&slot) => {
                state.order.move_to_front(slot);
                state.stats.record_hit();
                state.order.get(slot).map(|entry| entry.value.clone())
            }
            None => {
                state.stats.record_miss();
                None
            }
        }
    }

    // == Contains ==
    /// Checks for `key` without touching its recency.
    pub fn contains<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.state.lock().index.contains_key(key)
    }

    // == Remove ==
    /// Removes `key` if present and returns its value.
    pub fn remove<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let mut guard = self.state.lock();
        let state = &mut *guard;

        let slot = state.index.remove(key)?;
        let entry = state.order.remove(slot)?;
        state.stats.record_removal();
        self.sync_len(state);
        Some(entry.value)
    }

    // == Front ==
    /// Returns the most recently used entry without changing the order.
    pub fn front(&self) -> Option<(K, V)>
    where
        V: Clone,
    {
        let state = self.state.lock();
        state
            .order
            .front()
            .map(|entry| (entry.key.clone(), entry.value.clone()))
    }

    // == Clear ==
    /// Drops every entry. Counters are kept.
    pub fn clear(&self) {
        let mut state = self.state.lock();
        state.index.clear();
        state.order.clear();
        self.sync_len(&state);
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    fn keys<V>(shard: &Shard<&'static str, V>, order: TraverseOrder) -> Vec<&'static str> {
        let mut out = Vec::new();
        shard.traverse(order, &mut |k: &&'static str, _: &V| {
            out.push(*k);
            true
        });
        out
    }

    #[test]
    fn test_shard_add_and_get() {
        let shard = Shard::new(0);
        assert!(shard.add("a", 1).is_none());
        assert_eq!(shard.get("a"), Some(1));
        assert_eq!(shard.len(), 1);
    }

    #[test]
    fn test_shard_get_missing_is_not_a_mutation() {
        let shard = Shard::new(2);
        shard.add("a", 1);
        shard.add("b", 2);
        assert_eq!(shard.get("zzz"), None);
        assert_eq!(keys(&shard, TraverseOrder::MostRecentFirst), vec!["b", "a"]);
        assert_eq!(shard.len(), 2);
    }

    #[test]
    fn test_shard_update_promotes_without_growing() {
        let shard = Shard::new(0);
        shard.add("a", 1);
        shard.add("b", 2);
        shard.add("a", 10);

        assert_eq!(shard.len(), 2);
        assert_eq!(keys(&shard, TraverseOrder::MostRecentFirst), vec!["a", "b"]);
        assert_eq!(shard.get("a"), Some(10));
    }

    #[test]
    fn test_shard_evicts_least_recent() {
        let shard = Shard::new(2);
        shard.add("a", 1);
        shard.add("b", 2);
        let evicted = shard.add("c", 3);

        assert_eq!(evicted, Some(Entry::new("a", 1)));
        assert_eq!(shard.len(), 2);
        assert_eq!(shard.get("a"), None);
        assert_eq!(shard.get("b"), Some(2));
        assert_eq!(shard.get("c"), Some(3));
    }

    #[test]
    fn test_shard_get_promotes() {
        let shard = Shard::new(2);
        shard.add("a", 1);
        shard.add("b", 2);
        shard.get("a");
        shard.add("c", 3);

        assert!(shard.contains("a"));
        assert!(!shard.contains("b"));
    }

    #[test]
    fn test_shard_contains_does_not_promote() {
        let shard = Shard::new(2);
        shard.add("a", 1);
        shard.add("b", 2);
        assert!(shard.contains("a"));
        shard.add("c", 3);
        assert!(!shard.contains("a"));
    }

    #[test]
    fn test_shard_remove() {
        let shard = Shard::new(0);
        shard.add("a", 1);
        shard.add("b", 2);

        assert_eq!(shard.remove("a"), Some(1));
        assert_eq!(shard.len(), 1);
        assert_eq!(shard.remove("a"), None);
        assert_eq!(shard.len(), 1);
        assert_eq!(shard.get("a"), None);
    }

    #[test]
    fn test_shard_front() {
        let shard: Shard<&str, i32> = Shard::new(0);
        assert_eq!(shard.front(), None);

        shard.add("a", 1);
        shard.add("b", 2);
        assert_eq!(shard.front(), Some(("b", 2)));
        // front does not reorder
        assert_eq!(keys(&shard, TraverseOrder::MostRecentFirst), vec!["b", "a"]);
    }

    #[test]
    fn test_shard_traverse_both_directions_and_stop() {
        let shard = Shard::new(0);
        for (k, v) in [("a", 1), ("b", 2), ("c", 3)] {
            shard.add(k, v);
        }
        assert_eq!(keys(&shard, TraverseOrder::MostRecentFirst), vec!["c", "b", "a"]);
        assert_eq!(keys(&shard, TraverseOrder::LeastRecentFirst), vec!["a", "b", "c"]);

        let mut seen = 0;
        let finished = shard.traverse(TraverseOrder::MostRecentFirst, &mut |_: &&str, _: &i32| {
            seen += 1;
            seen < 2
        });
        assert!(!finished);
        assert_eq!(seen, 2);
    }

    #[test]
    fn test_shard_stats() {
        let shard = Shard::new(1);
        shard.add("a", 1);
        shard.add("a", 2);
        shard.add("b", 3);
        shard.get("b");
        shard.get("a");
        shard.remove("b");

        let stats = shard.stats();
        assert_eq!(stats.insertions, 2);
        assert_eq!(stats.updates, 1);
        assert_eq!(stats.evictions, 1);
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.removals, 1);
        assert_eq!(stats.total_entries, 0);
    }

    #[test]
    fn test_shard_clear() {
        let shard = Shard::new(0);
        shard.add("a", 1);
        shard.add("b", 2);
        shard.clear();
        assert!(shard.is_empty());
        assert_eq!(shard.front(), None);
        shard.add("c", 3);
        assert_eq!(shard.len(), 1);
    }
}
