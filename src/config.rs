//! Configuration Module
//!
//! Loads cache and workload settings from environment variables.

use std::env;
use std::str::FromStr;

use crate::cache::CacheBuilder;
use crate::error::{CacheError, Result};

/// Cache and workload configuration.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Total number of entries the cache can hold (0 = unbounded)
    pub capacity: usize,
    /// Number of independently locked shards
    pub shards: usize,
    /// Number of worker threads driving the demo workload
    pub workers: usize,
    /// Operations each worker performs
    pub ops_per_worker: usize,
    /// Number of distinct keys the workload draws from
    pub key_space: u64,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `LRU_CAPACITY` - Total cache entries, 0 = unbounded (default: 10000)
    /// - `LRU_SHARDS` - Shard count (default: 16)
    /// - `LRU_WORKERS` - Worker threads (default: 4)
    /// - `LRU_OPS_PER_WORKER` - Operations per worker (default: 100000)
    /// - `LRU_KEY_SPACE` - Distinct keys in the workload (default: 20000)
    ///
    /// Unset variables fall back to their default; set but unparsable ones
    /// are an error.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Builds a Config from any name -> value source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        Ok(Self {
            capacity: parse_var(&lookup, "LRU_CAPACITY", defaults.capacity)?,
            shards: parse_var(&lookup, "LRU_SHARDS", defaults.shards)?,
            workers: parse_var(&lookup, "LRU_WORKERS", defaults.workers)?,
            ops_per_worker: parse_var(&lookup, "LRU_OPS_PER_WORKER", defaults.ops_per_worker)?,
            key_space: parse_var(&lookup, "LRU_KEY_SPACE", defaults.key_space)?,
        })
    }

    /// Returns a cache builder carrying this configuration's cache settings.
    pub fn cache_builder(&self) -> CacheBuilder {
        CacheBuilder::new()
            .capacity(self.capacity)
            .shards(self.shards)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            capacity: 10_000,
            shards: 16,
            workers: 4,
            ops_per_worker: 100_000,
            key_space: 20_000,
        }
    }
}

fn parse_var<F, T>(lookup: &F, name: &str, default: T) -> Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(name) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| CacheError::InvalidConfig(format!("{name}={raw}"))),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name: &str| vars.get(name).cloned()
    }

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.capacity, 10_000);
        assert_eq!(config.shards, 16);
        assert_eq!(config.workers, 4);
        assert_eq!(config.ops_per_worker, 100_000);
        assert_eq!(config.key_space, 20_000);
    }

    #[test]
    fn test_config_from_lookup_defaults() {
        let config = Config::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_config_from_lookup_overrides() {
        let config = Config::from_lookup(lookup_from(&[
            ("LRU_CAPACITY", "0"),
            ("LRU_SHARDS", " 3 "),
            ("LRU_KEY_SPACE", "42"),
        ]))
        .unwrap();
        assert_eq!(config.capacity, 0);
        assert_eq!(config.shards, 3);
        assert_eq!(config.key_space, 42);
        assert_eq!(config.workers, 4);
    }

    #[test]
    fn test_config_rejects_garbage() {
        let err = Config::from_lookup(lookup_from(&[("LRU_SHARDS", "many")])).unwrap_err();
        assert!(matches!(err, CacheError::InvalidConfig(ref msg) if msg == "LRU_SHARDS=many"));
    }

    #[test]
    fn test_config_rejects_negative_capacity() {
        let result = Config::from_lookup(lookup_from(&[("LRU_CAPACITY", "-5")]));
        assert!(matches!(result, Err(CacheError::InvalidConfig(_))));
    }

    #[test]
    fn test_config_cache_builder() {
        let config = Config {
            capacity: 8,
            shards: 2,
            ..Config::default()
        };
        let cache: crate::Cache<u64, u64> = config.cache_builder().build();
        assert_eq!(cache.shard_count(), 2);
        assert_eq!(cache.shard_capacity(), 4);
    }
}
