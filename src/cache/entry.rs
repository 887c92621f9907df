//! Cache Entry Module
//!
//! Defines the key/value pair stored in a shard's recency list.

// == Entry ==
/// A single key/value pair held by a shard.
///
/// Entries are owned by the shard's recency list; the shard's index only
/// refers to them by slot id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry<K, V> {
    /// The key the entry is indexed under
    pub key: K,
    /// The stored value
    pub value: V,
}

impl<K, V> Entry<K, V> {
    // == Constructor ==
    /// Creates a new entry.
    pub fn new(key: K, value: V) -> Self {
        Self { key, value }
    }

    // == Replace ==
    /// Swaps in a new value, returning the old one.
    pub fn replace(&mut self, value: V) -> V {
        std::mem::replace(&mut self.value, value)
    }

    /// Splits the entry into its key and value.
    pub fn into_parts(self) -> (K, V) {
        (self.key, self.value)
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_new() {
        let entry = Entry::new("a", 1);
        assert_eq!(entry.key, "a");
        assert_eq!(entry.value, 1);
    }

    #[test]
    fn test_entry_replace_returns_old_value() {
        let mut entry = Entry::new("a", 1);
        assert_eq!(entry.replace(2), 1);
        assert_eq!(entry.value, 2);
        assert_eq!(entry.key, "a");
    }

    #[test]
    fn test_entry_into_parts() {
        let entry = Entry::new(String::from("k"), vec![1u8, 2]);
        let (key, value) = entry.into_parts();
        assert_eq!(key, "k");
        assert_eq!(value, vec![1, 2]);
    }
}
