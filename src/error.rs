//! Error types for the sharded cache
//!
//! Provides unified error handling using thiserror.

use thiserror::Error;

// == Cache Error Enum ==
/// Unified error type for the sharded cache.
///
/// A lookup miss is not an error: `get` returns `None` and `remove` is a no-op.
#[derive(Error, Debug)]
pub enum CacheError {
    /// A key could not be turned into a deterministic byte encoding
    #[error("could not encode key of type {type_name} as bytes: {reason}")]
    KeyEncoding {
        type_name: &'static str,
        reason: String,
    },

    /// A configuration value was present but unusable
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl CacheError {
    // == Key Encoding ==
    /// Builds a [`CacheError::KeyEncoding`] for the key type `T`.
    pub fn key_encoding<T: ?Sized>(reason: impl ToString) -> Self {
        CacheError::KeyEncoding {
            type_name: std::any::type_name::<T>(),
            reason: reason.to_string(),
        }
    }
}

// == Result Type Alias ==
/// Convenience Result type for the sharded cache.
pub type Result<T> = std::result::Result<T, CacheError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_encoding_message_names_type() {
        let err = CacheError::key_encoding::<Vec<u8>>("boom");
        let msg = err.to_string();
        assert!(msg.contains("alloc::vec::Vec<u8>"));
        assert!(msg.contains("boom"));
    }

    #[test]
    fn test_invalid_config_message() {
        let err = CacheError::InvalidConfig("LRU_SHARDS=abc".to_string());
        assert_eq!(err.to_string(), "Invalid configuration: LRU_SHARDS=abc");
    }
}
