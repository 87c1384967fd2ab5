//! Error types for cache operations.

use std::fmt;

/// Errors that can occur during cache operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheError {
    /// Key not found (for GET/UPDATE/DELETE operations).
    NotFound,

    /// Key already exists (for ADD operations).
    KeyExists,

    /// The allocator, defragmenter, and evictor together could not free
    /// enough contiguous pages. The live set has been exhausted.
    OutOfCapacity,

    /// The value needs more pages than the arena holds; the request is
    /// unsatisfiable even on an empty cache.
    PayloadTooLarge,
}

impl fmt::Display for CacheError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound => write!(f, "key not found"),
            Self::KeyExists => write!(f, "key already exists"),
            Self::OutOfCapacity => write!(f, "out of capacity"),
            Self::PayloadTooLarge => write!(f, "payload too large"),
        }
    }
}

impl std::error::Error for CacheError {}

/// Result type for cache operations.
pub type CacheResult<T> = Result<T, CacheError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_all_variants() {
        assert_eq!(format!("{}", CacheError::NotFound), "key not found");
        assert_eq!(format!("{}", CacheError::KeyExists), "key already exists");
        assert_eq!(format!("{}", CacheError::OutOfCapacity), "out of capacity");
        assert_eq!(
            format!("{}", CacheError::PayloadTooLarge),
            "payload too large"
        );
    }

    #[test]
    fn test_error_is_error_trait() {
        fn assert_error<E: std::error::Error>() {}
        assert_error::<CacheError>();
    }

    #[test]
    fn test_error_equality() {
        assert_eq!(CacheError::NotFound, CacheError::NotFound);
        assert_ne!(CacheError::NotFound, CacheError::KeyExists);
    }

    #[test]
    fn test_cache_result() {
        let ok: CacheResult<u32> = Ok(7);
        assert!(matches!(ok, Ok(7)));

        let err: CacheResult<u32> = Err(CacheError::OutOfCapacity);
        assert!(matches!(err, Err(CacheError::OutOfCapacity)));
    }
}
