//! Configuration types for RocksDB storage.

// ============================================================================
// BlockCacheConfig
// ============================================================================

/// Configuration for the shared RocksDB block cache.
///
/// One LRU cache is shared across all of a subsystem's column families so
/// RocksDB can allocate memory to whichever families are hot.
#[derive(Debug, Clone)]
pub struct BlockCacheConfig {
    /// Total block cache size in bytes.
    /// Default: 128MB.
    pub cache_size_bytes: usize,

    /// Block size for column families holding small point-lookup records.
    /// Default: 4KB.
    pub default_block_size: usize,

    /// Block size for column families holding larger sequentially-scanned
    /// payloads (bucket blobs). Default: 16KB.
    pub large_block_size: usize,
}

impl Default for BlockCacheConfig {
    fn default() -> Self {
        Self {
            cache_size_bytes: 128 * 1024 * 1024,
            default_block_size: 4 * 1024,
            large_block_size: 16 * 1024,
        }
    }
}

impl BlockCacheConfig {
    /// Create config with specified cache size, using defaults for other settings.
    pub fn with_cache_size(cache_size_bytes: usize) -> Self {
        Self {
            cache_size_bytes,
            ..Default::default()
        }
    }
}
