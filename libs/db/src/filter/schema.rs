//! Column family definitions and key codecs for the numeric filter index.
//!
//! All filter CFs use the `filter/` prefix to avoid collisions with other
//! subsystems.
//!
//! ## Key formats
//!
//! Keys are direct byte concatenations so that RocksDB's lexicographic
//! comparator gives them a useful order:
//!
//! ```text
//! filter/numeric_forward   [field] ":" [ascii decimal id]
//! filter/numeric_inverted  [field] ":" [base: u32 BE]
//! ```
//!
//! The bucket base is big-endian so that, within one field's prefix, key
//! order equals numeric order of the bases — range scans walk buckets in
//! value order. The last four bytes of every inverted key are the base;
//! field names are free-form apart from that framing guarantee.
//!
//! ## Value formats
//!
//! Forward values are the record's current [`SortableValue`] as four
//! little-endian bytes. Inverted values are bucket payloads
//! (see [`super::bucket`]).

use rocksdb::{BlockBasedOptions, Cache, Options};

use crate::store::{BlockCacheConfig, ColumnFamily, ColumnFamilyConfig};

use super::error::{Error, Result};
use super::sortable::SortableValue;

// ============================================================================
// Record identifiers
// ============================================================================

/// External record identifier.
///
/// 32-bit by default; the `id64` cargo feature widens it to 64 bits. The
/// width changes the bucket payload layout, so databases are not portable
/// across the setting.
#[cfg(not(feature = "id64"))]
pub type DocId = u32;
/// External record identifier (64-bit build).
#[cfg(feature = "id64")]
pub type DocId = u64;

/// Bitmap over [`DocId`]s, matching the configured id width.
#[cfg(not(feature = "id64"))]
pub type DocIdBitmap = roaring::RoaringBitmap;
/// Bitmap over [`DocId`]s (64-bit build).
#[cfg(feature = "id64")]
pub type DocIdBitmap = roaring::RoaringTreemap;

/// Serialized width of a [`DocId`] in bucket payloads.
pub(crate) const DOC_ID_LEN: usize = std::mem::size_of::<DocId>();

#[cfg(not(feature = "id64"))]
pub(crate) fn doc_id_from_le_bytes(bytes: &[u8]) -> DocId {
    u32::from_le_bytes(bytes.try_into().unwrap())
}

#[cfg(feature = "id64")]
pub(crate) fn doc_id_from_le_bytes(bytes: &[u8]) -> DocId {
    u64::from_le_bytes(bytes.try_into().unwrap())
}

// ============================================================================
// Column family names
// ============================================================================

/// All column family names for the filter subsystem.
pub const ALL_COLUMN_FAMILIES: &[&str] = &[NumericForward::CF_NAME, NumericInverted::CF_NAME];

// ============================================================================
// NumericForward CF
// ============================================================================

/// Forward index column family: (field, id) -> current SortableValue.
///
/// Source of truth for whether a record carries a value on a field and what
/// that value is. The inverted index is derived from it.
///
/// Key: `[field] ":" [ascii decimal id]`
/// Value: `[SortableValue: u32 LE]` = 4 bytes
pub struct NumericForward;

impl NumericForward {
    /// Build the forward key for (field, id).
    pub fn key(field: &str, id: DocId) -> Vec<u8> {
        let id_str = id.to_string();
        let mut key = Vec::with_capacity(field.len() + 1 + id_str.len());
        key.extend_from_slice(field.as_bytes());
        key.push(b':');
        key.extend_from_slice(id_str.as_bytes());
        key
    }

    /// Serialize a forward value.
    pub fn value_to_bytes(value: SortableValue) -> [u8; 4] {
        value.to_le_bytes()
    }

    /// Deserialize a forward value.
    pub fn value_from_bytes(bytes: &[u8]) -> Result<SortableValue> {
        if bytes.len() != 4 {
            return Err(Error::Corrupt(format!(
                "forward value must be 4 bytes, got {}",
                bytes.len()
            )));
        }
        Ok(u32::from_le_bytes(bytes.try_into().unwrap()))
    }
}

impl ColumnFamily for NumericForward {
    const CF_NAME: &'static str = "filter/numeric_forward";
}

impl ColumnFamilyConfig<BlockCacheConfig> for NumericForward {
    fn cf_options(cache: &Cache, config: &BlockCacheConfig) -> Options {
        let mut opts = Options::default();
        let mut block_opts = BlockBasedOptions::default();
        // Point lookups dominate this CF.
        block_opts.set_bloom_filter(10.0, false);
        block_opts.set_block_cache(cache);
        block_opts.set_block_size(config.default_block_size);
        opts.set_block_based_table_factory(&block_opts);
        opts
    }
}

// ============================================================================
// NumericInverted CF
// ============================================================================

/// Inverted index column family: (field, base) -> bucket payload.
///
/// Key: `[field] ":" [base: u32 BE]`
/// Value: bucket payload, up to a few KB (see [`super::bucket`])
pub struct NumericInverted;

impl NumericInverted {
    /// Build the bucket key for (field, base).
    pub fn key(field: &str, base: SortableValue) -> Vec<u8> {
        let mut key = Vec::with_capacity(field.len() + 5);
        key.extend_from_slice(field.as_bytes());
        key.push(b':');
        key.extend_from_slice(&base.to_be_bytes());
        key
    }

    /// Extract the base from a bucket key: its last four bytes, big-endian.
    pub fn base_from_key(key: &[u8]) -> Result<SortableValue> {
        if key.len() < 4 {
            return Err(Error::Corrupt(format!(
                "bucket key must be at least 4 bytes, got {}",
                key.len()
            )));
        }
        let tail: [u8; 4] = key[key.len() - 4..].try_into().unwrap();
        Ok(u32::from_be_bytes(tail))
    }

    /// The `[field] ":"` prefix shared by all of a field's bucket keys.
    pub fn field_prefix(field: &str) -> Vec<u8> {
        let mut prefix = Vec::with_capacity(field.len() + 1);
        prefix.extend_from_slice(field.as_bytes());
        prefix.push(b':');
        prefix
    }

    /// Test whether `key` belongs to `field`.
    pub fn has_field_prefix(key: &[u8], field: &str) -> bool {
        key.len() > field.len()
            && key[..field.len()] == *field.as_bytes()
            && key[field.len()] == b':'
    }
}

impl ColumnFamily for NumericInverted {
    const CF_NAME: &'static str = "filter/numeric_inverted";
}

impl ColumnFamilyConfig<BlockCacheConfig> for NumericInverted {
    fn cf_options(cache: &Cache, config: &BlockCacheConfig) -> Options {
        let mut opts = Options::default();
        let mut block_opts = BlockBasedOptions::default();
        block_opts.set_block_cache(cache);
        // Bucket payloads are read whole during ordered scans.
        block_opts.set_block_size(config.large_block_size);
        opts.set_block_based_table_factory(&block_opts);
        opts
    }
}
