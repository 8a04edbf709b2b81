//! Column family trait definitions.
//!
//! - `ColumnFamily`: base marker trait carrying `CF_NAME`, the single source
//!   of truth for a column family's name.
//! - `ColumnFamilyConfig<C>`: RocksDB tuning for the column family, built
//!   against the shared block cache and a subsystem config type `C`.
//!
//! Key and value serialization is left to the column family's own inherent
//! methods: keys use direct byte concatenation so their lexicographic order
//! is meaningful to scans, and value formats vary per family.

use rocksdb::{Cache, Options};

/// Base marker trait for column family types.
///
/// # Example
///
/// ```rust,ignore
/// impl ColumnFamily for NumericForward {
///     const CF_NAME: &'static str = "filter/numeric_forward";
/// }
/// ```
pub trait ColumnFamily {
    /// Column family name (with subsystem prefix, e.g. "filter/numeric_forward")
    const CF_NAME: &'static str;
}

/// RocksDB configuration trait with a subsystem-specific config type.
///
/// The type parameter `C` lets each subsystem tune its column families from
/// its own configuration struct while sharing one block cache.
pub trait ColumnFamilyConfig<C>: ColumnFamily {
    /// Create column family options with shared block cache and config.
    fn cf_options(cache: &Cache, config: &C) -> Options;
}
