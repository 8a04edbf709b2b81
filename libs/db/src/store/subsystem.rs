//! Storage subsystem trait.
//!
//! A subsystem declares the column families it owns and how each is tuned.
//! `Storage<S>` uses the declarations to open the database with every
//! family present and configured against the shared block cache.

use rocksdb::{Cache, ColumnFamilyDescriptor};

use super::config::BlockCacheConfig;

/// Trait for RocksDB storage subsystems used with [`super::Storage`].
///
/// # Example
///
/// ```ignore
/// struct MySubsystem;
///
/// impl StorageSubsystem for MySubsystem {
///     const NAME: &'static str = "my-subsystem";
///     const COLUMN_FAMILIES: &'static [&'static str] = &["my/data"];
///
///     fn cf_descriptors(
///         block_cache: &rocksdb::Cache,
///         config: &BlockCacheConfig,
///     ) -> Vec<rocksdb::ColumnFamilyDescriptor> {
///         vec![/* ... */]
///     }
/// }
///
/// // Use as: Storage<MySubsystem>
/// ```
pub trait StorageSubsystem: Sized {
    /// Subsystem name for logging and identification.
    const NAME: &'static str;

    /// List of column family names managed by this subsystem.
    const COLUMN_FAMILIES: &'static [&'static str];

    /// Build column family descriptors with shared block cache.
    fn cf_descriptors(
        block_cache: &Cache,
        config: &BlockCacheConfig,
    ) -> Vec<ColumnFamilyDescriptor>;
}
