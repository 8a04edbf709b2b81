//! Filter storage subsystem implementation.
//!
//! Defines the filter subsystem for use with `store::Storage<S>`.

use rocksdb::{Cache, ColumnFamilyDescriptor};

use crate::store::{BlockCacheConfig, ColumnFamily, ColumnFamilyConfig, StorageSubsystem};

use super::schema::{NumericForward, NumericInverted, ALL_COLUMN_FAMILIES};

/// Filter storage subsystem: the forward and inverted numeric index
/// column families.
pub struct Subsystem;

impl StorageSubsystem for Subsystem {
    const NAME: &'static str = "filter";
    const COLUMN_FAMILIES: &'static [&'static str] = ALL_COLUMN_FAMILIES;

    fn cf_descriptors(
        block_cache: &Cache,
        config: &BlockCacheConfig,
    ) -> Vec<ColumnFamilyDescriptor> {
        vec![
            ColumnFamilyDescriptor::new(
                NumericForward::CF_NAME,
                NumericForward::cf_options(block_cache, config),
            ),
            ColumnFamilyDescriptor::new(
                NumericInverted::CF_NAME,
                NumericInverted::cf_options(block_cache, config),
            ),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subsystem_constants() {
        assert_eq!(Subsystem::NAME, "filter");
        assert!(!Subsystem::COLUMN_FAMILIES.is_empty());
        // All CFs carry the filter/ prefix
        for cf in Subsystem::COLUMN_FAMILIES {
            assert!(cf.starts_with("filter/"), "CF {} should have filter/ prefix", cf);
        }
    }

    #[test]
    fn test_cf_descriptors_cover_all_families() {
        let cache = Cache::new_lru_cache(1024 * 1024);
        let config = BlockCacheConfig::default();
        let descriptors = Subsystem::cf_descriptors(&cache, &config);
        assert_eq!(descriptors.len(), Subsystem::COLUMN_FAMILIES.len());
    }
}
