//! Configuration for the numeric index.

use super::bucket::MAX_DELTA;

/// Tuning knobs for [`super::NumericIndex`].
#[derive(Debug, Clone)]
pub struct NumericIndexConfig {
    /// Entry count at which a bucket splits. Default: 1024.
    ///
    /// A bucket wholly occupied by one value is allowed to exceed this
    /// rather than spread the value across two buckets; that relaxation is
    /// bounded only by the u16 entry count of the payload format.
    pub max_bucket_size: usize,
}

impl NumericIndexConfig {
    /// Widest value offset a bucket can cover, fixed by the u16 delta width
    /// of the payload format. Not configurable.
    pub const MAX_DELTA: u32 = MAX_DELTA;
}

impl Default for NumericIndexConfig {
    fn default() -> Self {
        Self {
            max_bucket_size: 1024,
        }
    }
}
