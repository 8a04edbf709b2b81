//! Database handle types for RocksDB storage.
//!
//! - `DatabaseHandle`: enum wrapping the read-only and read-write instances
//! - `StorageMode`: how the database should be opened
//! - `StorageOptions`: default RocksDB options per access mode

use rocksdb::{Options, TransactionDB, DB};

// ============================================================================
// DatabaseHandle
// ============================================================================

/// Handle for either a read-only DB or a read-write TransactionDB.
pub enum DatabaseHandle {
    /// Read-only database access
    ReadOnly(DB),
    /// Read-write access with transaction support
    ReadWrite(TransactionDB),
}

impl DatabaseHandle {
    /// Get TransactionDB reference if in ReadWrite mode.
    pub fn as_transaction_db(&self) -> Option<&TransactionDB> {
        match self {
            DatabaseHandle::ReadWrite(txn_db) => Some(txn_db),
            DatabaseHandle::ReadOnly(_) => None,
        }
    }

    /// Get DB reference if in ReadOnly mode.
    pub fn as_db(&self) -> Option<&DB> {
        match self {
            DatabaseHandle::ReadOnly(db) => Some(db),
            DatabaseHandle::ReadWrite(_) => None,
        }
    }

    /// Check if this is a read-write handle with transaction support.
    pub fn is_read_write(&self) -> bool {
        matches!(self, DatabaseHandle::ReadWrite(_))
    }
}

// ============================================================================
// StorageMode
// ============================================================================

/// Storage access mode configuration.
pub enum StorageMode {
    /// Read-only access - multiple instances can open simultaneously
    ReadOnly,
    /// Read-write access with exclusive TransactionDB
    ReadWrite,
}

// ============================================================================
// StorageOptions
// ============================================================================

/// Default RocksDB options factory for each storage mode.
pub struct StorageOptions;

impl StorageOptions {
    /// Default options for read-write mode.
    ///
    /// Settings:
    /// - `create_if_missing`: true (create new DBs)
    /// - `create_missing_column_families`: true (auto-create CFs)
    /// - Parallelism: uses available CPU cores for background jobs
    pub fn default_for_readwrite() -> Options {
        let mut options = Options::default();
        options.set_error_if_exists(false);
        options.create_if_missing(true);
        options.create_missing_column_families(true);

        let num_cpus = std::thread::available_parallelism()
            .map(|p| p.get() as i32)
            .unwrap_or(4);
        options.increase_parallelism(num_cpus);
        options.set_max_background_jobs(num_cpus.min(8));

        options
    }

    /// Default options for read-only mode.
    ///
    /// The database must already exist; missing column families are an error.
    pub fn default_for_readonly() -> Options {
        let mut options = Options::default();
        options.set_error_if_exists(false);
        options.create_if_missing(false);
        options.create_missing_column_families(false);
        options
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_options_readwrite() {
        let opts = StorageOptions::default_for_readwrite();
        drop(opts);
    }

    #[test]
    fn test_storage_options_readonly() {
        let opts = StorageOptions::default_for_readonly();
        drop(opts);
    }
}
