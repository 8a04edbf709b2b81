//! Generic RocksDB storage parameterized by subsystem.

use std::marker::PhantomData;
use std::path::{Path, PathBuf};

use anyhow::Result;
use rocksdb::{Options, TransactionDB, TransactionDBOptions, DB};

use super::config::BlockCacheConfig;
use super::handle::{DatabaseHandle, StorageMode, StorageOptions};
use super::subsystem::StorageSubsystem;

// ============================================================================
// Storage<S>
// ============================================================================

/// Generic RocksDB storage parameterized by subsystem.
///
/// Owns the database handle and the shared block cache; the subsystem type
/// `S` supplies the column family descriptors.
///
/// # Example
///
/// ```ignore
/// // Define a type alias for ergonomics
/// pub type Storage = store::Storage<FilterSubsystem>;
///
/// let mut storage = filter::Storage::readwrite(path);
/// storage.ready()?;
/// let db = storage.transaction_db()?;
/// ```
pub struct Storage<S: StorageSubsystem> {
    db_path: PathBuf,
    db_options: Options,
    txn_db_options: TransactionDBOptions,
    db: Option<DatabaseHandle>,
    mode: StorageMode,
    block_cache: Option<rocksdb::Cache>,
    block_cache_config: BlockCacheConfig,
    _marker: PhantomData<S>,
}

impl<S: StorageSubsystem> Storage<S> {
    /// Create a new Storage instance in read-only mode.
    ///
    /// Multiple read-only instances can access the same database
    /// simultaneously. Use this for query consumers.
    pub fn readonly(db_path: &Path) -> Self {
        Self {
            db_path: PathBuf::from(db_path),
            db_options: StorageOptions::default_for_readonly(),
            txn_db_options: TransactionDBOptions::default(),
            db: None,
            mode: StorageMode::ReadOnly,
            block_cache: None,
            block_cache_config: BlockCacheConfig::default(),
            _marker: PhantomData,
        }
    }

    /// Create a new Storage instance in read-write mode.
    ///
    /// Only one read-write instance can access the database at a time.
    pub fn readwrite(db_path: &Path) -> Self {
        Self {
            db_path: PathBuf::from(db_path),
            db_options: StorageOptions::default_for_readwrite(),
            txn_db_options: TransactionDBOptions::default(),
            db: None,
            mode: StorageMode::ReadWrite,
            block_cache: None,
            block_cache_config: BlockCacheConfig::default(),
            _marker: PhantomData,
        }
    }

    /// Create a new read-write Storage instance with custom options.
    pub fn readwrite_with_options(
        db_path: &Path,
        db_options: Options,
        txn_db_options: TransactionDBOptions,
    ) -> Self {
        Self {
            db_path: PathBuf::from(db_path),
            db_options,
            txn_db_options,
            db: None,
            mode: StorageMode::ReadWrite,
            block_cache: None,
            block_cache_config: BlockCacheConfig::default(),
            _marker: PhantomData,
        }
    }

    /// Set the block cache configuration.
    ///
    /// Must be called before `ready()` to take effect.
    pub fn with_block_cache_config(mut self, config: BlockCacheConfig) -> Self {
        self.block_cache_config = config;
        self
    }

    /// Initialize the database.
    ///
    /// Validates the path, creates the shared block cache, collects the
    /// subsystem's column family descriptors, and opens the database in the
    /// configured mode. Calling `ready()` on an initialized instance is a
    /// no-op.
    #[tracing::instrument(skip(self), fields(subsystem = S::NAME, path = ?self.db_path))]
    pub fn ready(&mut self) -> Result<()> {
        if self.db.is_some() {
            return Ok(());
        }

        match self.db_path.try_exists() {
            Err(e) => return Err(e.into()),
            Ok(true) => {
                if self.db_path.is_file() {
                    return Err(anyhow::anyhow!(
                        "Path is a file: {}",
                        self.db_path.display()
                    ));
                }
                if self.db_path.is_symlink() {
                    return Err(anyhow::anyhow!(
                        "Path is a symlink: {}",
                        self.db_path.display()
                    ));
                }
            }
            Ok(false) => {}
        }

        let cache = rocksdb::Cache::new_lru_cache(self.block_cache_config.cache_size_bytes);
        self.block_cache = Some(cache);
        let cache_ref = self.block_cache.as_ref().unwrap();

        let cf_descriptors = S::cf_descriptors(cache_ref, &self.block_cache_config);

        tracing::debug!(
            subsystem = S::NAME,
            cf_count = cf_descriptors.len(),
            cache_mb = self.block_cache_config.cache_size_bytes / (1024 * 1024),
            "[{}] Built CF descriptors",
            S::NAME
        );

        match &self.mode {
            StorageMode::ReadOnly => {
                let db = DB::open_cf_descriptors_read_only(
                    &self.db_options,
                    &self.db_path,
                    cf_descriptors,
                    false,
                )?;
                self.db = Some(DatabaseHandle::ReadOnly(db));
            }
            StorageMode::ReadWrite => {
                let txn_db = TransactionDB::open_cf_descriptors(
                    &self.db_options,
                    &self.txn_db_options,
                    &self.db_path,
                    cf_descriptors,
                )?;
                self.db = Some(DatabaseHandle::ReadWrite(txn_db));
            }
        }

        tracing::info!(subsystem = S::NAME, "[{}] Ready", S::NAME);
        Ok(())
    }

    /// Get a reference to the underlying DB (only in readonly mode).
    pub fn db(&self) -> Result<&DB> {
        self.db
            .as_ref()
            .and_then(|h| h.as_db())
            .ok_or_else(|| anyhow::anyhow!("[{}] Not in readonly mode or not ready", S::NAME))
    }

    /// Get a reference to the TransactionDB (only in readwrite mode).
    pub fn transaction_db(&self) -> Result<&TransactionDB> {
        self.db
            .as_ref()
            .and_then(|h| h.as_transaction_db())
            .ok_or_else(|| anyhow::anyhow!("[{}] Not in readwrite mode or not ready", S::NAME))
    }

    /// Check if storage is in readwrite mode with TransactionDB.
    pub fn is_transactional(&self) -> bool {
        self.db
            .as_ref()
            .map(|h| h.is_read_write())
            .unwrap_or(false)
    }

    /// Get the database path.
    pub fn path(&self) -> &Path {
        &self.db_path
    }

    /// Get list of column family names for this subsystem.
    pub fn column_families(&self) -> &'static [&'static str] {
        S::COLUMN_FAMILIES
    }

    /// Close the database.
    pub fn close(&mut self) -> Result<()> {
        if self.db.is_none() {
            return Err(anyhow::anyhow!("[{}] Storage is not ready", S::NAME));
        }
        if let Some(db_handle) = self.db.take() {
            drop(db_handle);
        }
        Ok(())
    }
}
