//! The numeric secondary index: public API surface.
//!
//! Pairs a forward index (per-(field, id) current value) with a sorted,
//! bucketed inverted index (per-(field, base) bucket payloads). Every
//! mutating call runs in one RocksDB transaction: the forward entry and the
//! buckets it implies change together or not at all, so readers never see
//! them disagree. `_in_txn` variants let a caller batch several mutations —
//! all attribute fields of one record, typically — into a single atomic
//! transaction.

use rocksdb::{Transaction, TransactionDB};

use super::access::StorageAccess;
use super::config::NumericIndexConfig;
use super::error::{Error, Result};
use super::ops;
use super::schema::{DocId, DocIdBitmap, NumericForward};
use super::sortable::SortableValue;
use crate::store::ColumnFamily;

// ============================================================================
// RangeScanStats
// ============================================================================

/// Work accounting for one range scan.
///
/// `full_overlap_unions` counts buckets absorbed through the summary-bitmap
/// fast path; `entries_filtered` counts entries examined one by one in
/// partially overlapping buckets. Useful for tests and diagnostics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RangeScanStats {
    /// Buckets visited by the cursor within the key range.
    pub buckets_scanned: usize,
    /// Buckets fully inside the range, unioned without entry decoding.
    pub full_overlap_unions: usize,
    /// Buckets partially overlapping the range, filtered element-wise.
    pub partial_overlap_filters: usize,
    /// Entries examined during element-wise filtering.
    pub entries_filtered: usize,
}

// ============================================================================
// NumericIndex
// ============================================================================

/// Range and point predicate index over one numeric attribute per field.
///
/// Values are pre-encoded [`SortableValue`]s; callers wanting float or
/// signed-integer semantics apply [`super::sortable`] on both sides of the
/// API.
///
/// The index is stateless apart from its configuration; all data lives in
/// the two filter column families of the database it is handed.
#[derive(Debug, Clone, Default)]
pub struct NumericIndex {
    config: NumericIndexConfig,
}

impl NumericIndex {
    /// Index with default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Index with explicit configuration.
    pub fn with_config(config: NumericIndexConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &NumericIndexConfig {
        &self.config
    }

    // =========================================================================
    // Writes
    // =========================================================================

    /// Set the value of (field, id), replacing any previous value.
    ///
    /// Runs in its own transaction; on any failure the transaction is rolled
    /// back and nothing is visible.
    pub fn put(
        &self,
        db: &TransactionDB,
        field: &str,
        id: DocId,
        value: SortableValue,
    ) -> Result<()> {
        let txn = db.transaction();
        match self.put_in_txn(&txn, db, field, id, value) {
            Ok(()) => {
                txn.commit()?;
                Ok(())
            }
            Err(e) => {
                let _ = txn.rollback();
                Err(e)
            }
        }
    }

    /// [`Self::put`] within a caller-owned transaction.
    pub fn put_in_txn(
        &self,
        txn: &Transaction<'_, TransactionDB>,
        db: &TransactionDB,
        field: &str,
        id: DocId,
        value: SortableValue,
    ) -> Result<()> {
        let forward_cf = db
            .cf_handle(NumericForward::CF_NAME)
            .ok_or(Error::MissingColumnFamily(NumericForward::CF_NAME))?;
        let forward_key = NumericForward::key(field, id);

        // Lock the forward entry for the duration of the transaction.
        if let Some(bytes) = txn.get_for_update_cf(&forward_cf, &forward_key, true)? {
            let old = NumericForward::value_from_bytes(&bytes)?;
            if old == value {
                return Ok(());
            }
            ops::delete::remove_from_bucket(txn, db, field, old, id)?;
        }

        txn.put_cf(&forward_cf, &forward_key, NumericForward::value_to_bytes(value))?;
        ops::insert::add_to_bucket(txn, db, &self.config, field, value, id)?;

        tracing::trace!(field, id, value, "numeric put");
        Ok(())
    }

    /// Drop (field, id) from the index. A no-op when the entry is absent.
    pub fn remove(&self, db: &TransactionDB, field: &str, id: DocId) -> Result<()> {
        let txn = db.transaction();
        match self.remove_in_txn(&txn, db, field, id) {
            Ok(()) => {
                txn.commit()?;
                Ok(())
            }
            Err(e) => {
                let _ = txn.rollback();
                Err(e)
            }
        }
    }

    /// [`Self::remove`] within a caller-owned transaction.
    pub fn remove_in_txn(
        &self,
        txn: &Transaction<'_, TransactionDB>,
        db: &TransactionDB,
        field: &str,
        id: DocId,
    ) -> Result<()> {
        let forward_cf = db
            .cf_handle(NumericForward::CF_NAME)
            .ok_or(Error::MissingColumnFamily(NumericForward::CF_NAME))?;
        let forward_key = NumericForward::key(field, id);

        if let Some(bytes) = txn.get_for_update_cf(&forward_cf, &forward_key, true)? {
            let value = NumericForward::value_from_bytes(&bytes)?;
            ops::delete::remove_from_bucket(txn, db, field, value, id)?;
            txn.delete_cf(&forward_cf, &forward_key)?;
            tracing::trace!(field, id, value, "numeric remove");
        }
        Ok(())
    }

    // =========================================================================
    // Reads
    // =========================================================================

    /// Ids of all records whose value on `field` lies in `[min, max]`.
    pub fn range(
        &self,
        access: &StorageAccess<'_>,
        field: &str,
        min: SortableValue,
        max: SortableValue,
    ) -> Result<DocIdBitmap> {
        let (bitmap, _) = ops::scan::scan_range(access, field, min, max)?;
        Ok(bitmap)
    }

    /// [`Self::range`] plus work accounting for the scan.
    pub fn range_with_stats(
        &self,
        access: &StorageAccess<'_>,
        field: &str,
        min: SortableValue,
        max: SortableValue,
    ) -> Result<(DocIdBitmap, RangeScanStats)> {
        ops::scan::scan_range(access, field, min, max)
    }

    /// Whether the record's current value on `field` lies in `[min, max]`.
    ///
    /// Reads only the forward index; an absent entry is `false`.
    pub fn check_range(
        &self,
        access: &StorageAccess<'_>,
        field: &str,
        id: DocId,
        min: SortableValue,
        max: SortableValue,
    ) -> Result<bool> {
        let key = NumericForward::key(field, id);
        match access.get_cf(NumericForward::CF_NAME, &key)? {
            Some(bytes) => {
                let value = NumericForward::value_from_bytes(&bytes)?;
                Ok(value >= min && value <= max)
            }
            None => Ok(false),
        }
    }
}
