//! Storage access abstraction for unified read logic.
//!
//! The same scan implementation serves three access types:
//!
//! - `Readonly`: a read-only RocksDB `DB` (query replicas)
//! - `Readwrite`: the `TransactionDB`, outside any transaction
//! - `Transaction`: inside an active transaction, seeing its uncommitted
//!   writes — required by mutations that re-read buckets they just rewrote

use rocksdb::{DBRawIteratorWithThreadMode, Transaction, TransactionDB, DB};

use super::error::{Error, Result};

/// Storage access for read operations.
#[derive(Clone, Copy)]
pub enum StorageAccess<'a> {
    /// Read-only RocksDB `DB` access
    Readonly(&'a DB),
    /// Read-write `TransactionDB` access (outside transactions)
    Readwrite(&'a TransactionDB),
    /// Within an active transaction (sees uncommitted writes)
    Transaction(&'a Transaction<'a, TransactionDB>, &'a TransactionDB),
}

impl<'a> StorageAccess<'a> {
    /// Get a column family handle.
    pub(crate) fn cf_handle(&self, cf_name: &'static str) -> Result<&'a rocksdb::ColumnFamily> {
        let handle = match self {
            StorageAccess::Readonly(db) => db.cf_handle(cf_name),
            StorageAccess::Readwrite(db) => db.cf_handle(cf_name),
            StorageAccess::Transaction(_, db) => db.cf_handle(cf_name),
        };
        handle.ok_or(Error::MissingColumnFamily(cf_name))
    }

    /// Point lookup in a column family.
    pub(crate) fn get_cf(&self, cf_name: &'static str, key: &[u8]) -> Result<Option<Vec<u8>>> {
        let cf = self.cf_handle(cf_name)?;
        let value = match self {
            StorageAccess::Readonly(db) => db.get_cf(cf, key)?,
            StorageAccess::Readwrite(db) => db.get_cf(cf, key)?,
            StorageAccess::Transaction(txn, _) => txn.get_cf(cf, key)?,
        };
        Ok(value)
    }

    /// Open a raw cursor over a column family.
    ///
    /// A single cursor iterates over a consistent view of the family, which
    /// is what gives one range scan its snapshot semantics.
    pub(crate) fn raw_cursor(&self, cf_name: &'static str) -> Result<RawCursor<'a>> {
        let cf = self.cf_handle(cf_name)?;
        Ok(match self {
            StorageAccess::Readonly(db) => RawCursor::Db(db.raw_iterator_cf(cf)),
            StorageAccess::Readwrite(db) => RawCursor::TxnDb(db.raw_iterator_cf(cf)),
            StorageAccess::Transaction(txn, _) => RawCursor::Txn(txn.raw_iterator_cf(cf)),
        })
    }
}

impl<'a> From<&'a DB> for StorageAccess<'a> {
    fn from(db: &'a DB) -> Self {
        StorageAccess::Readonly(db)
    }
}

impl<'a> From<&'a TransactionDB> for StorageAccess<'a> {
    fn from(db: &'a TransactionDB) -> Self {
        StorageAccess::Readwrite(db)
    }
}

/// Raw iterator over one column family, wrapping the three backing types.
///
/// Exposes the cursor operations the index needs: floor positioning via
/// `seek_for_prev`, forward stepping, and error surfacing via `status`.
pub(crate) enum RawCursor<'a> {
    Db(DBRawIteratorWithThreadMode<'a, DB>),
    TxnDb(DBRawIteratorWithThreadMode<'a, TransactionDB>),
    Txn(DBRawIteratorWithThreadMode<'a, Transaction<'a, TransactionDB>>),
}

impl<'a> RawCursor<'a> {
    /// Position at the first key >= `key`.
    pub(crate) fn seek(&mut self, key: &[u8]) {
        match self {
            RawCursor::Db(it) => it.seek(key),
            RawCursor::TxnDb(it) => it.seek(key),
            RawCursor::Txn(it) => it.seek(key),
        }
    }

    /// Position at the last key <= `key` (floor).
    pub(crate) fn seek_for_prev(&mut self, key: &[u8]) {
        match self {
            RawCursor::Db(it) => it.seek_for_prev(key),
            RawCursor::TxnDb(it) => it.seek_for_prev(key),
            RawCursor::Txn(it) => it.seek_for_prev(key),
        }
    }

    pub(crate) fn next(&mut self) {
        match self {
            RawCursor::Db(it) => it.next(),
            RawCursor::TxnDb(it) => it.next(),
            RawCursor::Txn(it) => it.next(),
        }
    }

    pub(crate) fn valid(&self) -> bool {
        match self {
            RawCursor::Db(it) => it.valid(),
            RawCursor::TxnDb(it) => it.valid(),
            RawCursor::Txn(it) => it.valid(),
        }
    }

    pub(crate) fn key(&self) -> Option<&[u8]> {
        match self {
            RawCursor::Db(it) => it.key(),
            RawCursor::TxnDb(it) => it.key(),
            RawCursor::Txn(it) => it.key(),
        }
    }

    pub(crate) fn value(&self) -> Option<&[u8]> {
        match self {
            RawCursor::Db(it) => it.value(),
            RawCursor::TxnDb(it) => it.value(),
            RawCursor::Txn(it) => it.value(),
        }
    }

    /// Surface any iteration error; an exhausted healthy cursor is `Ok`.
    pub(crate) fn status(&self) -> Result<()> {
        let status = match self {
            RawCursor::Db(it) => it.status(),
            RawCursor::TxnDb(it) => it.status(),
            RawCursor::Txn(it) => it.status(),
        };
        status.map_err(Error::Storage)
    }
}
