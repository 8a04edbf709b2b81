//! Bucket removal for the inverted index.

use rocksdb::{Transaction, TransactionDB};

use crate::filter::access::StorageAccess;
use crate::filter::bucket::{Bucket, MAX_DELTA};
use crate::filter::error::{Error, Result};
use crate::filter::schema::{DocId, NumericInverted};
use crate::filter::sortable::SortableValue;
use crate::store::ColumnFamily;

use super::scan;

/// Remove `id` from the bucket covering `value`. Returns whether an entry
/// was removed.
///
/// A bucket emptied by the removal is deleted outright; otherwise it is
/// rewritten in place. A missing covering bucket or an id the bucket does
/// not hold is not an error — the forward index is the source of truth and
/// the caller acts on what it found there.
pub(crate) fn remove_from_bucket(
    txn: &Transaction<'_, TransactionDB>,
    txn_db: &TransactionDB,
    field: &str,
    value: SortableValue,
    id: DocId,
) -> Result<bool> {
    let cf = txn_db
        .cf_handle(NumericInverted::CF_NAME)
        .ok_or(Error::MissingColumnFamily(NumericInverted::CF_NAME))?;

    let access = StorageAccess::Transaction(txn, txn_db);
    let mut cursor = access.raw_cursor(NumericInverted::CF_NAME)?;
    let covering = scan::locate_covering(&mut cursor, field, value)?;
    drop(cursor);

    let Some((key, base, payload)) = covering else {
        return Ok(false);
    };
    if value < base || value - base > MAX_DELTA {
        // The bucket cannot hold this value; nothing to remove.
        return Ok(false);
    }

    let mut bucket = Bucket::deserialize(&payload, base)?;
    if !bucket.remove(id) {
        return Ok(false);
    }

    if bucket.is_empty() {
        txn.delete_cf(&cf, key)?;
    } else {
        txn.put_cf(&cf, key, bucket.serialize()?)?;
    }
    Ok(true)
}
