//! Bucket insertion for the inverted index.

use rocksdb::{Transaction, TransactionDB};

use crate::filter::access::StorageAccess;
use crate::filter::bucket::{Bucket, MAX_DELTA};
use crate::filter::config::NumericIndexConfig;
use crate::filter::error::{Error, Result};
use crate::filter::schema::{DocId, NumericInverted};
use crate::filter::sortable::SortableValue;
use crate::store::ColumnFamily;

use super::scan;

/// Insert `(value, id)` into the covering bucket of `value`, creating or
/// splitting buckets as needed.
///
/// The caller must have ruled out a pre-existing entry for this id via the
/// forward index: buckets do not deduplicate.
///
/// - No covering bucket, or the covering bucket cannot reach `value`
///   (offset beyond the delta width): a new bucket is created with
///   `base = value`.
/// - Otherwise the entry is added in place; if the bucket then exceeds
///   `max_bucket_size` it is slide-split and both halves are written. The
///   inserted entry sits on the correct side of the cut because the split
///   redistributes the already-sorted arrays.
/// - A saturated bucket holding a single value refuses to split and is
///   written back oversized.
pub(crate) fn add_to_bucket(
    txn: &Transaction<'_, TransactionDB>,
    txn_db: &TransactionDB,
    config: &NumericIndexConfig,
    field: &str,
    value: SortableValue,
    id: DocId,
) -> Result<()> {
    let cf = txn_db
        .cf_handle(NumericInverted::CF_NAME)
        .ok_or(Error::MissingColumnFamily(NumericInverted::CF_NAME))?;

    // The cursor must observe writes made earlier in this transaction (a
    // point update may have rewritten or deleted this very bucket).
    let access = StorageAccess::Transaction(txn, txn_db);
    let mut cursor = access.raw_cursor(NumericInverted::CF_NAME)?;
    let covering = scan::locate_covering(&mut cursor, field, value)?;
    drop(cursor);

    match covering {
        Some((key, base, payload)) if value - base <= MAX_DELTA => {
            let mut bucket = Bucket::deserialize(&payload, base)?;
            bucket.add(value, id)?;

            if bucket.len() > config.max_bucket_size {
                if let Some(mut right) = bucket.split() {
                    tracing::debug!(
                        field,
                        left_base = bucket.base(),
                        right_base = right.base(),
                        left_len = bucket.len(),
                        right_len = right.len(),
                        "split saturated bucket"
                    );
                    txn.put_cf(
                        &cf,
                        NumericInverted::key(field, right.base()),
                        right.serialize()?,
                    )?;
                }
            }

            txn.put_cf(&cf, key, bucket.serialize()?)?;
        }
        _ => {
            let mut bucket = Bucket::new(value);
            bucket.add(value, id)?;
            txn.put_cf(&cf, NumericInverted::key(field, value), bucket.serialize()?)?;
        }
    }

    Ok(())
}
