//! Covering-bucket lookup and ordered range scans.

use crate::filter::access::{RawCursor, StorageAccess};
use crate::filter::bucket::Bucket;
use crate::filter::error::Result;
use crate::filter::numeric::RangeScanStats;
use crate::filter::schema::{DocIdBitmap, NumericInverted};
use crate::filter::sortable::SortableValue;
use crate::store::ColumnFamily;

/// Locate the bucket covering `value`: the one with the greatest base <=
/// `value` for this field.
///
/// Conceptually a floor lookup over the field's bucket keys; the raw
/// cursor's `seek_for_prev` performs it in one positioning step. A landed
/// key outside the field's prefix means no bucket of this field can cover
/// the value.
///
/// Returns the full key, the parsed base, and a copy of the payload.
pub(crate) fn locate_covering(
    cursor: &mut RawCursor<'_>,
    field: &str,
    value: SortableValue,
) -> Result<Option<(Vec<u8>, SortableValue, Vec<u8>)>> {
    cursor.seek_for_prev(&NumericInverted::key(field, value));
    if !cursor.valid() {
        cursor.status()?;
        return Ok(None);
    }

    let (Some(key), Some(payload)) = (cursor.key(), cursor.value()) else {
        return Ok(None);
    };
    if !NumericInverted::has_field_prefix(key, field) {
        return Ok(None);
    }
    let base = NumericInverted::base_from_key(key)?;
    Ok(Some((key.to_vec(), base, payload.to_vec())))
}

/// Collect the ids of all entries with value in `[min, max]` for a field.
///
/// Starts at the covering bucket of `min` (or the field's first bucket when
/// none covers it) and walks forward until the key leaves the field or the
/// base passes `max`. A bucket whose resident values lie entirely inside
/// the range contributes its summary bitmap wholesale; a partially
/// overlapping bucket is filtered entry by entry.
pub(crate) fn scan_range(
    access: &StorageAccess<'_>,
    field: &str,
    min: SortableValue,
    max: SortableValue,
) -> Result<(DocIdBitmap, RangeScanStats)> {
    let mut result = DocIdBitmap::new();
    let mut stats = RangeScanStats::default();
    if min > max {
        return Ok((result, stats));
    }

    let prefix = NumericInverted::field_prefix(field);
    let mut cursor = access.raw_cursor(NumericInverted::CF_NAME)?;

    cursor.seek_for_prev(&NumericInverted::key(field, min));
    let covered = cursor.valid() && cursor.key().is_some_and(|k| k.starts_with(&prefix));
    if !covered {
        // No bucket covers min; the range can still reach buckets above it.
        cursor.seek(&prefix);
    }

    while cursor.valid() {
        let Some(key) = cursor.key() else {
            break;
        };
        if !key.starts_with(&prefix) {
            break;
        }
        let base = NumericInverted::base_from_key(key)?;
        if base > max {
            break;
        }
        let Some(payload) = cursor.value() else {
            break;
        };

        stats.buckets_scanned += 1;

        if let Some((lo, hi)) = Bucket::read_value_bounds(payload, base)? {
            if lo >= min && hi <= max {
                // Whole bucket inside the range: union the summary without
                // decoding the entry arrays.
                result |= Bucket::read_summary_bitmap(payload)?;
                stats.full_overlap_unions += 1;
            } else if hi >= min && lo <= max {
                let bucket = Bucket::deserialize(payload, base)?;
                for index in 0..bucket.len() {
                    let value = bucket.value_at(index);
                    if value >= min && value <= max {
                        result.insert(bucket.ids()[index]);
                    }
                }
                stats.partial_overlap_filters += 1;
                stats.entries_filtered += bucket.len();
            }
        }

        cursor.next();
    }
    cursor.status()?;

    Ok((result, stats))
}
