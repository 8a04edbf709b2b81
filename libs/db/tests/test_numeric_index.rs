//! End-to-end tests for the numeric index: bucket lifecycle across puts,
//! splits, point updates, and deletes, plus the structural invariants of
//! the persisted buckets.

use quiver_db::filter::{
    self, bucket::Bucket, schema::NumericInverted, sortable, DocId, DocIdBitmap, NumericIndex,
    NumericIndexConfig, StorageAccess,
};
use quiver_db::store::ColumnFamily;
use rocksdb::{IteratorMode, TransactionDB};
use std::path::Path;
use tempfile::TempDir;

fn open_rw(path: &Path) -> filter::Storage {
    let mut storage = filter::Storage::readwrite(path);
    storage.ready().expect("storage should initialize");
    storage
}

/// All persisted buckets of a field, in key order: (base, payload).
fn field_buckets(db: &TransactionDB, field: &str) -> Vec<(u32, Vec<u8>)> {
    let cf = db.cf_handle(NumericInverted::CF_NAME).unwrap();
    let prefix = NumericInverted::field_prefix(field);
    db.iterator_cf(cf, IteratorMode::Start)
        .map(|item| item.unwrap())
        .filter(|(key, _)| key.starts_with(&prefix))
        .map(|(key, value)| {
            (
                NumericInverted::base_from_key(&key).unwrap(),
                value.to_vec(),
            )
        })
        .collect()
}

fn id_set(ids: impl IntoIterator<Item = u32>) -> DocIdBitmap {
    ids.into_iter().map(|id| id as DocId).collect()
}

/// Check the structural invariants of every bucket of a field: sortedness,
/// bitmap fidelity, non-overlap between adjacent buckets, and agreement
/// with the forward index for every resident entry.
fn assert_field_invariants(db: &TransactionDB, index: &NumericIndex, field: &str) -> usize {
    let access = StorageAccess::from(db);
    let buckets = field_buckets(db, field);
    let mut total_entries = 0;
    let mut prev_max: Option<u32> = None;

    for (base, payload) in &buckets {
        let bucket = Bucket::deserialize(payload, *base).unwrap();
        assert!(!bucket.is_empty(), "empty bucket persisted at base {}", base);

        // Deltas non-decreasing
        assert!(
            bucket.deltas().windows(2).all(|pair| pair[0] <= pair[1]),
            "unsorted deltas in bucket at base {}",
            base
        );

        // Summary bitmap equals the id array as a set
        let mut ids_sorted = bucket.ids().to_vec();
        ids_sorted.sort_unstable();
        let summary_ids: Vec<DocId> = bucket.summary().iter().collect();
        assert_eq!(
            summary_ids, ids_sorted,
            "summary bitmap out of sync at base {}",
            base
        );

        // Adjacent buckets never overlap in resident values
        if let Some(prev) = prev_max {
            assert!(
                prev < *base,
                "bucket at base {} overlaps predecessor ending at {}",
                base,
                prev
            );
        }
        prev_max = bucket.max_value();

        // Every entry agrees with the forward index
        for i in 0..bucket.len() {
            let value = bucket.value_at(i);
            let id = bucket.ids()[i];
            assert!(
                index.check_range(&access, field, id, value, value).unwrap(),
                "forward index disagrees for id {} value {}",
                id,
                value
            );
        }
        total_entries += bucket.len();
    }
    total_entries
}

#[test]
fn test_bucket_fill_and_split_range() {
    let temp_dir = TempDir::new().unwrap();
    let storage = open_rw(&temp_dir.path().join("filter_db"));
    let db = storage.transaction_db().unwrap();
    let index = NumericIndex::new();

    for i in 1u32..2048 {
        index.put(db, "x", i as DocId, i).unwrap();
    }

    let access = StorageAccess::from(db);
    let result = index.range(&access, "x", 500, 1500).unwrap();
    assert_eq!(result, id_set(500..=1500));

    let buckets = field_buckets(db, "x");
    assert!(
        buckets.len() >= 2,
        "2047 entries should not fit one bucket, got {}",
        buckets.len()
    );

    assert_eq!(assert_field_invariants(db, &index, "x"), 2047);
}

#[test]
fn test_point_update_moves_id() {
    let temp_dir = TempDir::new().unwrap();
    let storage = open_rw(&temp_dir.path().join("filter_db"));
    let db = storage.transaction_db().unwrap();
    let index = NumericIndex::new();

    index.put(db, "x", 1, 10).unwrap();
    index.put(db, "x", 1, 20).unwrap();

    let access = StorageAccess::from(db);
    assert!(index.range(&access, "x", 10, 10).unwrap().is_empty());
    assert_eq!(index.range(&access, "x", 20, 20).unwrap(), id_set([1]));

    // Forward index reflects only the new value
    assert!(index.check_range(&access, "x", 1, 20, 20).unwrap());
    assert!(!index.check_range(&access, "x", 1, 10, 10).unwrap());
}

#[test]
fn test_put_same_value_is_idempotent() {
    let temp_dir = TempDir::new().unwrap();
    let storage = open_rw(&temp_dir.path().join("filter_db"));
    let db = storage.transaction_db().unwrap();
    let index = NumericIndex::new();

    index.put(db, "x", 9, 500).unwrap();
    index.put(db, "x", 9, 500).unwrap();

    let access = StorageAccess::from(db);
    assert_eq!(index.range(&access, "x", 500, 500).unwrap(), id_set([9]));
    assert_eq!(field_buckets(db, "x").len(), 1);
    assert_eq!(assert_field_invariants(db, &index, "x"), 1);
}

#[test]
fn test_delete_by_id_reclaims_bucket() {
    let temp_dir = TempDir::new().unwrap();
    let storage = open_rw(&temp_dir.path().join("filter_db"));
    let db = storage.transaction_db().unwrap();
    let index = NumericIndex::new();

    index.put(db, "x", 7, 100).unwrap();
    index.put(db, "x", 8, 100).unwrap();

    index.remove(db, "x", 7).unwrap();
    let access = StorageAccess::from(db);
    assert_eq!(index.range(&access, "x", 100, 100).unwrap(), id_set([8]));

    index.remove(db, "x", 8).unwrap();
    assert!(index.range(&access, "x", 100, 100).unwrap().is_empty());
    assert!(
        field_buckets(db, "x").is_empty(),
        "emptied bucket should be deleted"
    );
}

#[test]
fn test_remove_absent_id_is_noop() {
    let temp_dir = TempDir::new().unwrap();
    let storage = open_rw(&temp_dir.path().join("filter_db"));
    let db = storage.transaction_db().unwrap();
    let index = NumericIndex::new();

    index.remove(db, "x", 12345).unwrap();

    index.put(db, "x", 1, 50).unwrap();
    index.remove(db, "x", 2).unwrap();
    let access = StorageAccess::from(db);
    assert_eq!(index.range(&access, "x", 0, 100).unwrap(), id_set([1]));
}

#[test]
fn test_duplicate_value_bucket_refuses_split() {
    let temp_dir = TempDir::new().unwrap();
    let storage = open_rw(&temp_dir.path().join("filter_db"));
    let db = storage.transaction_db().unwrap();
    let index = NumericIndex::new();

    for id in 0u32..1025 {
        index.put(db, "y", id as DocId, 42).unwrap();
    }

    let access = StorageAccess::from(db);
    let result = index.range(&access, "y", 42, 42).unwrap();
    assert_eq!(result.len(), 1025);
    assert_eq!(result, id_set(0..1025));

    // Oversized but whole: one value must not straddle buckets
    assert_eq!(field_buckets(db, "y").len(), 1);
    assert_eq!(assert_field_invariants(db, &index, "y"), 1025);
}

#[test]
fn test_cross_split_range_random_order() {
    use rand::rngs::StdRng;
    use rand::seq::SliceRandom;
    use rand::SeedableRng;

    let temp_dir = TempDir::new().unwrap();
    let storage = open_rw(&temp_dir.path().join("filter_db"));
    let db = storage.transaction_db().unwrap();
    let index = NumericIndex::new();

    let mut values: Vec<u32> = (0..3000).collect();
    values.shuffle(&mut StdRng::seed_from_u64(7));
    for &v in &values {
        index.put(db, "y", v as DocId, v).unwrap();
    }

    let access = StorageAccess::from(db);
    let result = index.range(&access, "y", 800, 2200).unwrap();
    assert_eq!(result, id_set(800..=2200));

    // A scan spanning every bucket must exercise the whole-bucket union
    // fast path rather than element-wise filtering.
    let (all, stats) = index.range_with_stats(&access, "y", 0, 2999).unwrap();
    assert_eq!(all.len(), 3000);
    assert!(
        stats.full_overlap_unions >= 1,
        "expected summary-bitmap unions, stats: {:?}",
        stats
    );
    assert_eq!(
        stats.full_overlap_unions + stats.partial_overlap_filters,
        stats.buckets_scanned
    );

    assert_eq!(assert_field_invariants(db, &index, "y"), 3000);
}

#[test]
fn test_float_ordering_with_signed_zeros() {
    let temp_dir = TempDir::new().unwrap();
    let storage = open_rw(&temp_dir.path().join("filter_db"));
    let db = storage.transaction_db().unwrap();
    let index = NumericIndex::new();

    let prices = [-1.5f32, -0.0, 0.0, 0.5, 10.25];
    for (i, &price) in prices.iter().enumerate() {
        index
            .put(db, "p", (i + 1) as DocId, sortable::encode_f32(price))
            .unwrap();
    }

    let access = StorageAccess::from(db);
    let result = index
        .range(
            &access,
            "p",
            sortable::encode_f32(-1.0),
            sortable::encode_f32(1.0),
        )
        .unwrap();
    // -0.0, 0.0 and 0.5 fall inside [-1.0, 1.0]
    assert_eq!(result, id_set([2, 3, 4]));
}

#[test]
fn test_fields_are_isolated() {
    let temp_dir = TempDir::new().unwrap();
    let storage = open_rw(&temp_dir.path().join("filter_db"));
    let db = storage.transaction_db().unwrap();
    let index = NumericIndex::new();

    // "price" and "price2" share a byte prefix; scans must not leak
    index.put(db, "price", 1, 100).unwrap();
    index.put(db, "price2", 2, 100).unwrap();
    index.put(db, "pr", 3, 100).unwrap();

    let access = StorageAccess::from(db);
    assert_eq!(index.range(&access, "price", 0, 200).unwrap(), id_set([1]));
    assert_eq!(index.range(&access, "price2", 0, 200).unwrap(), id_set([2]));
    assert_eq!(index.range(&access, "pr", 0, 200).unwrap(), id_set([3]));
    assert!(index.range(&access, "pri", 0, 200).unwrap().is_empty());
}

#[test]
fn test_small_buckets_split_chain() {
    let temp_dir = TempDir::new().unwrap();
    let storage = open_rw(&temp_dir.path().join("filter_db"));
    let db = storage.transaction_db().unwrap();
    let index = NumericIndex::with_config(NumericIndexConfig { max_bucket_size: 4 });

    for i in 0u32..100 {
        index.put(db, "z", i as DocId, i * 3).unwrap();
    }

    let access = StorageAccess::from(db);
    let result = index.range(&access, "z", 30, 60).unwrap();
    // Values 30..=60 step 3: ids 10..=20
    assert_eq!(result, id_set(10..=20));

    let buckets = field_buckets(db, "z");
    assert!(
        buckets.len() >= 100 / 4,
        "tiny max_bucket_size should force many splits, got {}",
        buckets.len()
    );
    assert_eq!(assert_field_invariants(db, &index, "z"), 100);
}

#[test]
fn test_range_endpoints_inclusive_and_empty() {
    let temp_dir = TempDir::new().unwrap();
    let storage = open_rw(&temp_dir.path().join("filter_db"));
    let db = storage.transaction_db().unwrap();
    let index = NumericIndex::new();

    index.put(db, "x", 1, 10).unwrap();
    index.put(db, "x", 2, 20).unwrap();
    index.put(db, "x", 3, 30).unwrap();

    let access = StorageAccess::from(db);
    assert_eq!(index.range(&access, "x", 10, 30).unwrap(), id_set([1, 2, 3]));
    assert_eq!(index.range(&access, "x", 11, 29).unwrap(), id_set([2]));
    assert!(index.range(&access, "x", 31, 40).unwrap().is_empty());
    assert!(index.range(&access, "x", 0, 9).unwrap().is_empty());
    // Inverted endpoints yield nothing
    assert!(index.range(&access, "x", 30, 10).unwrap().is_empty());
    // Unknown field yields nothing
    assert!(index.range(&access, "nope", 0, u32::MAX).unwrap().is_empty());
}
