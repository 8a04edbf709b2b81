//! Tests for the query-facing surface: predicate evaluation, forward-index
//! membership checks, transactional composition, and read-only access.

use quiver_db::filter::{
    self, sortable, DocId, DocIdBitmap, NumericIndex, NumericPredicate, StorageAccess,
};
use std::path::Path;
use tempfile::TempDir;

fn open_rw(path: &Path) -> filter::Storage {
    let mut storage = filter::Storage::readwrite(path);
    storage.ready().expect("storage should initialize");
    storage
}

fn id_set(ids: impl IntoIterator<Item = u32>) -> DocIdBitmap {
    ids.into_iter().map(|id| id as DocId).collect()
}

#[test]
fn test_predicate_eq_range_in() {
    let temp_dir = TempDir::new().unwrap();
    let storage = open_rw(&temp_dir.path().join("filter_db"));
    let db = storage.transaction_db().unwrap();
    let index = NumericIndex::new();

    // ages: id -> value
    for (id, age) in [(100u32, 25u32), (101, 30), (102, 35), (103, 30)] {
        index.put(db, "age", id as DocId, age).unwrap();
    }
    let access = StorageAccess::from(db);

    let eq = NumericPredicate::Eq(30);
    assert_eq!(eq.evaluate(&index, &access, "age").unwrap(), id_set([101, 103]));

    let range = NumericPredicate::Range { min: 20, max: 32 };
    assert_eq!(
        range.evaluate(&index, &access, "age").unwrap(),
        id_set([100, 101, 103])
    );

    let within = NumericPredicate::In(vec![25, 35, 99]);
    assert_eq!(
        within.evaluate(&index, &access, "age").unwrap(),
        id_set([100, 102])
    );

    // Duplicates in the value list change nothing
    let dup = NumericPredicate::In(vec![25, 25, 25]);
    assert_eq!(dup.evaluate(&index, &access, "age").unwrap(), id_set([100]));
}

#[test]
fn test_predicate_over_float_codes() {
    let temp_dir = TempDir::new().unwrap();
    let storage = open_rw(&temp_dir.path().join("filter_db"));
    let db = storage.transaction_db().unwrap();
    let index = NumericIndex::new();

    for (id, price) in [(1u32, 10.5f32), (2, 20.0)] {
        index
            .put(db, "price", id as DocId, sortable::encode_f32(price))
            .unwrap();
    }
    let access = StorageAccess::from(db);

    let predicate = NumericPredicate::Range {
        min: sortable::encode_f32(10.0),
        max: sortable::encode_f32(15.0),
    };
    assert_eq!(
        predicate.evaluate(&index, &access, "price").unwrap(),
        id_set([1])
    );
}

#[test]
fn test_check_range_reads_forward_only() {
    let temp_dir = TempDir::new().unwrap();
    let storage = open_rw(&temp_dir.path().join("filter_db"));
    let db = storage.transaction_db().unwrap();
    let index = NumericIndex::new();

    index.put(db, "score", 5, 77).unwrap();
    let access = StorageAccess::from(db);

    assert!(index.check_range(&access, "score", 5, 0, 100).unwrap());
    assert!(index.check_range(&access, "score", 5, 77, 77).unwrap());
    assert!(!index.check_range(&access, "score", 5, 78, 100).unwrap());
    // Absent id or field is false, not an error
    assert!(!index.check_range(&access, "score", 6, 0, 100).unwrap());
    assert!(!index.check_range(&access, "other", 5, 0, 100).unwrap());
}

#[test]
fn test_multi_field_document_in_one_transaction() {
    let temp_dir = TempDir::new().unwrap();
    let storage = open_rw(&temp_dir.path().join("filter_db"));
    let db = storage.transaction_db().unwrap();
    let index = NumericIndex::new();

    // Write both fields of record 42 atomically
    let txn = db.transaction();
    index.put_in_txn(&txn, db, "age", 42, 30).unwrap();
    index
        .put_in_txn(&txn, db, "price", 42, sortable::encode_f32(9.99))
        .unwrap();

    // Inside the transaction the writes are already visible
    let txn_access = StorageAccess::Transaction(&txn, db);
    assert_eq!(index.range(&txn_access, "age", 30, 30).unwrap(), id_set([42]));

    // Outside, nothing is visible until commit
    let outside = StorageAccess::from(db);
    assert!(index.range(&outside, "age", 30, 30).unwrap().is_empty());

    txn.commit().unwrap();
    assert_eq!(index.range(&outside, "age", 30, 30).unwrap(), id_set([42]));
    assert_eq!(
        index
            .range(
                &outside,
                "price",
                sortable::encode_f32(9.0),
                sortable::encode_f32(10.0)
            )
            .unwrap(),
        id_set([42])
    );
}

#[test]
fn test_rolled_back_transaction_leaves_no_trace() {
    let temp_dir = TempDir::new().unwrap();
    let storage = open_rw(&temp_dir.path().join("filter_db"));
    let db = storage.transaction_db().unwrap();
    let index = NumericIndex::new();

    index.put(db, "age", 1, 20).unwrap();

    let txn = db.transaction();
    index.put_in_txn(&txn, db, "age", 1, 99).unwrap();
    index.put_in_txn(&txn, db, "age", 2, 99).unwrap();
    txn.rollback().unwrap();

    let access = StorageAccess::from(db);
    assert_eq!(index.range(&access, "age", 0, 100).unwrap(), id_set([1]));
    assert_eq!(index.range(&access, "age", 20, 20).unwrap(), id_set([1]));
    assert!(index.range(&access, "age", 99, 99).unwrap().is_empty());
}

#[test]
fn test_readonly_instance_serves_queries() {
    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir.path().join("filter_db");

    {
        let mut storage = open_rw(&db_path);
        let db = storage.transaction_db().unwrap();
        let index = NumericIndex::new();
        for i in 0u32..50 {
            index.put(db, "x", i as DocId, i).unwrap();
        }
        storage.close().unwrap();
    }

    let mut readonly = filter::Storage::readonly(&db_path);
    readonly.ready().expect("readonly open should succeed");
    let db = readonly.db().unwrap();
    let index = NumericIndex::new();

    let access = StorageAccess::from(db);
    assert_eq!(index.range(&access, "x", 10, 19).unwrap(), id_set(10..=19));
    assert!(index.check_range(&access, "x", 5, 0, 10).unwrap());
}
