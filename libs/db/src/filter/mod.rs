//! Numeric attribute filter subsystem.
//!
//! Answers range and point predicates over a numeric attribute of each
//! record, producing bitmaps of matching ids for the filter compositor.
//!
//! # Storage model
//!
//! Two column families per database:
//!
//! - **Forward** (`filter/numeric_forward`): (field, id) -> current value.
//!   Source of truth for point updates, deletes by id, and membership
//!   checks.
//! - **Inverted** (`filter/numeric_inverted`): (field, base) -> bucket of
//!   (delta, id) entries sorted by value, with a summary bitmap. Bucket
//!   keys embed the base big-endian so a cursor walks buckets in value
//!   order; a range scan unions fully covered buckets through their
//!   summary bitmaps and filters boundary buckets element-wise.
//!
//! Buckets split when they saturate, sliding the cut off equal-value runs
//! so one value never spans two buckets; a bucket holding a single value
//! stays oversized instead.
//!
//! # Consistency
//!
//! Single writer, many readers, serialized by RocksDB transactions. Each
//! mutating call mutates the forward entry and its bucket in one
//! transaction; `_in_txn` variants compose several mutations atomically.

pub mod access;
pub mod bucket;
pub mod config;
mod error;
mod ops;
pub mod query;
pub mod schema;
pub mod sortable;
pub mod subsystem;

mod numeric;

pub use access::StorageAccess;
pub use config::NumericIndexConfig;
pub use error::{Error, Result};
pub use numeric::{NumericIndex, RangeScanStats};
pub use query::NumericPredicate;
pub use schema::{DocId, DocIdBitmap};
pub use sortable::SortableValue;

use subsystem::Subsystem;

/// Filter subsystem storage over the generic RocksDB infrastructure.
pub type Storage = crate::store::Storage<Subsystem>;
