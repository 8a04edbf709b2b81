//! Attribute filter indexes for the quiver vector database.
//!
//! This crate hosts the storage-side filter subsystem that prunes
//! approximate-nearest-neighbor searches: per-field secondary indexes that
//! translate attribute predicates into bitmaps of matching record ids. The
//! bitmaps are ANDed together by the query layer and handed to the vector
//! engine as an allow-list.
//!
//! # Modules
//!
//! - [`store`]: generic RocksDB storage infrastructure. `Storage<S>` opens a
//!   database in read-only or read-write mode with the column families
//!   declared by a [`store::StorageSubsystem`].
//! - [`filter`]: the numeric secondary index. Sorted, bucketed inverted
//!   index with per-bucket delta compression and summary bitmaps, plus a
//!   forward index for point updates and deletes by id.
//!
//! # Example
//!
//! ```ignore
//! use quiver_db::filter::{self, sortable, NumericIndex, StorageAccess};
//!
//! let mut storage = filter::Storage::readwrite(path);
//! storage.ready()?;
//! let db = storage.transaction_db()?;
//!
//! let index = NumericIndex::new();
//! index.put(db, "price", 42, sortable::encode_f32(19.99))?;
//!
//! let matches = index.range(
//!     &StorageAccess::from(db),
//!     "price",
//!     sortable::encode_f32(10.0),
//!     sortable::encode_f32(25.0),
//! )?;
//! assert!(matches.contains(42));
//! ```

pub mod filter;
pub mod store;

pub use filter::{DocId, DocIdBitmap, SortableValue};
