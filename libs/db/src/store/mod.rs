//! Common RocksDB storage infrastructure.
//!
//! Provides generic storage plumbing shared by subsystems: database opening
//! in the supported access modes, a shared block cache, and the traits a
//! subsystem implements to declare its column families.
//!
//! # Access modes
//!
//! - **Read-write**: a `TransactionDB`. Exactly one read-write instance may
//!   own a database directory; all mutations run inside its transactions.
//! - **Read-only**: a plain `DB` opened read-only. Any number of read-only
//!   instances can open the same directory concurrently.
//!
//! # Usage
//!
//! ```ignore
//! // A subsystem defines a type alias for ergonomics:
//! pub type Storage = store::Storage<Subsystem>;
//!
//! let mut storage = filter::Storage::readwrite(path);
//! storage.ready()?;
//! let db = storage.transaction_db()?;
//! ```

mod cf_traits;
mod config;
mod handle;
mod storage;
mod subsystem;

pub use cf_traits::{ColumnFamily, ColumnFamilyConfig};
pub use config::BlockCacheConfig;
pub use handle::{DatabaseHandle, StorageMode, StorageOptions};
pub use storage::Storage;
pub use subsystem::StorageSubsystem;
