//! Transaction-aware operation helpers for the numeric index.
//!
//! Each helper takes an active transaction (mutations) or a
//! [`super::StorageAccess`] (reads); the caller owns commit and abort.
//! [`super::NumericIndex`] wraps these in single-operation transactions for
//! the public API and exposes `_in_txn` variants for composition.

pub(crate) mod delete;
pub(crate) mod insert;
pub(crate) mod scan;
