//! Predicate evaluation over the numeric index.
//!
//! The query layer parses filter expressions into per-field predicates and
//! evaluates each against its field's index; the resulting bitmaps are
//! ANDed together by the compositor before reaching the vector engine.
//! This module owns the single-field step.

use serde::{Deserialize, Serialize};

use super::access::StorageAccess;
use super::error::Result;
use super::numeric::NumericIndex;
use super::schema::DocIdBitmap;
use super::sortable::SortableValue;

/// A single-field numeric predicate, endpoints pre-encoded as
/// [`SortableValue`]s.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum NumericPredicate {
    /// Exactly `value`.
    Eq(SortableValue),
    /// Inclusive `[min, max]`.
    Range {
        min: SortableValue,
        max: SortableValue,
    },
    /// Any of the listed values.
    In(Vec<SortableValue>),
}

impl NumericPredicate {
    /// Evaluate against `field`, producing the bitmap of matching ids.
    ///
    /// Equality is `range(v, v)`; `In` unions the per-value equalities.
    pub fn evaluate(
        &self,
        index: &NumericIndex,
        access: &StorageAccess<'_>,
        field: &str,
    ) -> Result<DocIdBitmap> {
        match self {
            NumericPredicate::Eq(value) => index.range(access, field, *value, *value),
            NumericPredicate::Range { min, max } => index.range(access, field, *min, *max),
            NumericPredicate::In(values) => {
                let mut result = DocIdBitmap::new();
                for &value in values {
                    result |= index.range(access, field, value, value)?;
                }
                Ok(result)
            }
        }
    }
}
