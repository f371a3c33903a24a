//! Logical document model and per-call option types.

use serde::Serialize;
use serde_json::{Map, Value};

/// A logical document: an ordered mapping from field name to JSON value.
///
/// Identity and timestamp fields are managed by the adapters; see
/// [`crate::normalize`].
pub type Document = Map<String, Value>;

/// A logical filter: field name to literal (implicit equality) or to an
/// operator mapping (`$eq`, `$gt`, `$gte`, `$lt`, `$lte`, `$in`).
pub type Filter = Map<String, Value>;

/// A logical update: `$set`/`$push`/`$pull` operator mappings, or a plain
/// document applied as a direct `$set`.
pub type UpdateSpec = Map<String, Value>;

/// Sort direction for a query option entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Ascending,
    Descending,
}

impl SortDirection {
    /// Interpret the Mongo-style numeric direction (`-1` is descending,
    /// everything else ascending).
    pub fn from_order(order: i32) -> Self {
        if order < 0 {
            SortDirection::Descending
        } else {
            SortDirection::Ascending
        }
    }

    /// The Mongo-style numeric direction.
    pub fn as_order(&self) -> i32 {
        match self {
            SortDirection::Ascending => 1,
            SortDirection::Descending => -1,
        }
    }
}

/// Options bag for `find`-style calls.
#[derive(Debug, Clone, Default)]
pub struct QueryOptions {
    /// Sort specification, applied in order.
    pub sort: Vec<(String, SortDirection)>,

    /// Maximum number of documents to return.
    pub limit: Option<u64>,

    /// Number of documents to skip.
    pub skip: Option<u64>,

    /// Fields to project (document-store backend only).
    pub projection: Vec<String>,
}

impl QueryOptions {
    /// Create an empty options bag.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a sort field.
    pub fn with_sort(mut self, field: impl Into<String>, order: i32) -> Self {
        self.sort.push((field.into(), SortDirection::from_order(order)));
        self
    }

    /// Set the result limit.
    pub fn with_limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Set the number of documents to skip.
    pub fn with_skip(mut self, skip: u64) -> Self {
        self.skip = Some(skip);
        self
    }

    /// Add a projected field (document-store backend only).
    pub fn with_projection(mut self, field: impl Into<String>) -> Self {
        self.projection.push(field.into());
        self
    }

    /// True when no option is set.
    pub fn is_empty(&self) -> bool {
        self.sort.is_empty()
            && self.limit.is_none()
            && self.skip.is_none()
            && self.projection.is_empty()
    }
}

/// Outcome of an `update_many` call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct UpdateReport {
    /// Rows/documents matched by the filter before rewriting.
    pub matched_count: u64,

    /// Rows/documents actually changed.
    pub modified_count: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sort_direction_from_order() {
        assert_eq!(SortDirection::from_order(1), SortDirection::Ascending);
        assert_eq!(SortDirection::from_order(-1), SortDirection::Descending);
        assert_eq!(SortDirection::from_order(0), SortDirection::Ascending);
        assert_eq!(SortDirection::Descending.as_order(), -1);
    }

    #[test]
    fn test_options_builder() {
        let options = QueryOptions::new()
            .with_sort("age", -1)
            .with_sort("name", 1)
            .with_limit(10)
            .with_skip(5);

        assert_eq!(options.sort.len(), 2);
        assert_eq!(options.sort[0], ("age".to_string(), SortDirection::Descending));
        assert_eq!(options.limit, Some(10));
        assert_eq!(options.skip, Some(5));
        assert!(!options.is_empty());
        assert!(QueryOptions::new().is_empty());
    }
}
