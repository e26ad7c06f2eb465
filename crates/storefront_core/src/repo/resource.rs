//! Resource descriptor contract.
//!
//! # Responsibility
//! - Describe one resource's table, selectable columns, writable columns,
//!   sort safelist, row decoder and equality filters.
//!
//! # Invariants
//! - `COLUMNS` starts with `id` and ends with `version`.
//! - `write_values` yields one value per `WRITABLE_COLUMNS` entry, in order.
//! - All names are static text; nothing a caller sends is ever spliced.

use crate::model::{Patch, RecordId};
use crate::query::QueryParams;
use crate::validate::{Validate, Validator};
use rusqlite::types::Value;
use rusqlite::Row;

/// Static description of a resource the generic engine can drive.
pub trait Resource {
    type Entity: Clone + Validate;
    type Draft: Validate;
    type Patch: Patch<Self::Entity>;
    type ListFilter: Default;

    /// Singular name used in errors and logs.
    const NAME: &'static str;
    const TABLE: &'static str;
    const COLUMNS: &'static [&'static str];
    const WRITABLE_COLUMNS: &'static [&'static str];
    const SORT_SAFE_LIST: &'static [&'static str];

    fn decode(row: &Row<'_>) -> rusqlite::Result<Self::Entity>;

    fn id(entity: &Self::Entity) -> RecordId;

    fn version(entity: &Self::Entity) -> i64;

    fn draft_values(draft: &Self::Draft) -> Vec<Value>;

    fn write_values(entity: &Self::Entity) -> Vec<Value>;

    /// Optional equality filters for this resource's list endpoint.
    fn equality_filters(filter: &Self::ListFilter) -> Vec<EqualityFilter>;

    /// Decodes the list filter from query pairs, recording malformed input.
    fn read_list_filter(qs: &QueryParams, v: &mut Validator) -> Self::ListFilter;
}

/// Optional equality predicate; the neutral value disables it.
#[derive(Debug, Clone, PartialEq)]
pub enum EqualityFilter {
    /// Case-insensitive text match; `""` matches every row.
    Text { column: &'static str, value: String },
    /// Exact integer match; `0` matches every row.
    Integer { column: &'static str, value: i64 },
}

impl EqualityFilter {
    /// Predicate text using placeholder `?{index}` (1-based).
    pub fn predicate_sql(&self, index: usize) -> String {
        match self {
            Self::Text { column, .. } => {
                format!("(LOWER({column}) = LOWER(?{index}) OR ?{index} = '')")
            }
            Self::Integer { column, .. } => format!("({column} = ?{index} OR ?{index} = 0)"),
        }
    }

    pub fn value(&self) -> Value {
        match self {
            Self::Text { value, .. } => Value::Text(value.clone()),
            Self::Integer { value, .. } => Value::Integer(*value),
        }
    }
}

/// Mandatory parent-scope predicate (`column = value`), e.g. products of
/// one category.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedPredicate {
    pub column: &'static str,
    pub value: RecordId,
}

impl FixedPredicate {
    pub fn predicate_sql(&self, index: usize) -> String {
        format!("{} = ?{index}", self.column)
    }
}
