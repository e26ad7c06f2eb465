//! Query-string decoding for list requests.
//!
//! # Responsibility
//! - Read typed values out of already percent-decoded query pairs.
//! - Record decode failures in the same `Validator` that later checks bounds,
//!   so callers see every problem in one response.
//!
//! # Invariants
//! - A value that fails to parse falls back to its default after recording
//!   `"must be an integer value"`.
//! - The last occurrence of a repeated key wins.

use super::filters::{validate_filters, Filters, ValidFilters};
use crate::validate::{FieldErrors, Validator};
use std::collections::HashMap;

/// Default page size when the request does not name one.
pub const DEFAULT_PAGE_SIZE: i64 = 20;

/// Decoded query-string pairs.
#[derive(Debug, Clone, Default)]
pub struct QueryParams {
    values: HashMap<String, String>,
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for QueryParams {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Self {
            values: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

impl QueryParams {
    /// Returns the trimmed value for `key`, or `default` when absent/blank.
    pub fn read_string(&self, key: &str, default: &str) -> String {
        match self.values.get(key).map(|value| value.trim()) {
            Some(value) if !value.is_empty() => value.to_string(),
            _ => default.to_string(),
        }
    }

    /// Parses an integer for `key`; records an error on malformed input.
    pub fn read_int(&self, key: &str, default: i64, v: &mut Validator) -> i64 {
        self.read_int_any(&[key], key, default, v)
    }

    fn read_int_any(&self, keys: &[&str], field: &str, default: i64, v: &mut Validator) -> i64 {
        let raw = keys
            .iter()
            .find_map(|key| self.values.get(*key))
            .map(|value| value.trim())
            .filter(|value| !value.is_empty());

        match raw {
            None => default,
            Some(value) => match value.parse::<i64>() {
                Ok(parsed) => parsed,
                Err(_) => {
                    v.add_error(field, "must be an integer value");
                    default
                }
            },
        }
    }
}

/// Generic paging/sorting parameters read from a query string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListParams {
    pub page: i64,
    pub page_size: i64,
    pub sort: String,
}

impl ListParams {
    /// Reads `page`, `page_size` (or `pageSize`) and `sort`.
    pub fn read(qs: &QueryParams, default_page_size: i64, v: &mut Validator) -> Self {
        Self {
            page: qs.read_int("page", 1, v),
            page_size: qs.read_int_any(
                &["page_size", "pageSize"],
                "page_size",
                default_page_size,
                v,
            ),
            sort: qs.read_string("sort", "id"),
        }
    }

    pub fn into_filters(self, sort_safe_list: &'static [&'static str]) -> Filters {
        Filters::new(self.page, self.page_size, self.sort, sort_safe_list)
    }
}

/// Decodes and validates list paging in one pass.
///
/// `v` may already hold errors from resource-specific decoding; they are
/// returned together with any paging errors.
pub fn decode_list_filters(
    qs: &QueryParams,
    sort_safe_list: &'static [&'static str],
    default_page_size: i64,
    mut v: Validator,
) -> Result<ValidFilters, FieldErrors> {
    let filters = ListParams::read(qs, default_page_size, &mut v).into_filters(sort_safe_list);
    match validate_filters(&mut v, &filters) {
        Some(valid) if v.is_valid() => Ok(valid),
        _ => Err(v.into_errors()),
    }
}
