//! Filter/sort validation and ORDER BY / LIMIT / OFFSET fragment building.
//!
//! # Responsibility
//! - Check paging bounds and resolve a user sort token against a per-resource
//!   safelist.
//! - Turn validated paging state into the only dynamic SQL text the engine
//!   ever assembles.
//!
//! # Invariants
//! - `ValidFilters` can only be produced by validation; the fragment builder
//!   accepts nothing else.
//! - The column spliced into SQL is the `&'static str` safelist entry, never
//!   the caller-supplied token.
//! - `id ASC` is always appended as a tiebreaker so pages partition the
//!   result set.

use crate::validate::{FieldErrors, Validator};
use serde::Serialize;

/// Highest accepted page number.
pub const MAX_PAGE: i64 = 10_000_000;
/// Highest accepted page size.
pub const MAX_PAGE_SIZE: i64 = 100;

/// Raw paging/sorting input for one list request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Filters {
    pub page: i64,
    pub page_size: i64,
    /// Column name, optionally prefixed with `-` for descending order.
    pub sort: String,
    /// Columns the sort token may resolve to.
    pub sort_safe_list: &'static [&'static str],
}

impl Filters {
    pub fn new(
        page: i64,
        page_size: i64,
        sort: impl Into<String>,
        sort_safe_list: &'static [&'static str],
    ) -> Self {
        Self {
            page,
            page_size,
            sort: sort.into(),
            sort_safe_list,
        }
    }

    /// Validates every constraint and returns the proven-safe form.
    ///
    /// All violations are reported together.
    pub fn validate(&self) -> Result<ValidFilters, FieldErrors> {
        let mut v = Validator::new();
        let valid = validate_filters(&mut v, self);
        match valid {
            Some(valid) if v.is_valid() => Ok(valid),
            _ => Err(v.into_errors()),
        }
    }
}

/// Sort direction resolved from the token prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub fn as_sql(self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}

/// Paging state whose sort column is a member of the resource safelist.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidFilters {
    page: u64,
    page_size: u64,
    sort_column: &'static str,
    sort_direction: SortDirection,
}

impl ValidFilters {
    pub fn page(&self) -> u64 {
        self.page
    }

    pub fn page_size(&self) -> u64 {
        self.page_size
    }
}

/// Output of the fragment builder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderAndPage {
    pub sort_column: &'static str,
    pub sort_direction: SortDirection,
    pub limit: u64,
    pub offset: u64,
}

impl OrderAndPage {
    /// `ORDER BY <column> <dir>, id ASC`.
    pub fn order_by_sql(&self) -> String {
        format!(
            "ORDER BY {} {}, id ASC",
            self.sort_column,
            self.sort_direction.as_sql()
        )
    }
}

/// Records filter violations into `v`.
///
/// Returns `Some` only when the paging and sort fields are all valid; other
/// fields already present in `v` do not affect the return value.
pub fn validate_filters(v: &mut Validator, filters: &Filters) -> Option<ValidFilters> {
    v.check(filters.page > 0, "page", "must be greater than zero");
    v.check(
        filters.page <= MAX_PAGE,
        "page",
        "must be a maximum of 10 million",
    );
    v.check(filters.page_size > 0, "page_size", "must be greater than zero");
    v.check(
        filters.page_size <= MAX_PAGE_SIZE,
        "page_size",
        "must be a maximum of 100",
    );

    let resolved = resolve_sort(&filters.sort, filters.sort_safe_list);
    v.check(resolved.is_some(), "sort", "invalid sort value");

    let page_ok = (1..=MAX_PAGE).contains(&filters.page);
    let size_ok = (1..=MAX_PAGE_SIZE).contains(&filters.page_size);
    match resolved {
        Some((sort_column, sort_direction)) if page_ok && size_ok => Some(ValidFilters {
            page: filters.page as u64,
            page_size: filters.page_size as u64,
            sort_column,
            sort_direction,
        }),
        _ => None,
    }
}

/// Builds the ORDER BY / LIMIT / OFFSET inputs from validated filters.
pub fn build_order_and_page(filters: &ValidFilters) -> OrderAndPage {
    OrderAndPage {
        sort_column: filters.sort_column,
        sort_direction: filters.sort_direction,
        limit: filters.page_size,
        offset: (filters.page - 1) * filters.page_size,
    }
}

fn resolve_sort(
    token: &str,
    safe_list: &'static [&'static str],
) -> Option<(&'static str, SortDirection)> {
    let (column, direction) = match token.strip_prefix('-') {
        Some(rest) => (rest, SortDirection::Desc),
        None => (token, SortDirection::Asc),
    };
    safe_list
        .iter()
        .find(|candidate| **candidate == column)
        .map(|candidate| (*candidate, direction))
}

#[cfg(test)]
mod tests {
    use super::{build_order_and_page, Filters, SortDirection};

    const SAFE: &[&str] = &["id", "name"];

    #[test]
    fn descending_token_resolves_column_and_direction() {
        let valid = Filters::new(3, 10, "-name", SAFE).validate().unwrap();
        let fragment = build_order_and_page(&valid);

        assert_eq!(fragment.sort_column, "name");
        assert_eq!(fragment.sort_direction, SortDirection::Desc);
        assert_eq!(fragment.limit, 10);
        assert_eq!(fragment.offset, 20);
        assert_eq!(fragment.order_by_sql(), "ORDER BY name DESC, id ASC");
    }

    #[test]
    fn first_page_has_zero_offset() {
        let valid = Filters::new(1, 20, "id", SAFE).validate().unwrap();
        let fragment = build_order_and_page(&valid);
        assert_eq!(fragment.offset, 0);
        assert_eq!(fragment.sort_direction, SortDirection::Asc);
    }

    #[test]
    fn page_and_page_size_violations_are_reported_together() {
        let errors = Filters::new(0, 101, "id", SAFE).validate().unwrap_err();
        assert_eq!(errors.get("page"), Some("must be greater than zero"));
        assert_eq!(errors.get("page_size"), Some("must be a maximum of 100"));
        assert!(!errors.contains("sort"));
    }

    #[test]
    fn upper_page_bound_is_enforced() {
        let errors = Filters::new(10_000_001, 1, "id", SAFE)
            .validate()
            .unwrap_err();
        assert_eq!(errors.get("page"), Some("must be a maximum of 10 million"));

        assert!(Filters::new(10_000_000, 100, "id", SAFE).validate().is_ok());
    }

    #[test]
    fn unknown_sort_tokens_are_rejected_with_or_without_prefix() {
        for token in ["price", "-price", "", "-", "--name", "NAME", "name "] {
            let errors = Filters::new(1, 10, token, SAFE).validate().unwrap_err();
            assert_eq!(errors.get("sort"), Some("invalid sort value"), "{token:?}");
        }
    }

    #[test]
    fn injection_attempts_never_become_valid_filters() {
        for token in [
            "name; DROP TABLE categories",
            "-id, (SELECT password_hash FROM users)",
            "id--",
            "name ASC, id",
        ] {
            assert!(Filters::new(1, 10, token, SAFE).validate().is_err());
        }
    }

    #[test]
    fn negative_page_size_reports_lower_bound() {
        let errors = Filters::new(1, -5, "id", SAFE).validate().unwrap_err();
        assert_eq!(errors.get("page_size"), Some("must be greater than zero"));
    }
}
