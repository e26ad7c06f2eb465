//! List-request building blocks shared by every resource.
//!
//! # Responsibility
//! - Validate paging and sort input (`filters`).
//! - Build the ORDER BY / LIMIT / OFFSET fragment (`filters`).
//! - Derive pagination metadata (`metadata`).
//! - Decode list parameters from query-string pairs (`params`).
//!
//! Everything here is pure and performs no I/O.

pub mod filters;
pub mod metadata;
pub mod params;

pub use filters::{
    build_order_and_page, validate_filters, Filters, OrderAndPage, SortDirection, ValidFilters,
    MAX_PAGE, MAX_PAGE_SIZE,
};
pub use metadata::{calculate_metadata, PageMetadata};
pub use params::{decode_list_filters, ListParams, QueryParams, DEFAULT_PAGE_SIZE};
