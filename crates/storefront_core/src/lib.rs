//! Core engine for the storefront resource API.
//! Validates list and write requests, runs them against SQLite, and reports
//! results in a transport-neutral error taxonomy.

pub mod config;
pub mod db;
pub mod error;
pub mod logging;
pub mod model;
pub mod query;
pub mod repo;
pub mod service;
pub mod validate;

pub use config::{default_log_level, LogConfig, StoreConfig};
pub use db::{open_db, open_db_in_memory, open_db_with_config, DbError, DbResult};
pub use error::{classify, ConflictKind, ResourceError};
pub use logging::{init_logging, logging_status, LoggingError};
pub use model::{
    Category, CategoryPatch, NewCategory, NewOrder, NewProduct, NewUser, Order, OrderPatch, Patch,
    Product, ProductPatch, RecordId, User, UserPatch,
};
pub use query::{
    build_order_and_page, calculate_metadata, decode_list_filters, validate_filters, Filters,
    ListParams, OrderAndPage, PageMetadata, QueryParams, SortDirection, ValidFilters,
};
pub use repo::{
    Categories, CategoryListFilter, OrderListFilter, Orders, ProductListFilter, Products,
    RepoError, RepoResult, Resource, ResourceRepository, SqliteResourceRepository,
    UserListFilter, Users,
};
pub use service::{
    CategoryService, ListResult, OrderService, ProductService, ResourceService, ServiceResult,
    UserService,
};
pub use validate::{FieldErrors, Validate, Validator};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
