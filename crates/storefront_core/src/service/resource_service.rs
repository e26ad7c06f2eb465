//! Resource use-case service.
//!
//! # Responsibility
//! - Provide list/get/create/update/delete entry points for any resource.
//! - Validate input before the repository is touched.
//! - Classify repository failures and emit one log event per call.
//!
//! # Invariants
//! - Invalid paging, sort or entity input never reaches the store.
//! - Update is fetch, merge, validate, then a version-checked write.
//! - Logs carry ids, counts and error codes only, never field values.

use crate::config::StoreConfig;
use crate::error::{classify, ResourceError};
use crate::model::{Patch, RecordId};
use crate::query::{
    calculate_metadata, decode_list_filters, Filters, PageMetadata, QueryParams, ValidFilters,
};
use crate::repo::{
    Categories, FixedPredicate, Orders, Products, RepoError, Resource, ResourceRepository,
    SqliteResourceRepository, Users,
};
use crate::validate::{FieldErrors, Validate, Validator};
use log::{debug, error, info, warn};
use rusqlite::Connection;
use serde::Serialize;
use std::marker::PhantomData;
use std::time::Instant;

pub type ServiceResult<T> = Result<T, ResourceError>;

/// Rows of one page plus pagination metadata.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ListResult<E> {
    pub items: Vec<E>,
    pub metadata: PageMetadata,
}

/// Use-case service for one resource.
pub struct ResourceService<R: Resource, P: ResourceRepository<R>> {
    repo: P,
    default_page_size: i64,
    _resource: PhantomData<R>,
}

pub type SqliteResourceService<'conn, R> = ResourceService<R, SqliteResourceRepository<'conn, R>>;
pub type CategoryService<'conn> = SqliteResourceService<'conn, Categories>;
pub type ProductService<'conn> = SqliteResourceService<'conn, Products>;
pub type OrderService<'conn> = SqliteResourceService<'conn, Orders>;
pub type UserService<'conn> = SqliteResourceService<'conn, Users>;

impl<'conn, R: Resource> ResourceService<R, SqliteResourceRepository<'conn, R>> {
    /// Builds a SQLite-backed service using `config` for deadline and
    /// default page size.
    pub fn sqlite(conn: &'conn Connection, config: &StoreConfig) -> Self {
        Self::new(SqliteResourceRepository::new(conn, config))
            .with_default_page_size(config.default_page_size)
    }
}

impl<R: Resource, P: ResourceRepository<R>> ResourceService<R, P> {
    pub fn new(repo: P) -> Self {
        Self {
            repo,
            default_page_size: crate::query::DEFAULT_PAGE_SIZE,
            _resource: PhantomData,
        }
    }

    pub fn with_default_page_size(mut self, page_size: i64) -> Self {
        self.default_page_size = page_size;
        self
    }

    /// Lists one page of the resource.
    ///
    /// Paging and sort are validated against `R::SORT_SAFE_LIST` first; a
    /// violation returns `ValidationFailed` without querying.
    pub fn list(
        &self,
        filter: &R::ListFilter,
        filters: &Filters,
    ) -> ServiceResult<ListResult<R::Entity>> {
        self.list_within(&[], filter, filters)
    }

    /// Lists one page restricted by parent predicates, e.g. the products of
    /// one category.
    pub fn list_within(
        &self,
        fixed: &[FixedPredicate],
        filter: &R::ListFilter,
        filters: &Filters,
    ) -> ServiceResult<ListResult<R::Entity>> {
        let scoped = Filters {
            sort_safe_list: R::SORT_SAFE_LIST,
            ..filters.clone()
        };
        let valid = match scoped.validate() {
            Ok(valid) => valid,
            Err(errors) => return Err(self.rejected("list", errors)),
        };
        self.list_valid(fixed, filter, &valid)
    }

    /// Decodes filters and paging from query pairs, then lists.
    ///
    /// Decode errors and bounds errors are reported together.
    pub fn list_from_query(
        &self,
        fixed: &[FixedPredicate],
        qs: &QueryParams,
    ) -> ServiceResult<ListResult<R::Entity>> {
        let mut v = Validator::new();
        let filter = R::read_list_filter(qs, &mut v);
        let valid = match decode_list_filters(qs, R::SORT_SAFE_LIST, self.default_page_size, v) {
            Ok(valid) => valid,
            Err(errors) => return Err(self.rejected("list", errors)),
        };
        self.list_valid(fixed, &filter, &valid)
    }

    fn list_valid(
        &self,
        fixed: &[FixedPredicate],
        filter: &R::ListFilter,
        valid: &ValidFilters,
    ) -> ServiceResult<ListResult<R::Entity>> {
        let started_at = Instant::now();
        let page = self
            .repo
            .list_page(fixed, filter, valid)
            .map_err(|err| self.failed("list", started_at, err))?;

        debug!(
            "event=resource_list module=service status=ok resource={} duration_ms={} page={} page_size={} rows={} total_records={}",
            R::NAME,
            started_at.elapsed().as_millis(),
            valid.page(),
            valid.page_size(),
            page.rows.len(),
            page.total_records
        );
        Ok(ListResult {
            items: page.rows,
            metadata: calculate_metadata(page.total_records, valid.page(), valid.page_size()),
        })
    }

    pub fn get(&self, id: RecordId) -> ServiceResult<R::Entity> {
        let started_at = Instant::now();
        let entity = self
            .repo
            .get(id)
            .map_err(|err| self.failed("get", started_at, err))?;
        debug!(
            "event=resource_get module=service status=ok resource={} id={id} duration_ms={}",
            R::NAME,
            started_at.elapsed().as_millis()
        );
        Ok(entity)
    }

    pub fn create(&self, draft: &R::Draft) -> ServiceResult<R::Entity> {
        if let Err(errors) = draft.validate() {
            return Err(self.rejected("create", errors));
        }

        let started_at = Instant::now();
        let created = self
            .repo
            .insert(draft)
            .map_err(|err| self.failed("create", started_at, err))?;
        info!(
            "event=resource_create module=service status=ok resource={} id={} duration_ms={}",
            R::NAME,
            R::id(&created),
            started_at.elapsed().as_millis()
        );
        Ok(created)
    }

    /// Applies `patch` to the stored row.
    ///
    /// An empty patch returns the current row without writing.
    pub fn update(&self, id: RecordId, patch: R::Patch) -> ServiceResult<R::Entity> {
        let started_at = Instant::now();
        let existing = self
            .repo
            .get(id)
            .map_err(|err| self.failed("update", started_at, err))?;
        if patch.is_empty() {
            return Ok(existing);
        }

        let merged = patch.merge_into(existing);
        if let Err(errors) = merged.validate() {
            return Err(self.rejected("update", errors));
        }

        let updated = self
            .repo
            .update(&merged)
            .map_err(|err| self.failed("update", started_at, err))?;
        info!(
            "event=resource_update module=service status=ok resource={} id={id} version={} duration_ms={}",
            R::NAME,
            R::version(&updated),
            started_at.elapsed().as_millis()
        );
        Ok(updated)
    }

    pub fn delete(&self, id: RecordId) -> ServiceResult<()> {
        let started_at = Instant::now();
        self.repo
            .delete(id)
            .map_err(|err| self.failed("delete", started_at, err))?;
        info!(
            "event=resource_delete module=service status=ok resource={} id={id} duration_ms={}",
            R::NAME,
            started_at.elapsed().as_millis()
        );
        Ok(())
    }

    fn rejected(&self, op: &str, errors: FieldErrors) -> ResourceError {
        debug!(
            "event=resource_{op} module=service status=rejected resource={} fields={}",
            R::NAME,
            errors.fields().join(",")
        );
        ResourceError::ValidationFailed(errors)
    }

    fn failed(&self, op: &str, started_at: Instant, err: RepoError) -> ResourceError {
        let duration_ms = started_at.elapsed().as_millis();
        let detail = err.to_string();
        let classified = classify(err, R::NAME);
        match &classified {
            ResourceError::Internal => error!(
                "event=resource_{op} module=service status=error resource={} duration_ms={duration_ms} error_code={} error={detail}",
                R::NAME,
                classified.code()
            ),
            ResourceError::Conflict { .. } => warn!(
                "event=resource_{op} module=service status=conflict resource={} duration_ms={duration_ms} error_code={}",
                R::NAME,
                classified.code()
            ),
            _ => debug!(
                "event=resource_{op} module=service status=error resource={} duration_ms={duration_ms} error_code={}",
                R::NAME,
                classified.code()
            ),
        }
        classified
    }
}
