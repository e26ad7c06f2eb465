//! Generic resource repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Run paged list queries with a windowed total count.
//! - Provide get/insert/compare-and-swap update/delete for any `Resource`.
//!
//! # Invariants
//! - List ordering always ends with `id ASC`, so pages partition the result.
//! - List rows and total come from one snapshot.
//! - `update` writes only when the stored version matches the entity's.
//! - Ids below 1 are reported missing without touching the store.

use super::executor::SqliteExecutor;
use super::resource::{FixedPredicate, Resource};
use super::{RepoError, RepoResult};
use crate::config::StoreConfig;
use crate::model::RecordId;
use crate::query::{build_order_and_page, ValidFilters};
use crate::validate::Validate;
use rusqlite::types::Value;
use rusqlite::Connection;
use std::marker::PhantomData;

/// One page of rows plus the total across all pages.
#[derive(Debug, Clone, PartialEq)]
pub struct ListPage<E> {
    pub rows: Vec<E>,
    pub total_records: u64,
}

/// Repository interface for one resource.
pub trait ResourceRepository<R: Resource> {
    fn list_page(
        &self,
        fixed: &[FixedPredicate],
        filter: &R::ListFilter,
        filters: &ValidFilters,
    ) -> RepoResult<ListPage<R::Entity>>;
    fn get(&self, id: RecordId) -> RepoResult<R::Entity>;
    fn insert(&self, draft: &R::Draft) -> RepoResult<R::Entity>;
    /// Writes `entity` if its version is still current; returns the stored
    /// row with the bumped version.
    fn update(&self, entity: &R::Entity) -> RepoResult<R::Entity>;
    fn delete(&self, id: RecordId) -> RepoResult<()>;
}

/// SQLite-backed repository for resource `R`.
pub struct SqliteResourceRepository<'conn, R> {
    exec: SqliteExecutor<'conn>,
    _resource: PhantomData<R>,
}

impl<'conn, R: Resource> SqliteResourceRepository<'conn, R> {
    pub fn new(conn: &'conn Connection, config: &StoreConfig) -> Self {
        Self::with_executor(SqliteExecutor::new(conn, config))
    }

    pub fn with_executor(exec: SqliteExecutor<'conn>) -> Self {
        Self {
            exec,
            _resource: PhantomData,
        }
    }

    fn select_sql() -> String {
        format!("SELECT {} FROM {}", R::COLUMNS.join(", "), R::TABLE)
    }

    fn exists(&self, id: RecordId) -> RepoResult<bool> {
        let sql = format!("SELECT EXISTS(SELECT 1 FROM {} WHERE id = ?1)", R::TABLE);
        let found = self
            .exec
            .fetch_optional(&sql, &[Value::Integer(id)], |row| row.get::<_, bool>(0))?;
        Ok(found.unwrap_or(false))
    }

    fn not_found(id: RecordId) -> RepoError {
        RepoError::NotFound {
            resource: R::NAME,
            id,
        }
    }
}

/// WHERE clause and its positional arguments for a list request.
struct ListPredicate {
    sql: String,
    args: Vec<Value>,
}

fn list_predicate<R: Resource>(fixed: &[FixedPredicate], filter: &R::ListFilter) -> ListPredicate {
    let mut sql = String::from(" WHERE 1 = 1");
    let mut args = Vec::new();

    for predicate in fixed {
        args.push(Value::Integer(predicate.value));
        sql.push_str(" AND ");
        sql.push_str(&predicate.predicate_sql(args.len()));
    }
    for equality in R::equality_filters(filter) {
        args.push(equality.value());
        sql.push_str(" AND ");
        sql.push_str(&equality.predicate_sql(args.len()));
    }

    ListPredicate { sql, args }
}

fn to_sql_int(value: u64) -> RepoResult<i64> {
    i64::try_from(value)
        .map_err(|_| RepoError::InvalidData(format!("paging value out of range: {value}")))
}

fn to_total(value: i64) -> RepoResult<u64> {
    u64::try_from(value)
        .map_err(|_| RepoError::InvalidData(format!("negative total count: {value}")))
}

impl<R: Resource> ResourceRepository<R> for SqliteResourceRepository<'_, R> {
    fn list_page(
        &self,
        fixed: &[FixedPredicate],
        filter: &R::ListFilter,
        filters: &ValidFilters,
    ) -> RepoResult<ListPage<R::Entity>> {
        let fragment = build_order_and_page(filters);
        let predicate = list_predicate::<R>(fixed, filter);

        let mut sql = format!(
            "SELECT count(*) OVER() AS total_records, {} FROM {}",
            R::COLUMNS.join(", "),
            R::TABLE
        );
        sql.push_str(&predicate.sql);
        sql.push(' ');
        sql.push_str(&fragment.order_by_sql());

        let mut args = predicate.args.clone();
        args.push(Value::Integer(to_sql_int(fragment.limit)?));
        sql.push_str(&format!(" LIMIT ?{}", args.len()));
        args.push(Value::Integer(to_sql_int(fragment.offset)?));
        sql.push_str(&format!(" OFFSET ?{}", args.len()));

        self.exec.snapshot(|| {
            let mut total_records = 0_i64;
            let rows = self.exec.fetch_all(&sql, &args, |row| {
                total_records = row.get("total_records")?;
                R::decode(row)
            })?;

            if rows.is_empty() && fragment.offset > 0 {
                let count_sql = format!("SELECT count(*) FROM {}{}", R::TABLE, predicate.sql);
                total_records = self
                    .exec
                    .fetch_optional(&count_sql, &predicate.args, |row| row.get::<_, i64>(0))?
                    .unwrap_or(0);
            }

            Ok(ListPage {
                rows,
                total_records: to_total(total_records)?,
            })
        })
    }

    fn get(&self, id: RecordId) -> RepoResult<R::Entity> {
        if id < 1 {
            return Err(Self::not_found(id));
        }

        let sql = format!("{} WHERE id = ?1", Self::select_sql());
        self.exec
            .fetch_optional(&sql, &[Value::Integer(id)], R::decode)?
            .ok_or_else(|| Self::not_found(id))
    }

    fn insert(&self, draft: &R::Draft) -> RepoResult<R::Entity> {
        draft.validate()?;

        let placeholders = (1..=R::WRITABLE_COLUMNS.len())
            .map(|index| format!("?{index}"))
            .collect::<Vec<_>>()
            .join(", ");
        let sql = format!(
            "INSERT INTO {} ({}) VALUES ({}) RETURNING {}",
            R::TABLE,
            R::WRITABLE_COLUMNS.join(", "),
            placeholders,
            R::COLUMNS.join(", ")
        );

        self.exec
            .fetch_optional(&sql, &R::draft_values(draft), R::decode)?
            .ok_or_else(|| {
                RepoError::InvalidData(format!("insert into {} returned no row", R::TABLE))
            })
    }

    fn update(&self, entity: &R::Entity) -> RepoResult<R::Entity> {
        entity.validate()?;

        let id = R::id(entity);
        if id < 1 {
            return Err(Self::not_found(id));
        }

        let mut args = R::write_values(entity);
        let assignments = R::WRITABLE_COLUMNS
            .iter()
            .enumerate()
            .map(|(index, column)| format!("{column} = ?{}", index + 1))
            .collect::<Vec<_>>()
            .join(", ");
        args.push(Value::Integer(id));
        let id_index = args.len();
        args.push(Value::Integer(R::version(entity)));
        let version_index = args.len();

        let sql = format!(
            "UPDATE {} SET {assignments}, version = version + 1 \
             WHERE id = ?{id_index} AND version = ?{version_index} RETURNING {}",
            R::TABLE,
            R::COLUMNS.join(", ")
        );

        self.exec.snapshot(|| {
            match self.exec.fetch_optional(&sql, &args, R::decode)? {
                Some(updated) => Ok(updated),
                None if self.exists(id)? => Err(RepoError::EditConflict {
                    resource: R::NAME,
                    id,
                }),
                None => Err(Self::not_found(id)),
            }
        })
    }

    fn delete(&self, id: RecordId) -> RepoResult<()> {
        if id < 1 {
            return Err(Self::not_found(id));
        }

        let sql = format!("DELETE FROM {} WHERE id = ?1", R::TABLE);
        let changed = self.exec.execute(&sql, &[Value::Integer(id)])?;
        if changed == 0 {
            return Err(Self::not_found(id));
        }
        Ok(())
    }
}
