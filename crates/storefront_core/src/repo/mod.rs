//! Repository layer: statement execution and generic resource persistence.
//!
//! # Responsibility
//! - Run parameterized statements under a per-operation deadline.
//! - Describe each resource (table, columns, safelist, row decoder) once and
//!   drive all four through one generic repository.
//! - Translate raw SQLite failures into semantic repository errors.
//!
//! # Invariants
//! - Only safelisted column names and static descriptor text are spliced
//!   into SQL; every value is bound as a parameter.
//! - Write paths validate entities before any SQL mutation.
//! - A row that fails to decode aborts the whole operation.

use crate::db::DbError;
use crate::model::RecordId;
use crate::validate::FieldErrors;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Duration;

pub mod executor;
pub mod resource;
pub mod resource_repo;
pub mod resources;

pub use executor::SqliteExecutor;
pub use resource::{EqualityFilter, FixedPredicate, Resource};
pub use resource_repo::{ListPage, ResourceRepository, SqliteResourceRepository};
pub use resources::{
    Categories, CategoryListFilter, OrderListFilter, Orders, ProductListFilter, Products,
    UserListFilter, Users,
};

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for resource persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    /// Entity failed field validation before reaching the store.
    Validation(FieldErrors),
    /// No row with this id.
    NotFound {
        resource: &'static str,
        id: RecordId,
    },
    /// Row exists but its version moved since it was read.
    EditConflict {
        resource: &'static str,
        id: RecordId,
    },
    /// Unique, foreign-key, check or not-null constraint rejected the write.
    Constraint(rusqlite::Error),
    /// The operation ran past its deadline and was interrupted.
    Timeout { elapsed: Duration },
    /// A selected column could not be decoded into the entity field.
    Decode(rusqlite::Error),
    /// Store returned a shape the engine cannot accept.
    InvalidData(String),
    Db(DbError),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(errors) => write!(f, "validation failed: {errors}"),
            Self::NotFound { resource, id } => write!(f, "{resource} not found: {id}"),
            Self::EditConflict { resource, id } => {
                write!(f, "{resource} {id} was modified concurrently")
            }
            Self::Constraint(err) => write!(f, "constraint violation: {err}"),
            Self::Timeout { elapsed } => {
                write!(f, "statement interrupted after {} ms", elapsed.as_millis())
            }
            Self::Decode(err) => write!(f, "row decode failed: {err}"),
            Self::InvalidData(message) => write!(f, "invalid store data: {message}"),
            Self::Db(err) => write!(f, "{err}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(errors) => Some(errors),
            Self::Constraint(err) | Self::Decode(err) => Some(err),
            Self::Db(err) => Some(err),
            Self::NotFound { .. }
            | Self::EditConflict { .. }
            | Self::Timeout { .. }
            | Self::InvalidData(_) => None,
        }
    }
}

impl From<FieldErrors> for RepoError {
    fn from(value: FieldErrors) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

/// Maps a raw SQLite failure to a repository error.
///
/// `deadline_passed` tells an interrupt caused by the deadline apart from one
/// requested elsewhere. Pure.
pub fn classify_sqlite_error(
    err: rusqlite::Error,
    deadline_passed: bool,
    elapsed: Duration,
) -> RepoError {
    use rusqlite::ErrorCode;

    match &err {
        rusqlite::Error::SqliteFailure(inner, _) => match inner.code {
            ErrorCode::ConstraintViolation => RepoError::Constraint(err),
            ErrorCode::OperationInterrupted if deadline_passed => RepoError::Timeout { elapsed },
            _ => RepoError::Db(DbError::Sqlite(err)),
        },
        rusqlite::Error::InvalidColumnType(..)
        | rusqlite::Error::FromSqlConversionFailure(..)
        | rusqlite::Error::IntegralValueOutOfRange(..)
        | rusqlite::Error::InvalidColumnName(_)
        | rusqlite::Error::InvalidColumnIndex(_) => RepoError::Decode(err),
        _ => RepoError::Db(DbError::Sqlite(err)),
    }
}

#[cfg(test)]
mod tests {
    use super::{classify_sqlite_error, RepoError};
    use rusqlite::ffi;
    use std::time::Duration;

    fn failure(code: std::os::raw::c_int) -> rusqlite::Error {
        rusqlite::Error::SqliteFailure(ffi::Error::new(code), None)
    }

    #[test]
    fn constraint_codes_classify_as_constraint() {
        let err = classify_sqlite_error(
            failure(ffi::SQLITE_CONSTRAINT_FOREIGNKEY),
            false,
            Duration::ZERO,
        );
        assert!(matches!(err, RepoError::Constraint(_)));
    }

    #[test]
    fn interrupt_is_timeout_only_past_deadline() {
        let timed_out = classify_sqlite_error(
            failure(ffi::SQLITE_INTERRUPT),
            true,
            Duration::from_millis(3001),
        );
        assert!(matches!(timed_out, RepoError::Timeout { .. }));

        let interrupted =
            classify_sqlite_error(failure(ffi::SQLITE_INTERRUPT), false, Duration::ZERO);
        assert!(matches!(interrupted, RepoError::Db(_)));
    }

    #[test]
    fn column_type_mismatch_is_decode_failure() {
        let err = classify_sqlite_error(
            rusqlite::Error::InvalidColumnType(
                1,
                "name".to_string(),
                rusqlite::types::Type::Integer,
            ),
            false,
            Duration::ZERO,
        );
        assert!(matches!(err, RepoError::Decode(_)));
    }
}
