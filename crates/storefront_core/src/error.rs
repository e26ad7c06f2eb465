//! Caller-facing error taxonomy.
//!
//! # Responsibility
//! - Collapse repository failures into the four outcomes an HTTP layer maps
//!   to status codes.
//!
//! # Invariants
//! - `Internal` carries no detail; its `Display` is a fixed generic message.
//! - Classification is pure. Logging of internal causes happens at the
//!   service boundary before conversion.

use crate::model::RecordId;
use crate::repo::RepoError;
use crate::validate::FieldErrors;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Why a write conflicted with stored state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConflictKind {
    /// Row changed since it was read.
    Edit,
    /// A unique, foreign-key or check constraint rejected the write.
    Constraint,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResourceError {
    ValidationFailed(FieldErrors),
    NotFound {
        resource: &'static str,
        id: RecordId,
    },
    Conflict {
        resource: &'static str,
        kind: ConflictKind,
    },
    Internal,
}

impl ResourceError {
    /// HTTP status a transport layer should answer with.
    pub fn status_code(&self) -> u16 {
        match self {
            Self::ValidationFailed(_) => 400,
            Self::NotFound { .. } => 404,
            Self::Conflict { .. } => 409,
            Self::Internal => 500,
        }
    }

    /// Stable machine-readable code, safe for responses and logs.
    pub fn code(&self) -> &'static str {
        match self {
            Self::ValidationFailed(_) => "validation_failed",
            Self::NotFound { .. } => "not_found",
            Self::Conflict {
                kind: ConflictKind::Edit,
                ..
            } => "edit_conflict",
            Self::Conflict {
                kind: ConflictKind::Constraint,
                ..
            } => "constraint_conflict",
            Self::Internal => "internal",
        }
    }

    pub fn field_errors(&self) -> Option<&FieldErrors> {
        match self {
            Self::ValidationFailed(errors) => Some(errors),
            _ => None,
        }
    }
}

impl Display for ResourceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ValidationFailed(errors) => write!(f, "validation failed: {errors}"),
            Self::NotFound { resource, .. } => {
                write!(f, "the requested {resource} could not be found")
            }
            Self::Conflict {
                kind: ConflictKind::Edit,
                ..
            } => write!(
                f,
                "unable to update the record due to an edit conflict, please try again"
            ),
            Self::Conflict {
                kind: ConflictKind::Constraint,
                resource,
            } => write!(f, "the {resource} conflicts with existing data"),
            Self::Internal => write!(
                f,
                "the server encountered a problem and could not process your request"
            ),
        }
    }
}

impl Error for ResourceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::ValidationFailed(errors) => Some(errors),
            _ => None,
        }
    }
}

impl From<FieldErrors> for ResourceError {
    fn from(value: FieldErrors) -> Self {
        Self::ValidationFailed(value)
    }
}

/// Maps a repository outcome to the caller-facing taxonomy. Pure.
///
/// `resource` names the entity for constraint conflicts, which the store
/// reports without one.
pub fn classify(err: RepoError, resource: &'static str) -> ResourceError {
    match err {
        RepoError::Validation(errors) => ResourceError::ValidationFailed(errors),
        RepoError::NotFound { resource, id } => ResourceError::NotFound { resource, id },
        RepoError::EditConflict { resource, .. } => ResourceError::Conflict {
            resource,
            kind: ConflictKind::Edit,
        },
        RepoError::Constraint(_) => ResourceError::Conflict {
            resource,
            kind: ConflictKind::Constraint,
        },
        RepoError::Timeout { .. }
        | RepoError::Decode(_)
        | RepoError::InvalidData(_)
        | RepoError::Db(_) => ResourceError::Internal,
    }
}
