//! Category entity.

use super::{Patch, RecordId};
use crate::validate::{check_required_text, FieldErrors, Validate, Validator};
use serde::{Deserialize, Serialize};

const NAME_MAX_BYTES: usize = 100;

/// A product category row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: RecordId,
    pub name: String,
    /// Row version for compare-and-swap updates.
    pub version: i64,
}

/// Creation payload.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct NewCategory {
    pub name: String,
}

impl NewCategory {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// Partial update payload.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct CategoryPatch {
    pub name: Option<String>,
}

fn check_fields(v: &mut Validator, name: &str) {
    check_required_text(v, "name", name, NAME_MAX_BYTES);
}

impl Validate for Category {
    fn validate(&self) -> Result<(), FieldErrors> {
        let mut v = Validator::new();
        check_fields(&mut v, &self.name);
        v.finish()
    }
}

impl Validate for NewCategory {
    fn validate(&self) -> Result<(), FieldErrors> {
        let mut v = Validator::new();
        check_fields(&mut v, &self.name);
        v.finish()
    }
}

impl Patch<Category> for CategoryPatch {
    fn merge_into(self, existing: Category) -> Category {
        Category {
            name: self.name.unwrap_or(existing.name),
            ..existing
        }
    }

    fn is_empty(&self) -> bool {
        self.name.is_none()
    }
}
