//! Product entity. Belongs to one category.

use super::{Patch, RecordId};
use crate::validate::{check_required_text, FieldErrors, Validate, Validator};
use serde::{Deserialize, Serialize};

const TITLE_MAX_BYTES: usize = 100;
const DESCRIPTION_MAX_BYTES: usize = 1000;

/// A product row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: RecordId,
    pub title: String,
    pub description: String,
    pub price: f64,
    pub category_id: RecordId,
    pub version: i64,
}

/// Creation payload.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct NewProduct {
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub price: f64,
    pub category_id: RecordId,
}

/// Partial update payload.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ProductPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub price: Option<f64>,
    pub category_id: Option<RecordId>,
}

fn check_fields(
    v: &mut Validator,
    title: &str,
    description: &str,
    price: f64,
    category_id: RecordId,
) {
    check_required_text(v, "title", title, TITLE_MAX_BYTES);
    v.check(
        description.len() <= DESCRIPTION_MAX_BYTES,
        "description",
        format!("must not be more than {DESCRIPTION_MAX_BYTES} bytes long"),
    );
    v.check(price.is_finite(), "price", "must be a finite number");
    v.check(price >= 0.0, "price", "must be a non-negative value");
    v.check(category_id > 0, "category_id", "must be a positive value");
}

impl Validate for Product {
    fn validate(&self) -> Result<(), FieldErrors> {
        let mut v = Validator::new();
        check_fields(
            &mut v,
            &self.title,
            &self.description,
            self.price,
            self.category_id,
        );
        v.finish()
    }
}

impl Validate for NewProduct {
    fn validate(&self) -> Result<(), FieldErrors> {
        let mut v = Validator::new();
        check_fields(
            &mut v,
            &self.title,
            &self.description,
            self.price,
            self.category_id,
        );
        v.finish()
    }
}

impl Patch<Product> for ProductPatch {
    fn merge_into(self, existing: Product) -> Product {
        Product {
            title: self.title.unwrap_or(existing.title),
            description: self.description.unwrap_or(existing.description),
            price: self.price.unwrap_or(existing.price),
            category_id: self.category_id.unwrap_or(existing.category_id),
            ..existing
        }
    }

    fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.price.is_none()
            && self.category_id.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::{NewProduct, Product, ProductPatch};
    use crate::model::Patch;
    use crate::validate::Validate;

    fn lamp() -> Product {
        Product {
            id: 3,
            title: "Lamp".to_string(),
            description: "Desk lamp".to_string(),
            price: 19.5,
            category_id: 2,
            version: 4,
        }
    }

    #[test]
    fn single_field_patch_changes_only_that_field() {
        let patch = ProductPatch {
            price: Some(25.0),
            ..ProductPatch::default()
        };
        let merged = patch.merge_into(lamp());

        let expected = Product {
            price: 25.0,
            ..lamp()
        };
        assert_eq!(merged, expected);
        assert_eq!(merged.version, 4);
    }

    #[test]
    fn negative_price_and_missing_title_are_both_reported() {
        let draft = NewProduct {
            title: String::new(),
            description: String::new(),
            price: -1.0,
            category_id: 0,
        };
        let errors = draft.validate().unwrap_err();
        assert_eq!(errors.get("title"), Some("must be provided"));
        assert_eq!(errors.get("price"), Some("must be a non-negative value"));
        assert_eq!(errors.get("category_id"), Some("must be a positive value"));
    }

    #[test]
    fn nan_price_is_rejected() {
        let product = Product {
            price: f64::NAN,
            ..lamp()
        };
        assert!(product.validate().unwrap_err().contains("price"));
    }

    #[test]
    fn patch_is_empty_only_without_fields() {
        assert!(ProductPatch::default().is_empty());
        let patch = ProductPatch {
            description: Some(String::new()),
            ..ProductPatch::default()
        };
        assert!(!patch.is_empty());
    }
}
