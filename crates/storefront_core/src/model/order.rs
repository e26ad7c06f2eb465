//! Order entity. References one product.

use super::{Patch, RecordId};
use crate::validate::{FieldErrors, Validate, Validator};
use serde::{Deserialize, Serialize};

/// An order row. `created_at` is assigned by the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub id: RecordId,
    pub product_id: RecordId,
    pub quantity: i64,
    pub created_at: String,
    pub version: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct NewOrder {
    pub product_id: RecordId,
    pub quantity: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct OrderPatch {
    pub product_id: Option<RecordId>,
    pub quantity: Option<i64>,
}

fn check_fields(v: &mut Validator, product_id: RecordId, quantity: i64) {
    v.check(product_id > 0, "product_id", "must be a positive value");
    v.check(quantity > 0, "quantity", "must be a positive value");
}

impl Validate for Order {
    fn validate(&self) -> Result<(), FieldErrors> {
        let mut v = Validator::new();
        check_fields(&mut v, self.product_id, self.quantity);
        v.finish()
    }
}

impl Validate for NewOrder {
    fn validate(&self) -> Result<(), FieldErrors> {
        let mut v = Validator::new();
        check_fields(&mut v, self.product_id, self.quantity);
        v.finish()
    }
}

impl Patch<Order> for OrderPatch {
    fn merge_into(self, existing: Order) -> Order {
        Order {
            product_id: self.product_id.unwrap_or(existing.product_id),
            quantity: self.quantity.unwrap_or(existing.quantity),
            ..existing
        }
    }

    fn is_empty(&self) -> bool {
        self.product_id.is_none() && self.quantity.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::{Order, OrderPatch};
    use crate::model::Patch;
    use crate::validate::Validate;

    #[test]
    fn created_at_survives_merge() {
        let existing = Order {
            id: 1,
            product_id: 2,
            quantity: 3,
            created_at: "2024-01-01 00:00:00".to_string(),
            version: 1,
        };
        let merged = OrderPatch {
            quantity: Some(0),
            ..OrderPatch::default()
        }
        .merge_into(existing.clone());

        assert_eq!(merged.created_at, existing.created_at);
        assert_eq!(merged.quantity, 0);
        assert_eq!(
            merged.validate().unwrap_err().get("quantity"),
            Some("must be a positive value")
        );
    }
}
