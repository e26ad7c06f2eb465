//! Entity models for the four storefront resources.
//!
//! # Responsibility
//! - Define the in-memory projection of each store row.
//! - Define creation payloads (drafts) and optional-field patches.
//! - Own field validation and the patch merge rule.
//!
//! # Invariants
//! - `id` and `version` are assigned by the store and never patched.
//! - A patch field that is `None` leaves the existing value untouched; any
//!   `Some` value (including an empty string) overwrites it.
//! - Merged entities are validated with the same rules as drafts.

pub mod category;
pub mod order;
pub mod product;
pub mod user;

/// Database-assigned row identity.
pub type RecordId = i64;

/// A partial update for entity `E`.
pub trait Patch<E> {
    /// Overlays present fields onto `existing`. Identity is kept from
    /// `existing`.
    fn merge_into(self, existing: E) -> E;

    /// Returns true when no field is present.
    fn is_empty(&self) -> bool;
}

pub use category::{Category, CategoryPatch, NewCategory};
pub use order::{NewOrder, Order, OrderPatch};
pub use product::{NewProduct, Product, ProductPatch};
pub use user::{NewUser, User, UserPatch};
