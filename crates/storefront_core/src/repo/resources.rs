//! Descriptors for the four storefront resources.

use super::resource::{EqualityFilter, FixedPredicate, Resource};
use crate::model::{
    Category, CategoryPatch, NewCategory, NewOrder, NewProduct, NewUser, Order, OrderPatch,
    Product, ProductPatch, RecordId, User, UserPatch,
};
use crate::query::QueryParams;
use crate::validate::Validator;
use rusqlite::types::Value;
use rusqlite::Row;

pub struct Categories;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CategoryListFilter {
    pub name: String,
}

impl Resource for Categories {
    type Entity = Category;
    type Draft = NewCategory;
    type Patch = CategoryPatch;
    type ListFilter = CategoryListFilter;

    const NAME: &'static str = "category";
    const TABLE: &'static str = "categories";
    const COLUMNS: &'static [&'static str] = &["id", "name", "version"];
    const WRITABLE_COLUMNS: &'static [&'static str] = &["name"];
    const SORT_SAFE_LIST: &'static [&'static str] = &["id", "name"];

    fn decode(row: &Row<'_>) -> rusqlite::Result<Category> {
        Ok(Category {
            id: row.get("id")?,
            name: row.get("name")?,
            version: row.get("version")?,
        })
    }

    fn id(entity: &Category) -> RecordId {
        entity.id
    }

    fn version(entity: &Category) -> i64 {
        entity.version
    }

    fn draft_values(draft: &NewCategory) -> Vec<Value> {
        vec![Value::Text(draft.name.clone())]
    }

    fn write_values(entity: &Category) -> Vec<Value> {
        vec![Value::Text(entity.name.clone())]
    }

    fn equality_filters(filter: &CategoryListFilter) -> Vec<EqualityFilter> {
        vec![EqualityFilter::Text {
            column: "name",
            value: filter.name.clone(),
        }]
    }

    fn read_list_filter(qs: &QueryParams, _v: &mut Validator) -> CategoryListFilter {
        CategoryListFilter {
            name: qs.read_string("name", ""),
        }
    }
}

pub struct Products;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductListFilter {
    pub title: String,
    /// `0` lists every category.
    pub category_id: RecordId,
}

impl Products {
    /// Scopes a list to one category.
    pub fn in_category(category_id: RecordId) -> FixedPredicate {
        FixedPredicate {
            column: "category_id",
            value: category_id,
        }
    }
}

impl Resource for Products {
    type Entity = Product;
    type Draft = NewProduct;
    type Patch = ProductPatch;
    type ListFilter = ProductListFilter;

    const NAME: &'static str = "product";
    const TABLE: &'static str = "products";
    const COLUMNS: &'static [&'static str] = &[
        "id",
        "title",
        "description",
        "price",
        "category_id",
        "version",
    ];
    const WRITABLE_COLUMNS: &'static [&'static str] =
        &["title", "description", "price", "category_id"];
    const SORT_SAFE_LIST: &'static [&'static str] =
        &["id", "title", "description", "price", "category_id"];

    fn decode(row: &Row<'_>) -> rusqlite::Result<Product> {
        Ok(Product {
            id: row.get("id")?,
            title: row.get("title")?,
            description: row.get("description")?,
            price: row.get("price")?,
            category_id: row.get("category_id")?,
            version: row.get("version")?,
        })
    }

    fn id(entity: &Product) -> RecordId {
        entity.id
    }

    fn version(entity: &Product) -> i64 {
        entity.version
    }

    fn draft_values(draft: &NewProduct) -> Vec<Value> {
        vec![
            Value::Text(draft.title.clone()),
            Value::Text(draft.description.clone()),
            Value::Real(draft.price),
            Value::Integer(draft.category_id),
        ]
    }

    fn write_values(entity: &Product) -> Vec<Value> {
        vec![
            Value::Text(entity.title.clone()),
            Value::Text(entity.description.clone()),
            Value::Real(entity.price),
            Value::Integer(entity.category_id),
        ]
    }

    fn equality_filters(filter: &ProductListFilter) -> Vec<EqualityFilter> {
        vec![
            EqualityFilter::Text {
                column: "title",
                value: filter.title.clone(),
            },
            EqualityFilter::Integer {
                column: "category_id",
                value: filter.category_id,
            },
        ]
    }

    fn read_list_filter(qs: &QueryParams, v: &mut Validator) -> ProductListFilter {
        ProductListFilter {
            title: qs.read_string("title", ""),
            category_id: qs.read_int("category_id", 0, v),
        }
    }
}

pub struct Orders;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrderListFilter {
    /// `0` lists orders for every product.
    pub product_id: RecordId,
}

impl Orders {
    /// Scopes a list to one product.
    pub fn for_product(product_id: RecordId) -> FixedPredicate {
        FixedPredicate {
            column: "product_id",
            value: product_id,
        }
    }
}

impl Resource for Orders {
    type Entity = Order;
    type Draft = NewOrder;
    type Patch = OrderPatch;
    type ListFilter = OrderListFilter;

    const NAME: &'static str = "order";
    const TABLE: &'static str = "orders";
    const COLUMNS: &'static [&'static str] =
        &["id", "product_id", "quantity", "created_at", "version"];
    const WRITABLE_COLUMNS: &'static [&'static str] = &["product_id", "quantity"];
    const SORT_SAFE_LIST: &'static [&'static str] =
        &["id", "product_id", "quantity", "created_at"];

    fn decode(row: &Row<'_>) -> rusqlite::Result<Order> {
        Ok(Order {
            id: row.get("id")?,
            product_id: row.get("product_id")?,
            quantity: row.get("quantity")?,
            created_at: row.get("created_at")?,
            version: row.get("version")?,
        })
    }

    fn id(entity: &Order) -> RecordId {
        entity.id
    }

    fn version(entity: &Order) -> i64 {
        entity.version
    }

    fn draft_values(draft: &NewOrder) -> Vec<Value> {
        vec![
            Value::Integer(draft.product_id),
            Value::Integer(draft.quantity),
        ]
    }

    fn write_values(entity: &Order) -> Vec<Value> {
        vec![
            Value::Integer(entity.product_id),
            Value::Integer(entity.quantity),
        ]
    }

    fn equality_filters(filter: &OrderListFilter) -> Vec<EqualityFilter> {
        vec![EqualityFilter::Integer {
            column: "product_id",
            value: filter.product_id,
        }]
    }

    fn read_list_filter(qs: &QueryParams, v: &mut Validator) -> OrderListFilter {
        OrderListFilter {
            product_id: qs.read_int("product_id", 0, v),
        }
    }
}

pub struct Users;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserListFilter {
    pub username: String,
    pub email: String,
}

impl Resource for Users {
    type Entity = User;
    type Draft = NewUser;
    type Patch = UserPatch;
    type ListFilter = UserListFilter;

    const NAME: &'static str = "user";
    const TABLE: &'static str = "users";
    const COLUMNS: &'static [&'static str] =
        &["id", "username", "email", "password_hash", "version"];
    const WRITABLE_COLUMNS: &'static [&'static str] = &["username", "email", "password_hash"];
    const SORT_SAFE_LIST: &'static [&'static str] = &["id", "username", "email"];

    fn decode(row: &Row<'_>) -> rusqlite::Result<User> {
        Ok(User {
            id: row.get("id")?,
            username: row.get("username")?,
            email: row.get("email")?,
            password_hash: row.get("password_hash")?,
            version: row.get("version")?,
        })
    }

    fn id(entity: &User) -> RecordId {
        entity.id
    }

    fn version(entity: &User) -> i64 {
        entity.version
    }

    fn draft_values(draft: &NewUser) -> Vec<Value> {
        vec![
            Value::Text(draft.username.clone()),
            Value::Text(draft.email.clone()),
            Value::Text(draft.password_hash.clone()),
        ]
    }

    fn write_values(entity: &User) -> Vec<Value> {
        vec![
            Value::Text(entity.username.clone()),
            Value::Text(entity.email.clone()),
            Value::Text(entity.password_hash.clone()),
        ]
    }

    fn equality_filters(filter: &UserListFilter) -> Vec<EqualityFilter> {
        vec![
            EqualityFilter::Text {
                column: "username",
                value: filter.username.clone(),
            },
            EqualityFilter::Text {
                column: "email",
                value: filter.email.clone(),
            },
        ]
    }

    fn read_list_filter(qs: &QueryParams, _v: &mut Validator) -> UserListFilter {
        UserListFilter {
            username: qs.read_string("username", ""),
            email: qs.read_string("email", ""),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Categories, Orders, Products, Users};
    use crate::query::QueryParams;
    use crate::repo::Resource;
    use crate::validate::Validator;

    fn assert_descriptor_shape<R: Resource>() {
        assert_eq!(R::COLUMNS.first(), Some(&"id"));
        assert_eq!(R::COLUMNS.last(), Some(&"version"));
        for column in R::WRITABLE_COLUMNS.iter().chain(R::SORT_SAFE_LIST) {
            assert!(R::COLUMNS.contains(column), "{}.{column}", R::TABLE);
        }
        assert!(!R::WRITABLE_COLUMNS.contains(&"id"));
        assert!(!R::WRITABLE_COLUMNS.contains(&"version"));
    }

    #[test]
    fn descriptors_reference_only_selected_columns() {
        assert_descriptor_shape::<Categories>();
        assert_descriptor_shape::<Products>();
        assert_descriptor_shape::<Orders>();
        assert_descriptor_shape::<Users>();
    }

    #[test]
    fn password_hash_is_never_sortable() {
        assert!(!Users::SORT_SAFE_LIST.contains(&"password_hash"));
    }

    #[test]
    fn product_filter_reports_malformed_category() {
        let qs: QueryParams = [("title", "Dune"), ("category_id", "abc")]
            .into_iter()
            .collect();
        let mut v = Validator::new();
        let filter = Products::read_list_filter(&qs, &mut v);

        assert_eq!(filter.title, "Dune");
        assert_eq!(filter.category_id, 0);
        let errors = v.finish().unwrap_err();
        assert_eq!(errors.get("category_id"), Some("must be an integer value"));
    }

    #[test]
    fn absent_filters_decode_to_neutral_values() {
        let qs = QueryParams::default();
        let mut v = Validator::new();
        let filter = Users::read_list_filter(&qs, &mut v);

        assert!(v.is_valid());
        assert_eq!(filter.username, "");
        assert_eq!(filter.email, "");
    }
}
