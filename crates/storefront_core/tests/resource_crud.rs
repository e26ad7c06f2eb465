use storefront_core::{
    classify, open_db, open_db_in_memory, Categories, Category, CategoryPatch, CategoryService,
    ConflictKind, NewCategory, NewOrder, NewProduct, NewUser, OrderPatch, OrderService,
    ProductPatch, ProductService, ResourceError, ResourceRepository, SqliteResourceRepository,
    StoreConfig, UserPatch, UserService,
};

fn new_product(title: &str, price: f64, category_id: i64) -> NewProduct {
    NewProduct {
        title: title.to_string(),
        description: String::new(),
        price,
        category_id,
    }
}

fn new_user(username: &str, email: &str) -> NewUser {
    NewUser {
        username: username.to_string(),
        email: email.to_string(),
        password_hash: "$argon2id$v=19$m=65536,t=3,p=4$c2FsdA$aGFzaA".to_string(),
    }
}

#[test]
fn category_round_trip_create_get_patch() {
    let conn = open_db_in_memory().unwrap();
    let config = StoreConfig::default();
    let categories = CategoryService::sqlite(&conn, &config);

    let created = categories.create(&NewCategory::new("Books")).unwrap();
    assert!(created.id > 0);

    let fetched = categories.get(created.id).unwrap();
    assert_eq!(
        fetched,
        Category {
            id: created.id,
            name: "Books".to_string(),
            version: 1,
        }
    );

    let patched = categories
        .update(
            created.id,
            CategoryPatch {
                name: Some("Novels".to_string()),
            },
        )
        .unwrap();
    assert_eq!(patched.name, "Novels");
    assert_eq!(patched.version, 2);
    assert_eq!(categories.get(created.id).unwrap().name, "Novels");
}

#[test]
fn product_patch_keeps_absent_fields() {
    let conn = open_db_in_memory().unwrap();
    let config = StoreConfig::default();
    let category = CategoryService::sqlite(&conn, &config)
        .create(&NewCategory::new("Games"))
        .unwrap();
    let products = ProductService::sqlite(&conn, &config);

    let created = products
        .create(&NewProduct {
            description: "Board game".to_string(),
            ..new_product("Catan", 45.5, category.id)
        })
        .unwrap();

    let patched = products
        .update(
            created.id,
            ProductPatch {
                price: Some(39.0),
                ..ProductPatch::default()
            },
        )
        .unwrap();
    assert_eq!(patched.title, "Catan");
    assert_eq!(patched.description, "Board game");
    assert_eq!(patched.price, 39.0);
    assert_eq!(patched.category_id, category.id);
}

#[test]
fn patch_to_invalid_value_is_rejected_without_write() {
    let conn = open_db_in_memory().unwrap();
    let config = StoreConfig::default();
    let category = CategoryService::sqlite(&conn, &config)
        .create(&NewCategory::new("Games"))
        .unwrap();
    let products = ProductService::sqlite(&conn, &config);
    let created = products
        .create(&new_product("Chess", 20.0, category.id))
        .unwrap();

    let err = products
        .update(
            created.id,
            ProductPatch {
                title: Some(String::new()),
                price: Some(-1.0),
                ..ProductPatch::default()
            },
        )
        .unwrap_err();
    let errors = err.field_errors().unwrap();
    assert_eq!(errors.get("title"), Some("must be provided"));
    assert_eq!(errors.get("price"), Some("must be a non-negative value"));

    let stored = products.get(created.id).unwrap();
    assert_eq!(stored.title, "Chess");
    assert_eq!(stored.version, 1);
}

#[test]
fn missing_ids_are_not_found() {
    let conn = open_db_in_memory().unwrap();
    let categories = CategoryService::sqlite(&conn, &StoreConfig::default());

    for id in [0, -3, 42] {
        let err = categories.get(id).unwrap_err();
        assert_eq!(err.status_code(), 404, "id {id}");
    }
    assert!(matches!(
        categories.delete(42),
        Err(ResourceError::NotFound { id: 42, .. })
    ));
    assert!(matches!(
        categories.update(
            42,
            CategoryPatch {
                name: Some("Ghost".to_string())
            }
        ),
        Err(ResourceError::NotFound { .. })
    ));
}

#[test]
fn delete_removes_row() {
    let conn = open_db_in_memory().unwrap();
    let categories = CategoryService::sqlite(&conn, &StoreConfig::default());
    let created = categories.create(&NewCategory::new("Temp")).unwrap();

    categories.delete(created.id).unwrap();
    assert!(matches!(
        categories.get(created.id),
        Err(ResourceError::NotFound { .. })
    ));
}

#[test]
fn order_timestamps_are_store_assigned() {
    let conn = open_db_in_memory().unwrap();
    let config = StoreConfig::default();
    let category = CategoryService::sqlite(&conn, &config)
        .create(&NewCategory::new("Games"))
        .unwrap();
    let product = ProductService::sqlite(&conn, &config)
        .create(&new_product("Go", 30.0, category.id))
        .unwrap();
    let orders = OrderService::sqlite(&conn, &config);

    let order = orders
        .create(&NewOrder {
            product_id: product.id,
            quantity: 2,
        })
        .unwrap();
    assert!(!order.created_at.is_empty());

    let patched = orders
        .update(
            order.id,
            OrderPatch {
                quantity: Some(5),
                ..OrderPatch::default()
            },
        )
        .unwrap();
    assert_eq!(patched.quantity, 5);
    assert_eq!(patched.created_at, order.created_at);
}

#[test]
fn user_password_hash_is_stored_but_not_serialized() {
    let conn = open_db_in_memory().unwrap();
    let users = UserService::sqlite(&conn, &StoreConfig::default());
    let created = users.create(&new_user("ada", "ada@example.com")).unwrap();

    let stored = users.get(created.id).unwrap();
    assert!(stored.password_hash.starts_with("$argon2id$"));

    let json = serde_json::to_value(&stored).unwrap();
    assert!(json.get("password_hash").is_none());
    assert_eq!(json["email"], "ada@example.com");
}

#[test]
fn invalid_user_email_reports_field() {
    let conn = open_db_in_memory().unwrap();
    let users = UserService::sqlite(&conn, &StoreConfig::default());
    let created = users.create(&new_user("ada", "ada@example.com")).unwrap();

    let err = users
        .update(
            created.id,
            UserPatch {
                email: Some("not-an-email".to_string()),
                ..UserPatch::default()
            },
        )
        .unwrap_err();
    assert_eq!(
        err.field_errors().and_then(|errors| errors.get("email")),
        Some("must be a valid email address")
    );
}

#[test]
fn duplicate_email_is_constraint_conflict() {
    let conn = open_db_in_memory().unwrap();
    let users = UserService::sqlite(&conn, &StoreConfig::default());
    users.create(&new_user("ada", "ada@example.com")).unwrap();

    let err = users
        .create(&new_user("ada2", "ADA@example.com"))
        .unwrap_err();
    assert_eq!(
        err,
        ResourceError::Conflict {
            resource: "user",
            kind: ConflictKind::Constraint,
        }
    );
    assert_eq!(err.status_code(), 409);
}

#[test]
fn dangling_foreign_key_is_constraint_conflict() {
    let conn = open_db_in_memory().unwrap();
    let products = ProductService::sqlite(&conn, &StoreConfig::default());

    let err = products.create(&new_product("Orphan", 1.0, 777)).unwrap_err();
    assert!(matches!(
        err,
        ResourceError::Conflict {
            kind: ConflictKind::Constraint,
            ..
        }
    ));
}

#[test]
fn deleting_referenced_parent_is_conflict() {
    let conn = open_db_in_memory().unwrap();
    let config = StoreConfig::default();
    let categories = CategoryService::sqlite(&conn, &config);
    let category = categories.create(&NewCategory::new("Games")).unwrap();
    ProductService::sqlite(&conn, &config)
        .create(&new_product("Go", 30.0, category.id))
        .unwrap();

    let err = categories.delete(category.id).unwrap_err();
    assert_eq!(err.status_code(), 409);
    assert!(categories.get(category.id).is_ok());
}

#[test]
fn concurrent_edit_from_stale_read_is_edit_conflict() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("storefront.db");
    let config = StoreConfig::default();

    let conn_a = open_db(&path).unwrap();
    let conn_b = open_db(&path).unwrap();
    let repo_a = SqliteResourceRepository::<Categories>::new(&conn_a, &config);
    let service_b = CategoryService::sqlite(&conn_b, &config);

    let created = repo_a.insert(&NewCategory::new("Books")).unwrap();
    let read_by_a = repo_a.get(created.id).unwrap();

    service_b
        .update(
            created.id,
            CategoryPatch {
                name: Some("Novels".to_string()),
            },
        )
        .unwrap();

    let stale_write = Category {
        name: "Comics".to_string(),
        ..read_by_a
    };
    let err = classify(repo_a.update(&stale_write).unwrap_err(), "category");
    assert_eq!(err.code(), "edit_conflict");
    assert_eq!(service_b.get(created.id).unwrap().name, "Novels");
}
