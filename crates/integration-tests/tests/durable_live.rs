//! Durable-driver tests against a live `PostgreSQL`.
//!
//! These are the only tests that talk to a real database; they are ignored
//! by default. Point `DATABASE_URL` at a throwaway database and run:
//!
//! ```bash
//! DATABASE_URL=postgres://localhost/toolkart_test cargo test -- --ignored
//! ```
//!
//! Tests use unique slugs so they can run repeatedly against the same
//! database without cleanup.

use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;

use toolkart_catalog::StoreError;
use toolkart_catalog::durable::{
    CategoryRepository, OrderRepository, ProductRepository, run_migrations,
};
use toolkart_core::{CategoryDraft, OrderDraft, OrderItemDraft, ProductDraft, UserId};

async fn pool() -> PgPool {
    let url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set for live tests");
    let pool = PgPoolOptions::new()
        .max_connections(2)
        .connect(&url)
        .await
        .expect("connect to test database");
    run_migrations(&pool).await.expect("migrations");
    pool
}

fn unique(prefix: &str) -> String {
    format!("{prefix}-{}", uuid::Uuid::new_v4())
}

#[tokio::test]
#[ignore = "requires a live PostgreSQL via DATABASE_URL"]
async fn test_category_create_is_idempotent_on_slug() {
    let pool = pool().await;
    let repo = CategoryRepository::new(&pool);

    let name = unique("garden tools");
    let first = repo.create(&CategoryDraft::named(&name)).await.expect("create");
    let second = repo.create(&CategoryDraft::named(&name)).await.expect("recreate");
    assert_eq!(first.id, second.id);

    repo.delete(&first.id).await.expect("cleanup");
}

#[tokio::test]
#[ignore = "requires a live PostgreSQL via DATABASE_URL"]
async fn test_delete_category_with_products_is_refused() {
    let pool = pool().await;
    let categories = CategoryRepository::new(&pool);
    let products = ProductRepository::new(&pool);

    let category = categories
        .create(&CategoryDraft::named(unique("abrasives")))
        .await
        .expect("create category");
    let product = products
        .create(&ProductDraft {
            name: Some(unique("sanding disc")),
            price: Some(8.99),
            stock: Some(3.0),
            category_id: Some(category.id.clone()),
            ..ProductDraft::default()
        })
        .await
        .expect("create product");

    let err = categories
        .delete(&category.id)
        .await
        .expect_err("delete with dependents");
    assert!(matches!(err, StoreError::HasDependents(_)));

    // Statistics come straight from the GROUP BY join.
    let fetched = categories.get(&category.id).await.expect("get");
    assert_eq!(fetched.product_count, 1);
    assert_eq!(fetched.low_stock_count, 1);
    assert!((fetched.average_price - 8.99).abs() < 1e-9);

    products.delete(&product.id).await.expect("cleanup product");
    categories.delete(&category.id).await.expect("cleanup category");
}

#[tokio::test]
#[ignore = "requires a live PostgreSQL via DATABASE_URL"]
async fn test_product_create_requires_existing_category() {
    let pool = pool().await;
    let products = ProductRepository::new(&pool);

    let err = products
        .create(&ProductDraft {
            name: Some("Mystery Widget".to_owned()),
            price: Some(1.0),
            category_slug: Some(unique("no-such-category")),
            ..ProductDraft::default()
        })
        .await
        .expect_err("unknown category");
    assert!(matches!(err, StoreError::Validation(_)));
}

#[tokio::test]
#[ignore = "requires a live PostgreSQL via DATABASE_URL"]
async fn test_order_round_trip_scoped_to_owner() {
    let pool = pool().await;
    let orders = OrderRepository::new(&pool);

    let owner = UserId::new(unique("user"));
    let order = orders
        .create(
            &owner,
            &OrderDraft {
                tax: 2.0,
                items: vec![OrderItemDraft {
                    title: Some("Chisel Set".to_owned()),
                    price: Some(24.0),
                    quantity: Some(1.0),
                    ..OrderItemDraft::default()
                }],
                ..OrderDraft::default()
            },
        )
        .await
        .expect("create order");
    assert!((order.total - 26.0).abs() < 1e-9);

    let fetched = orders.get(&owner, &order.id).await.expect("get");
    assert_eq!(fetched.items.len(), 1);
    assert_eq!(fetched.items[0].title, "Chisel Set");

    let stranger = UserId::new(unique("user"));
    let err = orders.get(&stranger, &order.id).await.expect_err("scoped");
    assert!(matches!(err, StoreError::NotFound(_)));
}
