//! End-to-end facade tests against the seeded demo backend.
//!
//! No database is involved: `CatalogConfig::demo_only()` keeps the gate in
//! its `NotConfigured` steady state, so every operation lands in the
//! in-process store.

use toolkart_catalog::{CatalogConfig, CatalogService, StoreError};
use toolkart_core::{
    CategoryDraft, CategoryPatch, OrderDraft, OrderItemDraft, PageRequest, ProductDraft,
    ProductFilter, ProductPatch, SortOrder, UserId,
};

fn service() -> CatalogService {
    CatalogService::new(&CatalogConfig::demo_only())
}

#[tokio::test]
async fn test_category_lifecycle() {
    let service = service();

    let created = service
        .create_category(&CategoryDraft::named("Measuring Tools"))
        .await
        .expect("create");
    assert_eq!(created.slug, "measuring-tools");
    assert_eq!(created.product_count, 0);

    // Same slug resolves to the same record instead of erroring.
    let again = service
        .create_category(&CategoryDraft::named("MEASURING tools"))
        .await
        .expect("recreate");
    assert_eq!(again.id, created.id);

    let renamed = service
        .update_category(
            &created.id,
            &CategoryPatch {
                description: Some("Levels, tapes, and calipers".to_owned()),
                ..CategoryPatch::default()
            },
        )
        .await
        .expect("update");
    assert_eq!(renamed.description, "Levels, tapes, and calipers");
    assert_eq!(renamed.name, "Measuring Tools");

    service.delete_category(&created.id).await.expect("delete");
    let categories = service.list_categories().await.expect("list");
    assert!(categories.iter().all(|c| c.id != created.id));
}

#[tokio::test]
async fn test_product_lifecycle_maintains_statistics() {
    let service = service();

    let created = service
        .create_product(&ProductDraft {
            name: Some("Stud Finder".to_owned()),
            price: Some(29.99),
            stock: Some(4.0),
            category_slug: Some("power-tools".to_owned()),
            brand: "Bosch".to_owned(),
            ..ProductDraft::default()
        })
        .await
        .expect("create");
    assert_eq!(created.category_slug, "power-tools");

    let categories = service.list_categories().await.expect("list");
    let power_tools = categories
        .iter()
        .find(|c| c.slug == "power-tools")
        .expect("seeded category");
    // 3 seeded power tools + the new one; stock 4 and the Contractor Saw
    // (stock 7) are the low-stock entries.
    assert_eq!(power_tools.product_count, 4);
    assert_eq!(power_tools.low_stock_count, 2);

    let patched = service
        .update_product(
            &created.id,
            &ProductPatch {
                stock: Some(40.0),
                ..ProductPatch::default()
            },
        )
        .await
        .expect("update");
    assert_eq!(patched.stock, 40);

    service.delete_product(&created.id).await.expect("delete");
    let err = service.get_product(&created.id).await.expect_err("gone");
    assert!(matches!(err, StoreError::NotFound(_)));
}

#[tokio::test]
async fn test_product_listing_filters_and_pagination() {
    let service = service();

    let page = service
        .list_products(
            &ProductFilter {
                category: Some("Power Tools".to_owned()),
                ..ProductFilter::default()
            },
            &PageRequest {
                page: 1,
                limit: 2,
                sort: "price".to_owned(),
                order: SortOrder::Desc,
            },
        )
        .await
        .expect("list");

    assert_eq!(page.pagination.total, 3);
    assert_eq!(page.pagination.pages, 2);
    assert_eq!(page.data.len(), 2);
    assert_eq!(page.data[0].name, "Contractor Saw");

    let featured = service.list_featured(8).await.expect("featured");
    assert!(featured.iter().all(|p| p.featured));
    assert_eq!(featured.len(), 3);

    let filters = service.catalog_filters().await.expect("filters");
    assert_eq!(filters.categories.len(), 3);
    assert!(filters.brands.windows(2).all(|w| w[0] <= w[1]));
}

#[tokio::test]
async fn test_order_flow_and_ownership() {
    let service = service();
    let buyer = UserId::new("demo-user-2");

    let order = service
        .create_order(
            &buyer,
            &OrderDraft {
                shipping: 3.0,
                tax: 1.0,
                items: vec![
                    OrderItemDraft {
                        title: Some("Hammer".to_owned()),
                        price: Some(10.0),
                        quantity: Some(2.0),
                        ..OrderItemDraft::default()
                    },
                    OrderItemDraft {
                        title: Some("Wrench".to_owned()),
                        price: Some(5.0),
                        quantity: Some(1.0),
                        ..OrderItemDraft::default()
                    },
                ],
                ..OrderDraft::default()
            },
        )
        .await
        .expect("create order");

    assert!((order.subtotal - 25.0).abs() < 1e-9);
    assert!((order.total - 29.0).abs() < 1e-9);

    let mine = service.list_orders(&buyer).await.expect("list");
    assert!(mine.iter().any(|o| o.id == order.id));

    // Another user sees NotFound, not a permission error.
    let err = service
        .get_order(&UserId::new("demo-user-1"), &order.id)
        .await
        .expect_err("cross-user");
    assert!(matches!(err, StoreError::NotFound(_)));
}

#[tokio::test]
async fn test_wire_shape_is_camel_case() {
    let service = service();
    let categories = service.list_categories().await.expect("list");
    let value = serde_json::to_value(&categories).expect("serialize");

    let first = value
        .as_array()
        .and_then(|a| a.first())
        .expect("one category");
    assert!(first.get("productCount").is_some());
    assert!(first.get("averagePrice").is_some());
    assert!(first.get("lowStockCount").is_some());
    assert!(first.get("isActive").is_some());
    assert!(first.get("product_count").is_none());
}
