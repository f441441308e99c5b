//! Seed data for the demo store.
//!
//! Mirrors the ToolKart demo catalog: three categories, six products, two
//! users, and one paid order. Records are assembled fully-formed (sequential
//! `demo-*` IDs); derived category statistics are recomputed by the store
//! right after seeding.

use chrono::{DateTime, Utc};

use toolkart_core::slug::slugify;
use toolkart_core::{
    Category, CategoryId, Order, OrderId, OrderItem, OrderStatus, Product, ProductId, Role, User,
    UserId,
};

use super::DemoStore;

pub(super) fn populate(store: &mut DemoStore) {
    let now = Utc::now();

    let categories = [
        ("Power Tools", "Drills, grinders, and saws for heavy work", "zap"),
        ("Hand Tools", "Hammers, wrenches, and everyday essentials", "wrench"),
        ("Safety", "Protective gear for the workshop", "shield"),
    ];
    for (name, description, icon) in categories {
        let id = store.next_category_id();
        store.categories.push(category(id, name, description, icon, now));
    }

    let products = [
        (
            "Cordless Drill",
            "High-performance cordless drill with 2 batteries.",
            89.99,
            "Power Tools",
            "DeWalt",
            4.5,
            112,
            24,
            "/assets/images/products/cordless-drill.jpg",
            true,
            &["drill", "cordless"][..],
        ),
        (
            "Angle Grinder",
            "Durable grinder for cutting and polishing.",
            74.5,
            "Power Tools",
            "Makita",
            4.2,
            58,
            18,
            "/assets/images/products/angle-grinder.jpg",
            true,
            &["grinder"][..],
        ),
        (
            "Hammer",
            "Balanced steel claw hammer with comfort grip.",
            15.99,
            "Hand Tools",
            "Bosch",
            4.8,
            210,
            45,
            "/assets/images/products/hammer.jpg",
            false,
            &["hammer"][..],
        ),
        (
            "Safety Goggles",
            "Anti-fog protective goggles for workshop safety.",
            12.49,
            "Safety",
            "3M",
            4.6,
            94,
            60,
            "/assets/images/products/safety-goggles.jpg",
            false,
            &["safety"][..],
        ),
        (
            "Adjustable Wrench",
            "Rust-resistant adjustable wrench with metric markings.",
            22.0,
            "Hand Tools",
            "Milwaukee",
            4.4,
            133,
            33,
            "/assets/images/products/adjustable-wrench.jpg",
            false,
            &["wrench"][..],
        ),
        (
            "Contractor Saw",
            "Reliable contractor table saw for job-site work.",
            349.0,
            "Power Tools",
            "Bosch",
            4.1,
            41,
            7,
            "/assets/images/products/contractor-saw.jpg",
            true,
            &["saw"][..],
        ),
    ];
    for (name, description, price, category_name, brand, rating, reviews, stock, image, featured, tags) in
        products
    {
        let id = store.next_product_id();
        let category_slug = slugify(category_name);
        let category_id = store
            .categories
            .iter()
            .find(|c| c.slug == category_slug)
            .map(|c| c.id.clone());
        store.products.push(Product {
            id,
            name: name.to_owned(),
            description: description.to_owned(),
            price,
            stock,
            category: category_name.to_owned(),
            category_id,
            category_slug,
            brand: brand.to_owned(),
            rating,
            reviews_count: reviews,
            images: vec![image.to_owned()],
            featured,
            tags: tags.iter().map(|&t| t.to_owned()).collect(),
            created_at: now,
            updated_at: now,
        });
    }

    store.users.push(User {
        id: UserId::new("demo-user-1"),
        name: "Ava Martinez".to_owned(),
        email: "ava@toolkart.com".to_owned(),
        role: Role::Admin,
    });
    store.users.push(User {
        id: UserId::new("demo-user-2"),
        name: "Noah Smith".to_owned(),
        email: "noah@example.com".to_owned(),
        role: Role::Customer,
    });

    let order_id = store.next_order_id();
    store.orders.push(seed_order(order_id, now));
}

fn category(
    id: CategoryId,
    name: &str,
    description: &str,
    icon: &str,
    now: DateTime<Utc>,
) -> Category {
    Category {
        id,
        name: name.to_owned(),
        slug: slugify(name),
        description: description.to_owned(),
        icon: icon.to_owned(),
        image: String::new(),
        is_active: true,
        product_count: 0,
        average_price: 0.0,
        low_stock_count: 0,
        created_at: now,
        updated_at: now,
    }
}

fn seed_order(id: OrderId, now: DateTime<Utc>) -> Order {
    Order {
        id,
        user_id: UserId::new("demo-user-1"),
        items: vec![
            OrderItem {
                product_id: Some(ProductId::new("demo-product-1")),
                title: "Cordless Drill".to_owned(),
                price: 89.99,
                quantity: 1,
            },
            OrderItem {
                product_id: Some(ProductId::new("demo-product-3")),
                title: "Hammer".to_owned(),
                price: 15.99,
                quantity: 2,
            },
        ],
        subtotal: 149.98,
        shipping: 0.0,
        tax: 13.5,
        total: 163.48,
        status: OrderStatus::Paid,
        created_at: now,
        updated_at: now,
    }
}
