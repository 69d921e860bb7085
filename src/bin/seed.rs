//! Populates the database with demo data for local development.
//!
//! Usage: `cargo run --bin seed`. Existing rows are cleared first.

use chrono::{Duration, Utc};
use rand::seq::IndexedRandom;
use rand::Rng;
use sea_orm::{ConnectionTrait, Statement};

use commerce_admin_api::{
    config::AppConfig,
    db::{create_orm_conn, run_migrations},
    dto::{
        orders::{CreateOrderRequest, DeliveryStatus, OrderLineInput, OrderPaymentStatus},
        payments::{CreatePaymentRequest, PaymentMethod, PaymentStatus},
        products::CreateProductRequest,
        reviews::CreateReviewRequest,
        users::{CreateUserRequest, Role},
        wishlists::CreateWishlistRequest,
        categories::CreateCategoryRequest,
    },
    models::Address,
    services::{
        category_service, order_service, payment_service, product_service, review_service,
        user_service, wishlist_service,
    },
    state::AppState,
};

const CATEGORY_NAMES: &[(&str, &str)] = &[
    ("Electronics", "Gadgets, accessories and consumer electronics"),
    ("Books", "Fiction, non-fiction and technical titles"),
    ("Clothing", "Apparel for every season"),
    ("Home & Kitchen", "Everything for the household"),
    ("Sports", "Gear and equipment for active lives"),
];

const PRODUCT_NAMES: &[&str] = &[
    "Wireless Headphones",
    "Mechanical Keyboard",
    "Espresso Machine",
    "Running Shoes",
    "Yoga Mat",
    "Desk Lamp",
    "Water Bottle",
    "Graphic Novel",
    "Cookbook",
    "Bluetooth Speaker",
    "Backpack",
    "Smart Watch",
    "Cast Iron Skillet",
    "Tennis Racket",
    "Travel Mug",
];

const FIRST_NAMES: &[&str] = &[
    "alice", "bob", "carol", "dave", "erin", "frank", "grace", "heidi", "ivan", "judy",
];

const CITIES: &[(&str, &str)] = &[
    ("Berlin", "Germany"),
    ("Lisbon", "Portugal"),
    ("Austin", "USA"),
    ("Osaka", "Japan"),
    ("Leeds", "UK"),
];

const COMMENTS: &[&str] = &[
    "Exactly as described, very happy with it.",
    "Decent quality for the price.",
    "Arrived late but works fine.",
    "Would buy again.",
    "Not what I expected, returning it.",
];

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let config = AppConfig::from_env()?;
    let orm = create_orm_conn(&config.database_url).await?;
    run_migrations(&orm).await?;

    clear_tables(&orm).await?;

    let state = AppState { orm };
    let mut rng = rand::rng();

    let mut categories = Vec::new();
    for (name, description) in CATEGORY_NAMES {
        let category = category_service::create_category(
            &state,
            CreateCategoryRequest {
                name: (*name).to_string(),
                description: Some((*description).to_string()),
            },
        )
        .await?;
        categories.push(category);
    }
    println!("seeded {} categories", categories.len());

    let mut users = Vec::new();
    for (i, first) in FIRST_NAMES.iter().enumerate() {
        let (city, country) = CITIES.choose(&mut rng).copied().unwrap_or(CITIES[0]);
        let role = if i == 0 { Role::Admin } else { Role::Customer };
        let user = user_service::create_user(
            &state,
            CreateUserRequest {
                username: (*first).to_string(),
                email: format!("{first}@example.com"),
                password: format!("{first}-secret"),
                role: Some(role),
                address: Some(Address {
                    street: Some(format!("{} Main Street", rng.random_range(1..200))),
                    city: Some(city.to_string()),
                    postal_code: Some(format!("{:05}", rng.random_range(10000..99999))),
                    country: Some(country.to_string()),
                }),
            },
        )
        .await?;
        users.push(user);
    }
    println!("seeded {} users", users.len());

    let mut products = Vec::new();
    for name in PRODUCT_NAMES {
        let category = categories.choose(&mut rng);
        let product = product_service::create_product(
            &state,
            CreateProductRequest {
                name: (*name).to_string(),
                description: Some(format!("Demo listing for {name}")),
                price: (rng.random_range(500..25000) as f64) / 100.0,
                category: category.map(|c| c.id),
                stock: Some(rng.random_range(0..120)),
            },
        )
        .await?;
        products.push(product);
    }
    println!("seeded {} products", products.len());

    let payment_statuses = [
        OrderPaymentStatus::Pending,
        OrderPaymentStatus::Paid,
        OrderPaymentStatus::Failed,
    ];
    let delivery_statuses = [
        DeliveryStatus::Processing,
        DeliveryStatus::Shipped,
        DeliveryStatus::Delivered,
    ];

    let mut orders = Vec::new();
    for _ in 0..12 {
        let user = users.choose(&mut rng).map(|u| u.id).unwrap_or_default();
        let mut lines = Vec::new();
        let mut total = 0.0;
        for _ in 0..rng.random_range(1..4) {
            if let Some(product) = products.choose(&mut rng) {
                let quantity = rng.random_range(1..4);
                total += product.price * quantity as f64;
                lines.push(OrderLineInput {
                    product: Some(product.id),
                    quantity: Some(quantity),
                    price: Some(product.price),
                });
            }
        }
        let order = order_service::create_order(
            &state,
            CreateOrderRequest {
                user,
                products: Some(lines),
                total_amount: Some((total * 100.0).round() / 100.0),
                payment_status: payment_statuses.choose(&mut rng).copied(),
                delivery_status: delivery_statuses.choose(&mut rng).copied(),
            },
        )
        .await?;
        orders.push(order);
    }
    println!("seeded {} orders", orders.len());

    let mut review_count = 0;
    for product in products.iter().take(8) {
        if let Some(user) = users.choose(&mut rng) {
            review_service::create_review(
                &state,
                CreateReviewRequest {
                    product: product.id,
                    user: user.id,
                    rating: rng.random_range(1..=5),
                    comment: COMMENTS.choose(&mut rng).map(|c| (*c).to_string()),
                },
            )
            .await?;
            review_count += 1;
        }
    }
    println!("seeded {review_count} reviews");

    let mut wishlist_count = 0;
    for user in users.iter().take(5) {
        let mut picks = Vec::new();
        for _ in 0..rng.random_range(1..5) {
            if let Some(product) = products.choose(&mut rng) {
                picks.push(product.id);
            }
        }
        picks.dedup();
        wishlist_service::create_wishlist(
            &state,
            CreateWishlistRequest {
                user: user.id,
                products: Some(picks),
            },
        )
        .await?;
        wishlist_count += 1;
    }
    println!("seeded {wishlist_count} wishlists");

    let methods = [
        PaymentMethod::Card,
        PaymentMethod::Paypal,
        PaymentMethod::Bank,
        PaymentMethod::Crypto,
    ];
    let mut payment_count = 0;
    for order in &orders {
        if order.payment_status != "paid" {
            continue;
        }
        let user = order.user.as_ref().map(|u| u.id).unwrap_or_default();
        payment_service::create_payment(
            &state,
            CreatePaymentRequest {
                order: order.id,
                user,
                amount: order.total_amount,
                payment_method: methods.choose(&mut rng).copied().unwrap_or(PaymentMethod::Card),
                payment_status: Some(PaymentStatus::Completed),
                transaction_id: Some(format!("txn-{:010}", rng.random_range(0..10_000_000_000_i64))),
                paid_at: Some(Utc::now() - Duration::days(rng.random_range(0..30))),
            },
        )
        .await?;
        payment_count += 1;
    }
    println!("seeded {payment_count} payments");

    Ok(())
}

async fn clear_tables(conn: &commerce_admin_api::db::OrmConn) -> anyhow::Result<()> {
    let backend = conn.get_database_backend();
    conn.execute(Statement::from_string(
        backend,
        "TRUNCATE payments, wishlist_items, wishlists, reviews, order_items, orders, \
         products, categories, users CASCADE"
            .to_string(),
    ))
    .await?;
    Ok(())
}
