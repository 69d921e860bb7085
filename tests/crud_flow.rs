use chrono::{Duration, Utc};
use sea_orm::{ConnectionTrait, Statement};
use uuid::Uuid;

use commerce_admin_api::{
    db::{create_orm_conn, run_migrations},
    dto::{
        categories::CreateCategoryRequest,
        orders::{CreateOrderRequest, OrderLineInput, UpdateOrderRequest},
        payments::{CreatePaymentRequest, PaymentMethod, PaymentStatus, UpdatePaymentRequest},
        products::CreateProductRequest,
        reviews::{CreateReviewRequest, UpdateReviewRequest},
        users::{CreateUserRequest, UpdateUserRequest},
        wishlists::CreateWishlistRequest,
    },
    error::AppError,
    models::Address,
    registry::Model,
    services::{
        category_service, order_service, payment_service, product_service, review_service,
        user_service, wishlist_service,
    },
    state::AppState,
};

// Integration flow over the whole store facade: create records for every
// entity, exercise partial updates, populated reads, deletes, uniqueness
// failures and the payment aggregation.
#[tokio::test]
async fn crud_and_populate_flow() -> anyhow::Result<()> {
    // Allow skipping when no DB is configured in the environment.
    let database_url = match std::env::var("TEST_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
    {
        Ok(url) => url,
        Err(_) => {
            eprintln!(
                "Skipping test: set TEST_DATABASE_URL or DATABASE_URL to run integration flow tests."
            );
            return Ok(());
        }
    };

    let state = setup_state(&database_url).await?;

    // Users: defaults applied on create.
    let alice = user_service::create_user(
        &state,
        CreateUserRequest {
            username: "alice".into(),
            email: "alice@example.com".into(),
            password: "secret".into(),
            role: None,
            address: None,
        },
    )
    .await?;
    assert_eq!(alice.role, "customer");
    assert!(alice.address.street.is_none());

    // Duplicate email is rejected by the unique constraint.
    let dup = user_service::create_user(
        &state,
        CreateUserRequest {
            username: "alice2".into(),
            email: "alice@example.com".into(),
            password: "secret".into(),
            role: None,
            address: None,
        },
    )
    .await;
    assert!(matches!(dup, Err(AppError::Validation(_))));

    // Partial update merges into the stored record.
    let updated = user_service::update_user(
        &state,
        alice.id,
        UpdateUserRequest {
            address: Some(Address {
                street: Some("1 High Street".into()),
                city: Some("Leeds".into()),
                postal_code: Some("LS1 1AA".into()),
                country: Some("UK".into()),
            }),
            ..Default::default()
        },
    )
    .await?
    .expect("user exists");
    assert_eq!(updated.username, "alice");
    assert_eq!(updated.address.city.as_deref(), Some("Leeds"));

    // Updating an absent id yields None rather than an error.
    let missing = user_service::update_user(&state, Uuid::new_v4(), UpdateUserRequest::default())
        .await?;
    assert!(missing.is_none());

    // Lookup filters.
    let by_email = user_service::get_user_by_email(&state, "alice@example.com").await?;
    assert_eq!(by_email.map(|u| u.id), Some(alice.id));
    let by_username = user_service::get_user_by_username(&state, "nobody").await?;
    assert!(by_username.is_none());

    // Category + product, read back populated.
    let books = category_service::create_category(
        &state,
        CreateCategoryRequest {
            name: "Books".into(),
            description: None,
        },
    )
    .await?;
    let novel = product_service::create_product(
        &state,
        CreateProductRequest {
            name: "Graphic Novel".into(),
            description: Some("Hardcover".into()),
            price: 19.99,
            category: Some(books.id),
            stock: Some(3),
        },
    )
    .await?;
    let fetched = product_service::get_product_by_id(&state, novel.id)
        .await?
        .expect("product exists");
    assert_eq!(
        fetched.category.as_ref().map(|c| c.name.as_str()),
        Some("Books")
    );

    let hits = product_service::search_products_by_name(&state, "graphic").await?;
    assert_eq!(hits.len(), 1);

    // Order with lines, populated on read.
    let order = order_service::create_order(
        &state,
        CreateOrderRequest {
            user: alice.id,
            products: Some(vec![OrderLineInput {
                product: Some(novel.id),
                quantity: Some(2),
                price: Some(19.99),
            }]),
            total_amount: Some(39.98),
            payment_status: None,
            delivery_status: None,
        },
    )
    .await?;
    assert_eq!(order.payment_status, "pending");
    assert_eq!(order.products.len(), 1);
    assert_eq!(
        order.user.as_ref().map(|u| u.username.as_str()),
        Some("alice")
    );

    // Replacing the line array drops the old lines.
    let reordered = order_service::update_order(
        &state,
        order.id,
        UpdateOrderRequest {
            products: Some(vec![
                OrderLineInput {
                    product: Some(novel.id),
                    quantity: Some(1),
                    price: Some(19.99),
                },
                OrderLineInput {
                    product: None,
                    quantity: None,
                    price: None,
                },
            ]),
            total_amount: Some(19.99),
            ..Default::default()
        },
    )
    .await?
    .expect("order exists");
    assert_eq!(reordered.products.len(), 2);
    assert_eq!(reordered.total_amount, 19.99);
    assert!(reordered.products[1].product.is_none());

    let by_user = order_service::get_orders_by_user_id(&state, alice.id).await?;
    assert_eq!(by_user.len(), 1);

    // Reviews: rating bounds are enforced in the facade.
    let bad = review_service::create_review(
        &state,
        CreateReviewRequest {
            product: novel.id,
            user: alice.id,
            rating: 6,
            comment: None,
        },
    )
    .await;
    assert!(matches!(bad, Err(AppError::Validation(_))));

    let review = review_service::create_review(
        &state,
        CreateReviewRequest {
            product: novel.id,
            user: alice.id,
            rating: 5,
            comment: Some("Great read".into()),
        },
    )
    .await?;
    assert_eq!(
        review.product.as_ref().map(|p| p.name.as_str()),
        Some("Graphic Novel")
    );

    // Reassigning the reviewed product is part of the partial merge.
    let sequel = product_service::create_product(
        &state,
        CreateProductRequest {
            name: "Graphic Novel II".into(),
            description: None,
            price: 24.99,
            category: Some(books.id),
            stock: Some(1),
        },
    )
    .await?;
    let moved = review_service::update_review(
        &state,
        review.id,
        UpdateReviewRequest {
            product: Some(sequel.id),
            ..Default::default()
        },
    )
    .await?
    .expect("review exists");
    assert_eq!(moved.product.as_ref().map(|p| p.id), Some(sequel.id));
    assert_eq!(moved.rating, 5);

    // Wishlist lookups by owner.
    wishlist_service::create_wishlist(
        &state,
        CreateWishlistRequest {
            user: alice.id,
            products: Some(vec![novel.id]),
        },
    )
    .await?;
    let wishlist = wishlist_service::get_wishlist_by_user_id(&state, alice.id)
        .await?
        .expect("wishlist exists");
    assert_eq!(wishlist.products.len(), 1);
    let nobody = wishlist_service::get_wishlist_by_user_id(&state, Uuid::new_v4()).await?;
    assert!(nobody.is_none());

    // Payments: uniqueness and immutability of the transaction id.
    let payment = payment_service::create_payment(
        &state,
        CreatePaymentRequest {
            order: order.id,
            user: alice.id,
            amount: 19.99,
            payment_method: PaymentMethod::Card,
            payment_status: Some(PaymentStatus::Completed),
            transaction_id: Some("txn-001".into()),
            paid_at: Some(Utc::now()),
        },
    )
    .await?;
    assert_eq!(payment.payment_status, "completed");

    let dup_txn = payment_service::create_payment(
        &state,
        CreatePaymentRequest {
            order: order.id,
            user: alice.id,
            amount: 5.0,
            payment_method: PaymentMethod::Paypal,
            payment_status: None,
            transaction_id: Some("txn-001".into()),
            paid_at: None,
        },
    )
    .await;
    assert!(matches!(dup_txn, Err(AppError::Validation(_))));

    let reassigned = payment_service::update_payment(
        &state,
        payment.id,
        UpdatePaymentRequest {
            transaction_id: Some("txn-002".into()),
            ..Default::default()
        },
    )
    .await;
    assert!(matches!(reassigned, Err(AppError::Conflict(_))));

    // Re-sending the same transaction id is not a change.
    let same = payment_service::update_payment(
        &state,
        payment.id,
        UpdatePaymentRequest {
            transaction_id: Some("txn-001".into()),
            amount: Some(21.99),
            ..Default::default()
        },
    )
    .await?
    .expect("payment exists");
    assert_eq!(same.amount, 21.99);

    // Date-range aggregation sums amounts inside the window only.
    let now = Utc::now();
    let total = payment_service::payments_total_by_date_range(
        &state,
        now - Duration::days(1),
        now + Duration::days(1),
    )
    .await?;
    assert!((total - 21.99).abs() < 1e-9);

    let empty = payment_service::payments_total_by_date_range(
        &state,
        now - Duration::days(30),
        now - Duration::days(29),
    )
    .await?;
    assert_eq!(empty, 0.0);

    // Deletes return the prior record, then the record is gone.
    let removed = payment_service::delete_payment(&state, payment.id)
        .await?
        .expect("payment existed");
    assert_eq!(removed.id, payment.id);
    assert!(payment_service::get_payment_by_id(&state, payment.id)
        .await?
        .is_none());
    assert!(payment_service::delete_payment(&state, payment.id)
        .await?
        .is_none());

    // Unregistered collection names resolve to nothing.
    assert!(Model::resolve("widget").is_none());

    Ok(())
}

async fn setup_state(database_url: &str) -> anyhow::Result<AppState> {
    let orm = create_orm_conn(database_url).await?;
    run_migrations(&orm).await?;

    let backend = orm.get_database_backend();
    orm.execute(Statement::from_string(
        backend,
        "TRUNCATE payments, wishlist_items, wishlists, reviews, order_items, orders, \
         products, categories, users CASCADE"
            .to_string(),
    ))
    .await?;

    Ok(AppState { orm })
}
